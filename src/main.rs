use pixela::{models::CreateUser, Client};

#[tokio::main]
async fn main() {
    let username = std::env::var("PIXELA_USERNAME").unwrap_or_else(|_| "USERNAME".to_string());
    let token = std::env::var("PIXELA_TOKEN").unwrap_or_else(|_| "ACCESS_TOKEN".to_string());
    let client = Client::new(username, token).unwrap();

    // Rejected because the terms of service are not accepted. The call still
    // returns Ok, with is_success == false and the reason in message.
    let res = client
        .create_user(&CreateUser {
            agree_terms_of_service: false,
            not_minor: true,
            thanks_code: None,
        })
        .await;
    println!("{:?}", res);
}
