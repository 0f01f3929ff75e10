#![allow(dead_code)]

use chrono::NaiveDate;
use httptest::{responders::json_encoded, Server};
use pixela::{models::PixelaOptions, Client};
use serde_json::json;

pub const USER_NAME: &str = "test-user";
pub const USER_TOKEN: &str = "THIS_IS_SECRET";
pub const GRAPH_ID: &str = "test-graph";

pub fn create_client(server: &Server) -> Client {
    Client::with_options(
        USER_NAME.to_string(),
        USER_TOKEN.to_string(),
        PixelaOptions {
            api_url: Some(format!("http://{}", server.addr())),
            timeout: None,
        },
    )
    .expect("should be able to create pixela client")
}

pub fn user_path(rest: &str) -> String {
    format!("/v1/users/{}{}", USER_NAME, rest)
}

pub fn graph_path(rest: &str) -> String {
    user_path(&format!("/graphs/{}{}", GRAPH_ID, rest))
}

pub fn success() -> impl httptest::responders::Responder {
    json_encoded(json!({ "message": "Success.", "isSuccess": true }))
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}
