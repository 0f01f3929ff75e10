use anyhow::{anyhow, Result};
use crossbeam::sync::ShardedLock;
use reqwest::{
    header,
    header::{HeaderMap, HeaderValue},
    Client, ClientBuilder, Method, RequestBuilder,
};
use serde::{de::DeserializeOwned, Serialize};
use tokio::time::Duration;
use tracing::{event, Level};

const API_URL: &str = "https://pixe.la";
const USER_AGENT: &str = concat!("Pixela.rs/", env!("CARGO_PKG_VERSION"));
const USER_TOKEN_HEADER: &str = "X-USER-TOKEN";

/// The environment variable to change the default timeout for pixela requests.
const PIXELA_TIMEOUT_MS: &str = "PIXELA_TIMEOUT_MS";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// An explicit timeout wins over the environment value, which wins over the default.
fn request_timeout(timeout: Option<Duration>, env: Option<String>) -> Duration {
    timeout.unwrap_or_else(|| {
        let ms = env
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);
        Duration::from_millis(ms)
    })
}

fn create_http_connection_client(timeout: Option<Duration>) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    let timeout = request_timeout(timeout, std::env::var(PIXELA_TIMEOUT_MS).ok());
    ClientBuilder::new()
        .pool_idle_timeout(Some(Duration::from_secs(60)))
        .tcp_keepalive(Some(Duration::from_secs(30)))
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .build()
        .map_err(|err| anyhow!("failed to build http client: {}", err))
}

/// Sends requests to the pixela API on behalf of a single user token.
pub struct PixelaHttpClient {
    base_url: String,
    token: ShardedLock<String>,
    http_client: Client,
}

impl PixelaHttpClient {
    pub fn new(token: String, api_url: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = api_url
            .unwrap_or_else(|| API_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let http_client = create_http_connection_client(timeout)?;
        Ok(Self {
            base_url,
            token: ShardedLock::new(token),
            http_client,
        })
    }

    pub fn token(&self) -> Result<String> {
        let token = self
            .token
            .read()
            .map_err(|_| anyhow!("pixela: token lock poisoned"))?;
        Ok(token.clone())
    }

    pub fn set_token(&self, new_token: String) -> Result<()> {
        let mut token = self
            .token
            .write()
            .map_err(|_| anyhow!("pixela: token lock poisoned"))?;
        *token = new_token;
        Ok(())
    }

    pub async fn get<T, Q>(&self, path: &str, query: Option<&Q>) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let mut req = self.request(Method::GET, path)?;
        if let Some(query) = query {
            req = req.query(query);
        }
        self.send(req).await
    }

    /// Returns the raw body, whatever the status.
    pub async fn get_text<Q>(&self, path: &str, query: Option<&Q>) -> Result<String>
    where
        Q: Serialize + ?Sized,
    {
        let mut req = self.request(Method::GET, path)?;
        if let Some(query) = query {
            req = req.query(query);
        }
        let res = self.execute(req).await?;
        res.text()
            .await
            .map_err(|err| anyhow!("error reading pixela response: {}", err))
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let req = self.request(Method::POST, path)?.json(body);
        self.send(req).await
    }

    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let req = self.request(Method::POST, path)?;
        self.send(empty_body(req)).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let req = self.request(Method::PUT, path)?.json(body);
        self.send(req).await
    }

    pub async fn put_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let req = self.request(Method::PUT, path)?;
        self.send(empty_body(req)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let req = self.request(Method::DELETE, path)?;
        self.send(req).await
    }
}

// Private methods
impl PixelaHttpClient {
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = self.token()?;
        let token = HeaderValue::from_str(&token)
            .map_err(|err| anyhow!("invalid pixela token: {}", err))?;
        event!(Level::DEBUG, "pixela request {} {}", method, path);
        let url = format!("{}{}", self.base_url, path);
        Ok(self
            .http_client
            .request(method, url)
            .header(USER_TOKEN_HEADER, token))
    }

    async fn execute(&self, req: RequestBuilder) -> Result<reqwest::Response> {
        let response = req.send().await;
        match response {
            Ok(result) => {
                let status = result.status();
                if !status.is_success() {
                    event!(
                        Level::WARN,
                        "pixela responded with {} for {}",
                        status,
                        result.url().path()
                    );
                }
                Ok(result)
            }
            Err(err) => {
                event!(Level::ERROR, "Failed to send pixela request: {}", err);
                Err(anyhow!("failed to send request: {}", err))
            }
        }
    }

    /// Decodes the body even for non-2xx answers; pixela explains failures in JSON.
    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let res = self.execute(req).await?;
        res.json::<T>()
            .await
            .map_err(|err| anyhow!("error parsing pixela response: {}", err))
    }
}

fn empty_body(req: RequestBuilder) -> RequestBuilder {
    req.header(header::CONTENT_LENGTH, HeaderValue::from_static("0"))
}
