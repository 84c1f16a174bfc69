use std::env;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use reqwest::{Method, RequestBuilder, Response, StatusCode, multipart::Form};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::RwLock;
use url::Url;

use crate::Raw;
use crate::auth::{Credentials, Token};

use super::{Error, Result};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:18000";

#[derive(Clone)]
pub struct Config {
    pub base_url: Url,
    pub token: Option<Token>,
    pub credentials: Option<Credentials>,
    /// Unset means the transport default.
    pub connect_timeout: Option<Duration>,
    pub timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url should be valid"),
            token: None,
            credentials: None,
            connect_timeout: None,
            timeout: None,
        }
    }
}

impl Config {
    pub fn env() -> Option<Self> {
        let base_url = match env::var("API_BASE_URL") {
            Ok(url) => match Url::parse(&url) {
                Ok(url) => url,
                Err(e) => panic!("Invalid API_BASE_URL: {e}"),
            },
            Err(_) => return None,
        };

        let token = env::var("API_TOKEN").ok().map(Token::new);
        let credentials = env::var("API_USERNAME")
            .and_then(|username| {
                env::var("API_PASSWORD").map(|password| Credentials::new(username, password))
            })
            .ok();

        if token.is_none() && credentials.is_none() {
            warn!("neither API_TOKEN nor API_USERNAME/API_PASSWORD is set");
        }

        Some(Self {
            base_url,
            token,
            credentials,
            connect_timeout: secs_from_env("HTTP_CONNECT_TIMEOUT_SECS"),
            timeout: secs_from_env("HTTP_TIMEOUT_SECS"),
        })
    }
}

fn secs_from_env(key: &str) -> Option<Duration> {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
}

/// Thin JSON transport over the back-office REST API.
///
/// Attaches the bearer token (when one is held) to every request and turns
/// non-success responses into [`Error::Status`].
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Arc<RwLock<Option<Token>>>,
}

impl ApiClient {
    pub fn new(http: reqwest::Client, base_url: Url, token: Option<Token>) -> Self {
        Self {
            http,
            base_url,
            token: Arc::new(RwLock::new(token)),
        }
    }

    pub fn init(config: &Config) -> Result<Self> {
        let http = super::init_http_client(config)?;
        Ok(Self::new(
            http,
            config.base_url.clone(),
            config.token.clone(),
        ))
    }
}

impl ApiClient {
    pub async fn set_token(&self, token: Option<Token>) {
        *self.token.write().await = token;
    }

    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }

        base.join(path.trim_start_matches('/')).map_err(Error::from)
    }
}

impl ApiClient {
    pub async fn get<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.execute(Method::GET, path, |r| r).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(Method::POST, path, |r| r.json(body)).await
    }

    pub async fn post_empty<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.execute(Method::POST, path, |r| r).await
    }

    pub async fn post_multipart<T>(&self, path: &str, form: Form) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.execute(Method::POST, path, |r| r.multipart(form)).await
    }

    async fn execute<T, F>(&self, method: Method, path: &str, build: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let url = self.endpoint(path)?;
        debug!("{method} {url}");

        let mut request = self.http.request(method, url);
        if let Some(token) = self.token.read().await.as_ref() {
            request = request.bearer_auth(token.raw());
        }

        let response = build(request).send().await?;
        read_json(response).await
    }
}

async fn read_json<T>(response: Response) -> Result<T>
where
    T: DeserializeOwned,
{
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(status_error(status, text));
    }

    parse_json_safe(status, &text)
}

fn status_error(status: StatusCode, body: String) -> Error {
    let message = if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body
    };

    Error::Status {
        status: status.as_u16(),
        message,
    }
}

// 204 and blank bodies decode as JSON null
fn parse_json_safe<T>(status: StatusCode, text: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    if status == StatusCode::NO_CONTENT || text.trim().is_empty() {
        return serde_json::from_value(serde_json::Value::Null).map_err(Error::from);
    }

    serde_json::from_str(text).map_err(Error::from)
}
