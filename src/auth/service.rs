use async_trait::async_trait;
use log::{debug, info};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;

use crate::integration::api::ApiClient;

use super::{Credentials, Me, Token, Tokens, Viewer};

const TOKEN_PATH: &str = "/api/auth/token/";
const REFRESH_PATH: &str = "/api/auth/refresh/";
const ME_PATH: &str = "/api/auth/me/";

#[async_trait]
pub trait AuthService {
    /// Obtains a token pair and starts sending the access token.
    async fn login(&self, credentials: &Credentials) -> super::Result<Tokens>;

    /// Exchanges the refresh token from the last login for a new access token.
    async fn refresh(&self) -> super::Result<Token>;

    /// `None` when the server does not consider the caller authenticated.
    async fn me(&self) -> super::Result<Option<Viewer>>;
}

pub struct AuthServiceImpl {
    api: ApiClient,
    refresh: RwLock<Option<Token>>,
}

impl AuthServiceImpl {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            refresh: RwLock::new(None),
        }
    }
}

#[derive(Deserialize)]
struct Refreshed {
    access: Token,
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    async fn login(&self, credentials: &Credentials) -> super::Result<Tokens> {
        let tokens: Tokens = self.api.post(TOKEN_PATH, credentials).await?;

        self.api.set_token(Some(tokens.access.clone())).await;
        *self.refresh.write().await = Some(tokens.refresh.clone());

        info!("logged in as {}", credentials.username());
        Ok(tokens)
    }

    async fn refresh(&self) -> super::Result<Token> {
        let refresh = self
            .refresh
            .read()
            .await
            .clone()
            .ok_or(super::Error::MissingRefreshToken)?;

        let refreshed: Refreshed = self
            .api
            .post(REFRESH_PATH, &json!({ "refresh": refresh }))
            .await?;

        self.api.set_token(Some(refreshed.access.clone())).await;
        debug!("access token refreshed");
        Ok(refreshed.access)
    }

    async fn me(&self) -> super::Result<Option<Viewer>> {
        let me: Me = self.api.get(ME_PATH).await?;
        Ok(me.into_viewer())
    }
}
