use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{Raw, Redact, integration, user};

pub mod service;

type Result<T> = std::result::Result<T, Error>;
pub type Service = Arc<dyn service::AuthService + Send + Sync>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("refresh token is missing")]
    MissingRefreshToken,

    #[error(transparent)]
    _Integration(#[from] integration::Error),
}

#[derive(Clone, Deserialize, Serialize, PartialEq)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

impl Raw for Token {
    fn raw(&self) -> &str {
        &self.0
    }
}

impl Redact for Token {}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({})", self.redact())
    }
}

#[derive(Clone, Deserialize, Debug)]
pub struct Tokens {
    pub access: Token,
    pub refresh: Token,
}

#[derive(Clone, Serialize)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// The authenticated identity the drawer acts as. The server does not always
/// report an id.
#[derive(Clone, Debug, PartialEq)]
pub struct Viewer {
    id: Option<user::Id>,
    username: String,
    is_staff: bool,
}

impl Viewer {
    pub fn new(id: Option<user::Id>, username: impl Into<String>, is_staff: bool) -> Self {
        Self {
            id,
            username: username.into(),
            is_staff,
        }
    }

    pub const fn id(&self) -> Option<user::Id> {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub const fn is_staff(&self) -> bool {
        self.is_staff
    }
}

#[derive(Deserialize, Debug)]
pub(crate) struct Me {
    authenticated: bool,
    id: Option<i64>,
    username: Option<String>,
    is_staff: Option<bool>,
}

impl Me {
    pub(crate) fn into_viewer(self) -> Option<Viewer> {
        if !self.authenticated {
            return None;
        }

        Some(Viewer::new(
            self.id.filter(|id| *id > 0).map(user::Id::from),
            self.username.unwrap_or_default(),
            self.is_staff.unwrap_or(false),
        ))
    }
}
