use std::fmt::Display;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::integration;

pub mod model;
pub mod service;

type Result<T> = std::result::Result<T, Error>;
pub type Service = Arc<dyn service::ThreadService + Send + Sync>;

#[derive(Clone, Copy, Debug, Deserialize, Serialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Id(i64);

impl Id {
    pub const fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for Id {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Global,
    Group,
    Direct,
}

impl Kind {
    pub const fn as_str(&self) -> &str {
        match self {
            Self::Global => "global",
            Self::Group => "group",
            Self::Direct => "direct",
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("missing group name")]
    MissingName,
    #[error("group needs at least one member")]
    NoMembers,

    #[error(transparent)]
    _Integration(#[from] integration::Error),
}
