use serde::{Deserialize, Serialize};

use super::Id;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct User {
    pub id: Id,
    pub username: String,
    #[serde(default)]
    pub is_online: bool,
}

impl User {
    pub fn new(id: Id, username: impl Into<String>, is_online: bool) -> Self {
        Self {
            id,
            username: username.into(),
            is_online,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Participant {
    pub user: User,
}

impl From<User> for Participant {
    fn from(user: User) -> Self {
        Self { user }
    }
}
