use async_trait::async_trait;

use crate::integration::api::ApiClient;

use super::model::User;

const USERS_PATH: &str = "/api/chat/users/";

#[async_trait]
pub trait UserService {
    /// Directory users, each with their online flag.
    async fn find_all(&self) -> super::Result<Vec<User>>;
}

#[derive(Clone)]
pub struct UserServiceImpl {
    api: ApiClient,
}

impl UserServiceImpl {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    async fn find_all(&self) -> super::Result<Vec<User>> {
        self.api.get(USERS_PATH).await.map_err(super::Error::from)
    }
}
