use async_trait::async_trait;
use serde::de::IgnoredAny;
use serde_json::json;

use crate::integration::api::ApiClient;
use crate::user;

use super::Id;
use super::model::{NewGroup, Thread, UnreadCount};

const THREADS_PATH: &str = "/api/chat/threads/";
const DIRECT_PATH: &str = "/api/chat/threads/direct/";
const GROUP_PATH: &str = "/api/chat/threads/group/";
const UNREAD_PATH: &str = "/api/chat/unread-count/";

#[async_trait]
pub trait ThreadService {
    async fn find_all(&self) -> super::Result<Vec<Thread>>;

    /// Looks up the one-to-one thread with `user_id`, creating it if needed.
    async fn create_direct(&self, user_id: &user::Id) -> super::Result<Thread>;

    async fn create_group(&self, group: &NewGroup) -> super::Result<Thread>;

    async fn leave(&self, id: &Id) -> super::Result<()>;

    async fn mark_read(&self, id: &Id) -> super::Result<()>;

    /// Unread messages across all threads of the viewer.
    async fn unread_count(&self) -> super::Result<u32>;
}

#[derive(Clone)]
pub struct ThreadServiceImpl {
    api: ApiClient,
}

impl ThreadServiceImpl {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ThreadService for ThreadServiceImpl {
    async fn find_all(&self) -> super::Result<Vec<Thread>> {
        self.api.get(THREADS_PATH).await.map_err(super::Error::from)
    }

    async fn create_direct(&self, user_id: &user::Id) -> super::Result<Thread> {
        self.api
            .post(DIRECT_PATH, &json!({ "user_id": user_id }))
            .await
            .map_err(super::Error::from)
    }

    async fn create_group(&self, group: &NewGroup) -> super::Result<Thread> {
        self.api
            .post(GROUP_PATH, group)
            .await
            .map_err(super::Error::from)
    }

    async fn leave(&self, id: &Id) -> super::Result<()> {
        let path = format!("{THREADS_PATH}{id}/leave/");
        self.api.post_empty::<IgnoredAny>(&path).await?;
        Ok(())
    }

    async fn mark_read(&self, id: &Id) -> super::Result<()> {
        let path = format!("{THREADS_PATH}{id}/read/");
        self.api.post_empty::<IgnoredAny>(&path).await?;
        Ok(())
    }

    async fn unread_count(&self) -> super::Result<u32> {
        let count: Option<UnreadCount> = self.api.get(UNREAD_PATH).await?;
        Ok(count.unwrap_or_default().unread_count)
    }
}
