use async_trait::async_trait;
use log::debug;
use reqwest::multipart::{Form, Part};

use crate::integration::api::ApiClient;
use crate::thread;

use super::model::{Message, Upload};

#[async_trait]
pub trait MessageService {
    async fn find_by_thread(&self, thread_id: &thread::Id) -> super::Result<Vec<Message>>;

    /// Posts `body` (already trimmed) with `files` to the thread.
    async fn send(
        &self,
        thread_id: &thread::Id,
        body: &str,
        files: &[Upload],
    ) -> super::Result<Message>;
}

#[derive(Clone)]
pub struct MessageServiceImpl {
    api: ApiClient,
}

impl MessageServiceImpl {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

fn messages_path(thread_id: &thread::Id) -> String {
    format!("/api/chat/threads/{thread_id}/messages/")
}

#[async_trait]
impl MessageService for MessageServiceImpl {
    async fn find_by_thread(&self, thread_id: &thread::Id) -> super::Result<Vec<Message>> {
        self.api
            .get(&messages_path(thread_id))
            .await
            .map_err(super::Error::from)
    }

    async fn send(
        &self,
        thread_id: &thread::Id,
        body: &str,
        files: &[Upload],
    ) -> super::Result<Message> {
        if body.trim().is_empty() && files.is_empty() {
            return Err(super::Error::Empty);
        }

        let form = files
            .iter()
            .try_fold(Form::new().text("body", body.to_string()), |form, f| {
                file_part(f).map(|part| form.part("files", part))
            })?;

        debug!(
            "sending message with {} file(s), {} bytes to thread {thread_id}",
            files.len(),
            files.iter().map(Upload::size).sum::<usize>()
        );

        self.api
            .post_multipart(&messages_path(thread_id), form)
            .await
            .map_err(super::Error::from)
    }
}

fn file_part(upload: &Upload) -> super::Result<Part> {
    let part = Part::bytes(upload.content().to_vec()).file_name(upload.filename().to_string());

    match upload.content_type() {
        Some(ct) => part
            .mime_str(ct)
            .map_err(|_| super::Error::InvalidContentType(ct.to_string())),
        None => Ok(part),
    }
}
