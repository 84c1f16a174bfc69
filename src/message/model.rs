use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::user::model::User;

use super::{AttachmentId, Id};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Message {
    pub id: Id,
    pub sender: User,
    #[serde(default)]
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub files: Vec<Attachment>,
}

impl Message {
    /// Body text, if it has any non-blank content.
    pub fn text(&self) -> Option<&str> {
        self.body.as_deref().filter(|b| !b.trim().is_empty())
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Attachment {
    pub id: AttachmentId,
    pub filename: String,
    pub url: String,
    #[serde(default)]
    pub signed_url: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

impl Attachment {
    /// Link to open: the signed URL when the server issued one.
    pub fn href(&self) -> &str {
        self.signed_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(&self.url)
    }
}

/// A file selected for sending.
#[derive(Clone, Debug, PartialEq)]
pub struct Upload {
    filename: String,
    content_type: Option<String>,
    content: Bytes,
}

impl Upload {
    pub fn new(filename: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            content: content.into(),
        }
    }

    pub fn with_content_type(self, content_type: impl Into<String>) -> Self {
        Self {
            content_type: Some(content_type.into()),
            ..self
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// The compose form of the drawer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Draft {
    pub body: String,
    pub files: Vec<Upload>,
}

impl Draft {
    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty() && self.files.is_empty()
    }

    pub fn clear(&mut self) {
        self.body.clear();
        self.files.clear();
    }
}
