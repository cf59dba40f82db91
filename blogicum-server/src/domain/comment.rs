use chrono::{DateTime, Utc};

use super::error::DomainError;
use super::post::AuthorRef;

#[derive(Debug, Clone)]
pub(crate) struct Comment {
    pub(crate) id: i64,
    pub(crate) post_id: i64,
    pub(crate) author: AuthorRef,
    pub(crate) text: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl Comment {
    pub(crate) fn is_authored_by(&self, user_id: i64) -> bool {
        self.author.id == user_id
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CommentRequest {
    pub(crate) text: String,
}

impl CommentRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(DomainError::Validation {
                field: "text",
                message: "must not be empty",
            });
        }
        Ok(Self {
            text: text.to_string(),
        })
    }
}
