use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum DomainError {
    #[error("validation failed for '{field}': {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("resource already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("unexpected domain error: {0}")]
    Unexpected(String),
}

impl DomainError {
    pub(crate) fn post_not_found(id: i64) -> Self {
        Self::NotFound(format!("post id: {id}"))
    }

    pub(crate) fn comment_not_found(id: i64) -> Self {
        Self::NotFound(format!("comment id: {id}"))
    }

    pub(crate) fn username_taken() -> Self {
        Self::Validation {
            field: "username",
            message: "a user with that username already exists",
        }
    }
}
