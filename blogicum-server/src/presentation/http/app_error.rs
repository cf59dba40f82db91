use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;
use validator::ValidationErrors;

use crate::domain::error::DomainError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("not found")]
    NotFound,

    #[error("unauthorized")]
    Unauthorized,
}

pub(crate) type AppResult<T> = Result<T, AppError>;

/// Error payload. `fields` maps form field names to their messages.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ErrorBody {
    pub(crate) error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) fields: Option<BTreeMap<String, Vec<String>>>,
}

impl ErrorBody {
    fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            fields: None,
        }
    }

    fn with_fields(fields: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            error: "validation failed".to_string(),
            fields: Some(fields),
        }
    }
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Domain(err) => match err {
                DomainError::Validation { field, message } => (
                    StatusCode::BAD_REQUEST,
                    ErrorBody::with_fields(BTreeMap::from([(
                        field.to_string(),
                        vec![message.to_string()],
                    )])),
                ),
                DomainError::AlreadyExists(_) => {
                    (StatusCode::CONFLICT, ErrorBody::message(err.to_string()))
                }
                DomainError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, ErrorBody::message(err.to_string()))
                }
                DomainError::NotFound(_) => {
                    (StatusCode::NOT_FOUND, ErrorBody::message("not found"))
                }
                DomainError::Unexpected(reason) => {
                    error!(%reason, "request failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorBody::message("internal error"),
                    )
                }
            },
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::with_fields(field_messages(&errors)),
            ),
            AppError::NotFound => (StatusCode::NOT_FOUND, ErrorBody::message("not found")),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, ErrorBody::message("unauthorized")),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let messages = errors
                .iter()
                .map(|error| {
                    error
                        .message
                        .as_ref()
                        .map(|message| message.to_string())
                        .unwrap_or_else(|| error.code.to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use validator::Validate;

    use super::AppError;
    use crate::domain::error::DomainError;

    #[derive(Validate)]
    struct Form {
        #[validate(length(min = 1, message = "must not be empty"))]
        title: String,
    }

    #[test]
    fn domain_errors_map_to_http_statuses() {
        let cases = [
            (DomainError::NotFound("post id: 1".into()), StatusCode::NOT_FOUND),
            (DomainError::AlreadyExists("username".into()), StatusCode::CONFLICT),
            (DomainError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (
                DomainError::Unexpected("db down".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            let (status, body) = AppError::from(err).status_and_body();
            assert_eq!(status, expected);
            assert!(body.fields.is_none());
        }
    }

    #[test]
    fn internal_details_are_not_exposed() {
        let (_, body) = AppError::from(DomainError::Unexpected("secret sql".into())).status_and_body();
        assert_eq!(body.error, "internal error");
    }

    #[test]
    fn domain_validation_reports_the_field() {
        let (status, body) = AppError::from(DomainError::Validation {
            field: "category",
            message: "select a valid choice",
        })
        .status_and_body();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let fields = body.fields.expect("fields must be present");
        assert_eq!(fields["category"], vec!["select a valid choice".to_string()]);
    }

    #[test]
    fn dto_validation_reports_each_field() {
        let errors = Form {
            title: String::new(),
        }
        .validate()
        .expect_err("empty title must fail");

        let (status, body) = AppError::from(errors).status_and_body();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let fields = body.fields.expect("fields must be present");
        assert_eq!(fields["title"], vec!["must not be empty".to_string()]);
    }
}
