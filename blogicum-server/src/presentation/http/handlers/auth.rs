use axum::{Json, extract::State, response::Redirect};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::user::{LoginRequest, RegisterRequest, User};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::redirects;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct RegisterDto {
    #[validate(length(min = 1, max = 150, message = "must be 1..150 chars"))]
    pub(crate) username: String,
    #[serde(default)]
    pub(crate) email: String,
    #[validate(length(min = 8, max = 128, message = "must be 8..128 chars"))]
    pub(crate) password: String,
    #[serde(default)]
    #[validate(length(max = 150, message = "must be at most 150 chars"))]
    pub(crate) first_name: String,
    #[serde(default)]
    #[validate(length(max = 150, message = "must be at most 150 chars"))]
    pub(crate) last_name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct LoginDto {
    #[validate(length(min = 1, max = 150))]
    pub(crate) username: String,
    #[validate(length(min = 1))]
    pub(crate) password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AuthResponseDto {
    pub(crate) access_token: String,
    pub(crate) token_type: &'static str,
    pub(crate) expires_in: i64,
    pub(crate) user: UserDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct UserDto {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: user.created_at,
        }
    }
}

#[utoipa::path(
    post,
    path = "/auth/registration/",
    tag = "auth",
    request_body = RegisterDto,
    responses(
        (status = 303, description = "Registered; redirects to the login page"),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn register(
    State(state): State<AppState>,
    Json(dto): Json<RegisterDto>,
) -> AppResult<Redirect> {
    dto.validate()?;

    let req = RegisterRequest {
        username: dto.username,
        email: dto.email,
        password: dto.password,
        first_name: dto.first_name,
        last_name: dto.last_name,
    };

    state.auth_service.register(req).await?;

    Ok(redirects::login())
}

#[utoipa::path(
    post,
    path = "/auth/login/",
    tag = "auth",
    request_body = LoginDto,
    responses(
        (status = 200, description = "Login successful", body = AuthResponseDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    Json(dto): Json<LoginDto>,
) -> AppResult<Json<AuthResponseDto>> {
    dto.validate()?;

    let req = LoginRequest {
        username: dto.username,
        password: dto.password,
    };

    let result = state.auth_service.login(req).await?;

    Ok(Json(AuthResponseDto {
        access_token: result.access_token,
        token_type: "Bearer",
        expires_in: state.jwt.ttl_seconds(),
        user: result.user.into(),
    }))
}
