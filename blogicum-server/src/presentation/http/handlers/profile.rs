use axum::{
    Json,
    extract::{Path, Query, State},
    response::Redirect,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::auth::UserDto;
use super::posts::{PageDto, PageQuery, PostDto, PostListDto};
use crate::application::profile_service::ProfilePage;
use crate::domain::user::{ProfileRequest, User};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::middleware::auth::{AuthenticatedUser, CurrentViewer};
use crate::presentation::http::redirects;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct ProfileFormDto {
    #[validate(length(min = 1, max = 150, message = "must be 1..150 chars"))]
    pub(crate) username: String,
    #[serde(default)]
    pub(crate) email: String,
    #[serde(default)]
    #[validate(length(max = 150, message = "must be at most 150 chars"))]
    pub(crate) first_name: String,
    #[serde(default)]
    #[validate(length(max = 150, message = "must be at most 150 chars"))]
    pub(crate) last_name: String,
}

/// Public part of a user, shown on their profile page.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ProfileDto {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) date_joined: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ProfilePageDto {
    pub(crate) profile: ProfileDto,
    pub(crate) posts: Vec<PostDto>,
    pub(crate) page: PageDto,
}

impl From<User> for ProfileDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            date_joined: user.created_at,
        }
    }
}

impl From<ProfilePage> for ProfilePageDto {
    fn from(result: ProfilePage) -> Self {
        let list = PostListDto::from(result.posts);
        Self {
            profile: result.profile.into(),
            posts: list.posts,
            page: list.page,
        }
    }
}

#[utoipa::path(
    get,
    path = "/profile/{username}/",
    tag = "profile",
    params(
        ("username" = String, Path, description = "Username"),
        ("page" = Option<String>, Query, description = "Page number, 1-based")
    ),
    responses(
        (status = 200, description = "Profile with posts; the owner also sees hidden ones", body = ProfilePageDto),
        (status = 401, description = "Invalid token"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn profile(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ProfilePageDto>> {
    let result = state
        .profile_service
        .profile(viewer, &username, query.requested())
        .await?;
    Ok(Json(ProfilePageDto::from(result)))
}

#[utoipa::path(
    get,
    path = "/profile/edit/",
    tag = "profile",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Current profile", body = UserDto),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn edit_profile_form(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<Json<UserDto>> {
    let user = state.profile_service.current_profile(auth.user_id).await?;
    Ok(Json(UserDto::from(user)))
}

#[utoipa::path(
    post,
    path = "/profile/edit/",
    tag = "profile",
    security(
        ("bearer_auth" = [])
    ),
    request_body = ProfileFormDto,
    responses(
        (status = 303, description = "Updated; redirects to the profile"),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn edit_profile(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<ProfileFormDto>,
) -> AppResult<Redirect> {
    dto.validate()?;

    let req = ProfileRequest {
        username: dto.username,
        email: dto.email,
        first_name: dto.first_name,
        last_name: dto.last_name,
    };
    let user = state.profile_service.edit_profile(auth.user_id, req).await?;
    Ok(redirects::profile(&user.username))
}
