use axum::{
    Json,
    extract::{Path, State},
    response::Redirect,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::posts::AuthorDto;
use crate::application::OwnerOutcome;
use crate::domain::comment::{Comment, CommentRequest};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::middleware::auth::AuthenticatedUser;
use crate::presentation::http::redirects::{self, Rendered};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CommentFormDto {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub(crate) text: String,
}

impl From<CommentFormDto> for CommentRequest {
    fn from(dto: CommentFormDto) -> Self {
        Self { text: dto.text }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentDto {
    pub(crate) id: i64,
    pub(crate) post_id: i64,
    pub(crate) author: AuthorDto,
    pub(crate) text: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<Comment> for CommentDto {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            author: comment.author.into(),
            text: comment.text,
            created_at: comment.created_at,
        }
    }
}

#[utoipa::path(
    post,
    path = "/posts/{post_id}/comment/",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("post_id" = i64, Path, description = "Post id")
    ),
    request_body = CommentFormDto,
    responses(
        (status = 303, description = "Comment added; redirects to the post"),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post missing or hidden from the commenter"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn add_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(post_id): Path<i64>,
    Json(dto): Json<CommentFormDto>,
) -> AppResult<Redirect> {
    dto.validate()?;

    state
        .comment_service
        .add_comment(auth.user_id, post_id, dto.into())
        .await?;
    Ok(redirects::post_detail(post_id))
}

#[utoipa::path(
    get,
    path = "/posts/{post_id}/edit_comment/{comment_id}/",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("post_id" = i64, Path, description = "Post id"),
        ("comment_id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Current comment", body = CommentDto),
        (status = 303, description = "Not the author; redirects to the post"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post or comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn edit_comment_form(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> AppResult<Rendered<CommentDto>> {
    owned_comment_form(&state, auth, post_id, comment_id).await
}

#[utoipa::path(
    post,
    path = "/posts/{post_id}/edit_comment/{comment_id}/",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("post_id" = i64, Path, description = "Post id"),
        ("comment_id" = i64, Path, description = "Comment id")
    ),
    request_body = CommentFormDto,
    responses(
        (status = 303, description = "Redirects to the post, updated only for its author"),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post or comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn edit_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path((post_id, comment_id)): Path<(i64, i64)>,
    Json(dto): Json<CommentFormDto>,
) -> AppResult<Redirect> {
    if let OwnerOutcome::NotOwner = state
        .comment_service
        .owned_comment(auth.user_id, post_id, comment_id)
        .await?
    {
        return Ok(redirects::post_detail(post_id));
    }
    dto.validate()?;

    state
        .comment_service
        .edit_comment(auth.user_id, post_id, comment_id, dto.into())
        .await?;
    Ok(redirects::post_detail(post_id))
}

#[utoipa::path(
    get,
    path = "/posts/{post_id}/delete_comment/{comment_id}/",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("post_id" = i64, Path, description = "Post id"),
        ("comment_id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Comment to confirm deletion of", body = CommentDto),
        (status = 303, description = "Not the author; redirects to the post"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post or comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_comment_form(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> AppResult<Rendered<CommentDto>> {
    owned_comment_form(&state, auth, post_id, comment_id).await
}

#[utoipa::path(
    post,
    path = "/posts/{post_id}/delete_comment/{comment_id}/",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("post_id" = i64, Path, description = "Post id"),
        ("comment_id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 303, description = "Redirects to the post, deleted only for its author"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post or comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> AppResult<Redirect> {
    state
        .comment_service
        .delete_comment(auth.user_id, post_id, comment_id)
        .await?;
    Ok(redirects::post_detail(post_id))
}

async fn owned_comment_form(
    state: &AppState,
    auth: AuthenticatedUser,
    post_id: i64,
    comment_id: i64,
) -> AppResult<Rendered<CommentDto>> {
    match state
        .comment_service
        .owned_comment(auth.user_id, post_id, comment_id)
        .await?
    {
        OwnerOutcome::Done(comment) => Ok(Rendered::Json(comment.into())),
        OwnerOutcome::NotOwner => Ok(Rendered::Redirect(redirects::post_detail(post_id))),
    }
}
