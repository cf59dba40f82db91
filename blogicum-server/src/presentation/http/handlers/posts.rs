use axum::{
    Json,
    extract::{Path, Query, State},
    response::Redirect,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::comments::CommentDto;
use crate::application::OwnerOutcome;
use crate::application::blog_service::{CategoryPage, PostDetail};
use crate::domain::category::Category;
use crate::domain::pagination::{Page, RequestedPage};
use crate::domain::post::{AuthorRef, CategoryRef, LocationRef, Post, PostRequest};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::middleware::auth::{AuthenticatedUser, CurrentViewer};
use crate::presentation::http::redirects::{self, Rendered};

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct PageQuery {
    /// 1-based page number; anything unparsable means the first page.
    pub(crate) page: Option<String>,
}

impl PageQuery {
    pub(crate) fn requested(&self) -> RequestedPage {
        RequestedPage::parse(self.page.as_deref())
    }
}

/// Create and edit form. `pub_date` defaults to now on create and is kept
/// as-is on edit when omitted.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct PostFormDto {
    #[validate(length(min = 1, max = 256, message = "must be 1..256 chars"))]
    pub(crate) title: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub(crate) text: String,
    pub(crate) pub_date: Option<DateTime<Utc>>,
    pub(crate) category: Option<i64>,
    pub(crate) location: Option<i64>,
    #[validate(length(max = 255, message = "must be at most 255 chars"))]
    pub(crate) image: Option<String>,
}

impl From<PostFormDto> for PostRequest {
    fn from(dto: PostFormDto) -> Self {
        Self {
            title: dto.title,
            text: dto.text,
            pub_date: dto.pub_date,
            category_id: dto.category,
            location_id: dto.location,
            image: dto.image,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AuthorDto {
    pub(crate) id: i64,
    pub(crate) username: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CategoryRefDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct LocationDto {
    pub(crate) id: i64,
    pub(crate) name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) is_published: bool,
    pub(crate) author: AuthorDto,
    pub(crate) category: Option<CategoryRefDto>,
    pub(crate) location: Option<LocationDto>,
    pub(crate) image: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) comment_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PageDto {
    pub(crate) number: u32,
    pub(crate) num_pages: u32,
    pub(crate) page_size: u32,
    pub(crate) total: u64,
    pub(crate) has_next: bool,
    pub(crate) has_previous: bool,
    pub(crate) next_page_number: Option<u32>,
    pub(crate) previous_page_number: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostListDto {
    pub(crate) posts: Vec<PostDto>,
    pub(crate) page: PageDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CategoryDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) slug: String,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CategoryPageDto {
    pub(crate) category: CategoryDto,
    pub(crate) posts: Vec<PostDto>,
    pub(crate) page: PageDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDetailDto {
    pub(crate) post: PostDto,
    pub(crate) comments: Vec<CommentDto>,
}

impl From<AuthorRef> for AuthorDto {
    fn from(author: AuthorRef) -> Self {
        Self {
            id: author.id,
            username: author.username,
        }
    }
}

impl From<CategoryRef> for CategoryRefDto {
    fn from(category: CategoryRef) -> Self {
        Self {
            id: category.id,
            title: category.title,
            slug: category.slug,
        }
    }
}

impl From<LocationRef> for LocationDto {
    fn from(location: LocationRef) -> Self {
        Self {
            id: location.id,
            name: location.name,
        }
    }
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            text: post.text,
            pub_date: post.pub_date,
            is_published: post.is_published,
            author: post.author.into(),
            category: post.category.map(CategoryRefDto::from),
            location: post.location.map(LocationDto::from),
            image: post.image,
            created_at: post.created_at,
            comment_count: post.comment_count,
        }
    }
}

impl From<Category> for CategoryDto {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            title: category.title,
            description: category.description,
            slug: category.slug,
            created_at: category.created_at,
        }
    }
}

impl From<Page<Post>> for PostListDto {
    fn from(page: Page<Post>) -> Self {
        let meta = PageDto {
            number: page.number(),
            num_pages: page.num_pages(),
            page_size: page.window.page_size(),
            total: page.window.total(),
            has_next: page.has_next(),
            has_previous: page.has_previous(),
            next_page_number: page.next_page_number(),
            previous_page_number: page.previous_page_number(),
        };
        Self {
            posts: page.items.into_iter().map(PostDto::from).collect(),
            page: meta,
        }
    }
}

impl From<CategoryPage> for CategoryPageDto {
    fn from(result: CategoryPage) -> Self {
        let list = PostListDto::from(result.posts);
        Self {
            category: result.category.into(),
            posts: list.posts,
            page: list.page,
        }
    }
}

impl From<PostDetail> for PostDetailDto {
    fn from(detail: PostDetail) -> Self {
        Self {
            post: detail.post.into(),
            comments: detail.comments.into_iter().map(CommentDto::from).collect(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/",
    tag = "posts",
    params(
        ("page" = Option<String>, Query, description = "Page number, 1-based")
    ),
    responses(
        (status = 200, description = "Public posts, newest first", body = PostListDto),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PostListDto>> {
    let page = state.blog_service.index(query.requested()).await?;
    Ok(Json(PostListDto::from(page)))
}

#[utoipa::path(
    get,
    path = "/category/{slug}/",
    tag = "posts",
    params(
        ("slug" = String, Path, description = "Category slug"),
        ("page" = Option<String>, Query, description = "Page number, 1-based")
    ),
    responses(
        (status = 200, description = "Category with its public posts", body = CategoryPageDto),
        (status = 404, description = "Category missing or unpublished"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn category_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<CategoryPageDto>> {
    let result = state
        .blog_service
        .category_posts(&slug, query.requested())
        .await?;
    Ok(Json(CategoryPageDto::from(result)))
}

#[utoipa::path(
    get,
    path = "/posts/{post_id}/",
    tag = "posts",
    params(
        ("post_id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post with its comments", body = PostDetailDto),
        (status = 401, description = "Invalid token"),
        (status = 404, description = "Post missing or hidden from the viewer"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn post_detail(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(post_id): Path<i64>,
) -> AppResult<Json<PostDetailDto>> {
    let detail = state.blog_service.post_detail(viewer, post_id).await?;
    Ok(Json(PostDetailDto::from(detail)))
}

#[utoipa::path(
    post,
    path = "/posts/create/",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = PostFormDto,
    responses(
        (status = 303, description = "Created; redirects to the author's profile"),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<PostFormDto>,
) -> AppResult<Redirect> {
    dto.validate()?;

    let post = state
        .blog_service
        .create_post(auth.user_id, dto.into())
        .await?;
    Ok(redirects::profile(&post.author.username))
}

#[utoipa::path(
    get,
    path = "/posts/{post_id}/edit/",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("post_id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Current post data", body = PostDto),
        (status = 303, description = "Not the author; redirects to the post"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn edit_post_form(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(post_id): Path<i64>,
) -> AppResult<Rendered<PostDto>> {
    owned_post_form(&state, auth, post_id).await
}

#[utoipa::path(
    post,
    path = "/posts/{post_id}/edit/",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("post_id" = i64, Path, description = "Post id")
    ),
    request_body = PostFormDto,
    responses(
        (status = 303, description = "Redirects to the post, updated only for its author"),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn edit_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(post_id): Path<i64>,
    Json(dto): Json<PostFormDto>,
) -> AppResult<Redirect> {
    if let OwnerOutcome::NotOwner = state.blog_service.owned_post(auth.user_id, post_id).await? {
        return Ok(redirects::post_detail(post_id));
    }
    dto.validate()?;

    state
        .blog_service
        .edit_post(auth.user_id, post_id, dto.into())
        .await?;
    Ok(redirects::post_detail(post_id))
}

#[utoipa::path(
    get,
    path = "/posts/{post_id}/delete/",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("post_id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post to confirm deletion of", body = PostDto),
        (status = 303, description = "Not the author; redirects to the post"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_post_form(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(post_id): Path<i64>,
) -> AppResult<Rendered<PostDto>> {
    owned_post_form(&state, auth, post_id).await
}

#[utoipa::path(
    post,
    path = "/posts/{post_id}/delete/",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("post_id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 303, description = "Deleted and redirected to the index, or redirected to the post for non-authors"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(post_id): Path<i64>,
) -> AppResult<Redirect> {
    match state.blog_service.delete_post(auth.user_id, post_id).await? {
        OwnerOutcome::Done(()) => Ok(redirects::index()),
        OwnerOutcome::NotOwner => Ok(redirects::post_detail(post_id)),
    }
}

async fn owned_post_form(
    state: &AppState,
    auth: AuthenticatedUser,
    post_id: i64,
) -> AppResult<Rendered<PostDto>> {
    match state.blog_service.owned_post(auth.user_id, post_id).await? {
        OwnerOutcome::Done(post) => Ok(Rendered::Json(post.into())),
        OwnerOutcome::NotOwner => Ok(Rendered::Redirect(redirects::post_detail(post_id))),
    }
}
