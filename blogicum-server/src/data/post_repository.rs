use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::error::DomainError;
use crate::domain::pagination::{Page, RequestedPage};
use crate::domain::post::Post;
use crate::domain::visibility::PostFilter;

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) author_id: i64,
    pub(crate) category_id: Option<i64>,
    pub(crate) location_id: Option<i64>,
    pub(crate) image: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct PostPatch {
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) category_id: Option<i64>,
    pub(crate) location_id: Option<i64>,
    pub(crate) image: Option<String>,
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError>;
    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError>;
    async fn delete_post_owned(&self, post_id: i64, owner_id: i64) -> Result<bool, DomainError>;
    /// Posts matching `filter`, newest first, cut to the requested page.
    async fn list_posts(
        &self,
        filter: &PostFilter,
        page: RequestedPage,
        page_size: u32,
    ) -> Result<Page<Post>, DomainError>;
}
