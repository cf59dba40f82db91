use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::OwnerOutcome;
use crate::data::Repositories;
use crate::data::category_repository::CategoryRepository;
use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::{NewPost, PostPatch, PostRepository};
use crate::domain::category::Category;
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::pagination::{Page, RequestedPage};
use crate::domain::post::{Post, PostRequest};
use crate::domain::visibility::{PostFilter, PostScope, Viewer, can_view};

#[derive(Debug, Clone)]
pub(crate) struct CategoryPage {
    pub(crate) category: Category,
    pub(crate) posts: Page<Post>,
}

#[derive(Debug, Clone)]
pub(crate) struct PostDetail {
    pub(crate) post: Post,
    pub(crate) comments: Vec<Comment>,
}

pub(crate) struct BlogService {
    posts: Arc<dyn PostRepository>,
    categories: Arc<dyn CategoryRepository>,
    comments: Arc<dyn CommentRepository>,
    page_size: u32,
}

impl BlogService {
    pub(crate) fn new(repos: &Repositories, page_size: u32) -> Self {
        Self {
            posts: repos.posts.clone(),
            categories: repos.categories.clone(),
            comments: repos.comments.clone(),
            page_size,
        }
    }

    pub(crate) async fn index(&self, page: RequestedPage) -> Result<Page<Post>, DomainError> {
        let filter = PostFilter::public(PostScope::All, Utc::now());
        self.posts.list_posts(&filter, page, self.page_size).await
    }

    /// Public posts of a published category. Unpublished categories look
    /// exactly like missing ones.
    pub(crate) async fn category_posts(
        &self,
        slug: &str,
        page: RequestedPage,
    ) -> Result<CategoryPage, DomainError> {
        let category = self
            .categories
            .find_by_slug(slug)
            .await?
            .filter(|category| category.is_published)
            .ok_or_else(|| DomainError::NotFound(format!("category slug: {slug}")))?;

        let filter = PostFilter::public(PostScope::Category(category.id), Utc::now());
        let posts = self
            .posts
            .list_posts(&filter, page, self.page_size)
            .await?;
        Ok(CategoryPage { category, posts })
    }

    pub(crate) async fn post_detail(
        &self,
        viewer: Viewer,
        post_id: i64,
    ) -> Result<PostDetail, DomainError> {
        let post = load_visible_post(self.posts.as_ref(), viewer, post_id).await?;
        let comments = self.comments.list_comments(post.id).await?;
        Ok(PostDetail { post, comments })
    }

    pub(crate) async fn create_post(
        &self,
        author_id: i64,
        req: PostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;

        let new_post = NewPost {
            title: req.title,
            text: req.text,
            pub_date: req.pub_date.unwrap_or_else(Utc::now),
            author_id,
            category_id: req.category_id,
            location_id: req.location_id,
            image: req.image,
        };
        let post = self.posts.create_post(new_post).await?;
        info!(post_id = post.id, author_id, "post created");
        Ok(post)
    }

    /// The post, if `actor_id` wrote it. Backs the edit and delete forms.
    pub(crate) async fn owned_post(
        &self,
        actor_id: i64,
        post_id: i64,
    ) -> Result<OwnerOutcome<Post>, DomainError> {
        let post = self.existing_post(post_id).await?;
        if !post.is_authored_by(actor_id) {
            return Ok(OwnerOutcome::NotOwner);
        }
        Ok(OwnerOutcome::Done(post))
    }

    pub(crate) async fn edit_post(
        &self,
        actor_id: i64,
        post_id: i64,
        req: PostRequest,
    ) -> Result<OwnerOutcome<Post>, DomainError> {
        let original = match self.owned_post(actor_id, post_id).await? {
            OwnerOutcome::Done(post) => post,
            OwnerOutcome::NotOwner => return Ok(OwnerOutcome::NotOwner),
        };
        let req = req.validate()?;

        let patch = PostPatch {
            title: req.title,
            text: req.text,
            pub_date: req.pub_date.unwrap_or(original.pub_date),
            category_id: req.category_id,
            location_id: req.location_id,
            image: req.image,
        };
        let post = self
            .posts
            .update_post_owned(post_id, actor_id, patch)
            .await?
            .ok_or_else(|| DomainError::post_not_found(post_id))?;
        info!(post_id, actor_id, "post updated");
        Ok(OwnerOutcome::Done(post))
    }

    pub(crate) async fn delete_post(
        &self,
        actor_id: i64,
        post_id: i64,
    ) -> Result<OwnerOutcome<()>, DomainError> {
        if let OwnerOutcome::NotOwner = self.owned_post(actor_id, post_id).await? {
            return Ok(OwnerOutcome::NotOwner);
        }

        let deleted = self.posts.delete_post_owned(post_id, actor_id).await?;
        if !deleted {
            return Err(DomainError::post_not_found(post_id));
        }
        info!(post_id, actor_id, "post deleted");
        Ok(OwnerOutcome::Done(()))
    }

    async fn existing_post(&self, post_id: i64) -> Result<Post, DomainError> {
        self.posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(post_id))
    }
}

/// Loads a post for `viewer`. Posts the viewer may not see are reported as
/// missing.
pub(crate) async fn load_visible_post(
    posts: &dyn PostRepository,
    viewer: Viewer,
    post_id: i64,
) -> Result<Post, DomainError> {
    posts
        .get_post(post_id)
        .await?
        .filter(|post| can_view(post, viewer, Utc::now()))
        .ok_or_else(|| DomainError::post_not_found(post_id))
}
