use std::sync::Arc;

use tracing::info;

use super::OwnerOutcome;
use super::blog_service::load_visible_post;
use crate::data::Repositories;
use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::post_repository::PostRepository;
use crate::domain::comment::{Comment, CommentRequest};
use crate::domain::error::DomainError;
use crate::domain::visibility::Viewer;

pub(crate) struct CommentService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl CommentService {
    pub(crate) fn new(repos: &Repositories) -> Self {
        Self {
            posts: repos.posts.clone(),
            comments: repos.comments.clone(),
        }
    }

    /// Comments can only be left on posts the author is allowed to see.
    pub(crate) async fn add_comment(
        &self,
        author_id: i64,
        post_id: i64,
        req: CommentRequest,
    ) -> Result<Comment, DomainError> {
        let viewer = Viewer::Authenticated { user_id: author_id };
        let post = load_visible_post(self.posts.as_ref(), viewer, post_id).await?;
        let req = req.validate()?;

        let comment = self
            .comments
            .create_comment(NewComment {
                post_id: post.id,
                author_id,
                text: req.text,
            })
            .await?;
        info!(comment_id = comment.id, post_id, author_id, "comment added");
        Ok(comment)
    }

    /// The comment under `post_id`, if `actor_id` wrote it. Backs the edit
    /// and delete forms.
    pub(crate) async fn owned_comment(
        &self,
        actor_id: i64,
        post_id: i64,
        comment_id: i64,
    ) -> Result<OwnerOutcome<Comment>, DomainError> {
        if self.posts.get_post(post_id).await?.is_none() {
            return Err(DomainError::post_not_found(post_id));
        }
        let comment = self
            .comments
            .get_comment(post_id, comment_id)
            .await?
            .ok_or_else(|| DomainError::comment_not_found(comment_id))?;

        if !comment.is_authored_by(actor_id) {
            return Ok(OwnerOutcome::NotOwner);
        }
        Ok(OwnerOutcome::Done(comment))
    }

    pub(crate) async fn edit_comment(
        &self,
        actor_id: i64,
        post_id: i64,
        comment_id: i64,
        req: CommentRequest,
    ) -> Result<OwnerOutcome<Comment>, DomainError> {
        if let OwnerOutcome::NotOwner = self.owned_comment(actor_id, post_id, comment_id).await? {
            return Ok(OwnerOutcome::NotOwner);
        }
        let req = req.validate()?;

        let comment = self
            .comments
            .update_comment_owned(comment_id, actor_id, req.text)
            .await?
            .ok_or_else(|| DomainError::comment_not_found(comment_id))?;
        info!(comment_id, post_id, actor_id, "comment updated");
        Ok(OwnerOutcome::Done(comment))
    }

    pub(crate) async fn delete_comment(
        &self,
        actor_id: i64,
        post_id: i64,
        comment_id: i64,
    ) -> Result<OwnerOutcome<()>, DomainError> {
        if let OwnerOutcome::NotOwner = self.owned_comment(actor_id, post_id, comment_id).await? {
            return Ok(OwnerOutcome::NotOwner);
        }

        let deleted = self
            .comments
            .delete_comment_owned(comment_id, actor_id)
            .await?;
        if !deleted {
            return Err(DomainError::comment_not_found(comment_id));
        }
        info!(comment_id, post_id, actor_id, "comment deleted");
        Ok(OwnerOutcome::Done(()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::CommentService;
    use crate::application::OwnerOutcome;
    use crate::application::blog_service::BlogService;
    use crate::application::test_support::{category, post_form, user};
    use crate::data::Repositories;
    use crate::data::comment_repository::CommentRepository;
    use crate::data::post_repository::PostRepository;
    use crate::data::repositories::memory::MemoryStore;
    use crate::domain::comment::CommentRequest;
    use crate::domain::error::DomainError;
    use crate::domain::post::Post;
    use crate::domain::user::User;

    struct Setup {
        store: MemoryStore,
        comments: CommentService,
        author: User,
        reader: User,
        post: Post,
    }

    async fn setup() -> Setup {
        let store = MemoryStore::default();
        let repos = Repositories::memory(store.clone());
        let blog = BlogService::new(&repos, 10);
        let author = user(&store, "author").await;
        let reader = user(&store, "reader").await;
        let news = category(&store, "news", true);
        let post = blog
            .create_post(author.id, post_form("post", news.id, 5))
            .await
            .expect("create must succeed");

        Setup {
            store,
            comments: CommentService::new(&repos),
            author,
            reader,
            post,
        }
    }

    fn text(value: &str) -> CommentRequest {
        CommentRequest {
            text: value.to_string(),
        }
    }

    async fn comment_count(store: &MemoryStore, post_id: i64) -> i64 {
        store
            .get_post(post_id)
            .await
            .expect("lookup must succeed")
            .expect("post must exist")
            .comment_count
    }

    #[tokio::test]
    async fn deleting_a_comment_decrements_the_count_by_one() {
        let s = setup().await;
        let first = s
            .comments
            .add_comment(s.reader.id, s.post.id, text("first"))
            .await
            .expect("comment must be added");
        s.comments
            .add_comment(s.author.id, s.post.id, text("second"))
            .await
            .expect("comment must be added");
        assert_eq!(comment_count(&s.store, s.post.id).await, 2);

        let outcome = s
            .comments
            .delete_comment(s.reader.id, s.post.id, first.id)
            .await
            .expect("delete must succeed");
        assert!(matches!(outcome, OwnerOutcome::Done(())));

        assert_eq!(comment_count(&s.store, s.post.id).await, 1);
        let remaining = s
            .store
            .list_comments(s.post.id)
            .await
            .expect("lookup must succeed");
        assert!(remaining.iter().all(|comment| comment.id != first.id));
    }

    #[tokio::test]
    async fn non_author_cannot_touch_a_comment() {
        let s = setup().await;
        let comment = s
            .comments
            .add_comment(s.author.id, s.post.id, text("mine"))
            .await
            .expect("comment must be added");

        let outcome = s
            .comments
            .edit_comment(s.reader.id, s.post.id, comment.id, text("yours"))
            .await
            .expect("edit must not fail");
        assert!(matches!(outcome, OwnerOutcome::NotOwner));

        let outcome = s
            .comments
            .delete_comment(s.reader.id, s.post.id, comment.id)
            .await
            .expect("delete must not fail");
        assert!(matches!(outcome, OwnerOutcome::NotOwner));

        let stored = s
            .store
            .get_comment(s.post.id, comment.id)
            .await
            .expect("lookup must succeed")
            .expect("comment must still exist");
        assert_eq!(stored.text, "mine");
    }

    #[tokio::test]
    async fn author_edits_own_comment() {
        let s = setup().await;
        let comment = s
            .comments
            .add_comment(s.reader.id, s.post.id, text("draft"))
            .await
            .expect("comment must be added");

        let outcome = s
            .comments
            .edit_comment(s.reader.id, s.post.id, comment.id, text("  final  "))
            .await
            .expect("edit must succeed");
        match outcome {
            OwnerOutcome::Done(updated) => assert_eq!(updated.text, "final"),
            OwnerOutcome::NotOwner => panic!("reader must own the comment"),
        }
    }

    #[tokio::test]
    async fn comment_must_belong_to_the_addressed_post() {
        let s = setup().await;
        let comment = s
            .comments
            .add_comment(s.reader.id, s.post.id, text("here"))
            .await
            .expect("comment must be added");

        let repos = Repositories::memory(s.store.clone());
        let news = s
            .store
            .get_post(s.post.id)
            .await
            .expect("lookup must succeed")
            .and_then(|post| post.category)
            .expect("post must have a category");
        let other = BlogService::new(&repos, 10)
            .create_post(s.author.id, post_form("other", news.id, 5))
            .await
            .expect("create must succeed");

        let err = s
            .comments
            .delete_comment(s.reader.id, other.id, comment.id)
            .await
            .expect_err("comment must be missing under another post");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn commenting_on_a_hidden_post_is_not_found() {
        let s = setup().await;
        let repos = Repositories::memory(s.store.clone());
        let news = category(&s.store, "later", true);
        let mut form = post_form("scheduled", news.id, 0);
        form.pub_date = Some(Utc::now() + Duration::days(3));
        let hidden = BlogService::new(&repos, 10)
            .create_post(s.author.id, form)
            .await
            .expect("create must succeed");

        let err = s
            .comments
            .add_comment(s.reader.id, hidden.id, text("early bird"))
            .await
            .expect_err("hidden post must not accept comments");
        assert!(matches!(err, DomainError::NotFound(_)));

        s.comments
            .add_comment(s.author.id, hidden.id, text("note to self"))
            .await
            .expect("author may comment on own hidden post");
    }

    #[tokio::test]
    async fn blank_comment_is_rejected() {
        let s = setup().await;
        let err = s
            .comments
            .add_comment(s.reader.id, s.post.id, text("   "))
            .await
            .expect_err("blank comment must be rejected");
        assert!(matches!(err, DomainError::Validation { field: "text", .. }));
    }
}
