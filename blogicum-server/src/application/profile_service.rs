use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::data::Repositories;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::{ProfilePatch, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::pagination::{Page, RequestedPage};
use crate::domain::post::Post;
use crate::domain::user::{ProfileRequest, User};
use crate::domain::visibility::{PostFilter, PostScope, Viewer};

#[derive(Debug, Clone)]
pub(crate) struct ProfilePage {
    pub(crate) profile: User,
    pub(crate) posts: Page<Post>,
}

pub(crate) struct ProfileService {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    page_size: u32,
}

impl ProfileService {
    pub(crate) fn new(repos: &Repositories, page_size: u32) -> Self {
        Self {
            users: repos.users.clone(),
            posts: repos.posts.clone(),
            page_size,
        }
    }

    /// A user's page. The owner sees every post they wrote; everybody else
    /// only the publicly visible ones.
    pub(crate) async fn profile(
        &self,
        viewer: Viewer,
        username: &str,
        page: RequestedPage,
    ) -> Result<ProfilePage, DomainError> {
        let profile = self
            .users
            .get_by_username(username)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user: {username}")))?;

        let filter = PostFilter::new(PostScope::Author(profile.id), viewer, Utc::now());
        let posts = self
            .posts
            .list_posts(&filter, page, self.page_size)
            .await?;
        Ok(ProfilePage { profile, posts })
    }

    pub(crate) async fn current_profile(&self, user_id: i64) -> Result<User, DomainError> {
        self.users
            .get_user(user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {user_id}")))
    }

    pub(crate) async fn edit_profile(
        &self,
        user_id: i64,
        req: ProfileRequest,
    ) -> Result<User, DomainError> {
        let req = req.validate()?;
        let patch = ProfilePatch {
            username: req.username,
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
        };
        let user = self
            .users
            .update_profile(user_id, patch)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {user_id}")))?;
        info!(user_id, "profile updated");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::ProfileService;
    use crate::application::blog_service::BlogService;
    use crate::application::test_support::{category, post_form, user};
    use crate::data::Repositories;
    use crate::data::repositories::memory::MemoryStore;
    use crate::domain::error::DomainError;
    use crate::domain::pagination::RequestedPage;
    use crate::domain::user::ProfileRequest;
    use crate::domain::visibility::Viewer;

    #[tokio::test]
    async fn owner_sees_all_own_posts_and_others_see_public_subset() {
        let store = MemoryStore::default();
        let repos = Repositories::memory(store.clone());
        let blog = BlogService::new(&repos, 10);
        let profiles = ProfileService::new(&repos, 10);
        let author = user(&store, "author").await;
        let reader = user(&store, "reader").await;
        let news = category(&store, "news", true);
        let hidden = category(&store, "hidden", false);

        let public = blog
            .create_post(author.id, post_form("public", news.id, 30))
            .await
            .expect("create must succeed");
        let mut scheduled = post_form("scheduled", news.id, 0);
        scheduled.pub_date = Some(Utc::now() + Duration::days(1));
        let scheduled = blog
            .create_post(author.id, scheduled)
            .await
            .expect("create must succeed");
        let in_hidden = blog
            .create_post(author.id, post_form("in hidden", hidden.id, 10))
            .await
            .expect("create must succeed");
        let unpublished = blog
            .create_post(author.id, post_form("unpublished", news.id, 20))
            .await
            .expect("create must succeed");
        store.set_post_published(unpublished.id, false);
        blog.create_post(reader.id, post_form("not the author's", news.id, 1))
            .await
            .expect("create must succeed");

        let own = profiles
            .profile(
                Viewer::Authenticated { user_id: author.id },
                "author",
                RequestedPage::First,
            )
            .await
            .expect("profile must load");
        let ids: Vec<i64> = own.posts.items.iter().map(|post| post.id).collect();
        assert_eq!(ids, vec![scheduled.id, in_hidden.id, unpublished.id, public.id]);

        for viewer in [Viewer::Anonymous, Viewer::Authenticated { user_id: reader.id }] {
            let page = profiles
                .profile(viewer, "author", RequestedPage::First)
                .await
                .expect("profile must load");
            let ids: Vec<i64> = page.posts.items.iter().map(|post| post.id).collect();
            assert_eq!(ids, vec![public.id]);
            assert_eq!(page.profile.username, "author");
        }
    }

    #[tokio::test]
    async fn unknown_profile_is_not_found() {
        let store = MemoryStore::default();
        let profiles = ProfileService::new(&Repositories::memory(store), 10);

        let err = profiles
            .profile(Viewer::Anonymous, "ghost", RequestedPage::First)
            .await
            .expect_err("profile must be missing");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn edit_profile_updates_fields_and_keeps_usernames_unique() {
        let store = MemoryStore::default();
        let profiles = ProfileService::new(&Repositories::memory(store.clone()), 10);
        let author = user(&store, "author").await;
        user(&store, "taken").await;

        let updated = profiles
            .edit_profile(
                author.id,
                ProfileRequest {
                    username: " renamed ".to_string(),
                    email: "New@Example.com".to_string(),
                    first_name: "Ada".to_string(),
                    last_name: "Lovelace".to_string(),
                },
            )
            .await
            .expect("edit must succeed");
        assert_eq!(updated.username, "renamed");
        assert_eq!(updated.email, "new@example.com");

        let err = profiles
            .edit_profile(
                author.id,
                ProfileRequest {
                    username: "taken".to_string(),
                    email: String::new(),
                    first_name: String::new(),
                    last_name: String::new(),
                },
            )
            .await
            .expect_err("duplicate username must be rejected");
        assert!(matches!(
            err,
            DomainError::Validation {
                field: "username",
                ..
            }
        ));

        let current = profiles
            .current_profile(author.id)
            .await
            .expect("profile must load");
        assert_eq!(current.username, "renamed");
    }
}
