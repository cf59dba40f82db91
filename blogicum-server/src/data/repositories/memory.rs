//! Process-local storage backend.
//!
//! Applies the domain visibility filter and paginator directly to its
//! collections. Categories and locations have no write API over HTTP, so
//! they are seeded from a JSON fixture file.

use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::data::category_repository::CategoryRepository;
use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::post_repository::{NewPost, PostPatch, PostRepository};
use crate::data::user_repository::{NewUser, ProfilePatch, UserCredentials, UserRepository};
use crate::domain::category::Category;
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::pagination::{Page, RequestedPage, paginate};
use crate::domain::post::{AuthorRef, CategoryRef, LocationRef, Post};
use crate::domain::user::User;
use crate::domain::visibility::{PostFilter, filtered_posts};

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CategoryFixture {
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: String,
    pub(crate) slug: String,
    #[serde(default = "published")]
    pub(crate) is_published: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LocationFixture {
    pub(crate) name: String,
    #[serde(default = "published")]
    pub(crate) is_published: bool,
}

#[derive(Debug, Default, Deserialize)]
struct Fixtures {
    #[serde(default)]
    categories: Vec<CategoryFixture>,
    #[serde(default)]
    locations: Vec<LocationFixture>,
}

fn published() -> bool {
    true
}

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
}

#[derive(Debug, Clone)]
struct StoredLocation {
    id: i64,
    name: String,
    is_published: bool,
}

#[derive(Debug, Clone)]
struct StoredPost {
    id: i64,
    title: String,
    text: String,
    pub_date: DateTime<Utc>,
    is_published: bool,
    author_id: i64,
    category_id: Option<i64>,
    location_id: Option<i64>,
    image: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct StoredComment {
    id: i64,
    post_id: i64,
    author_id: i64,
    text: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    users: Vec<StoredUser>,
    categories: Vec<Category>,
    locations: Vec<StoredLocation>,
    posts: Vec<StoredPost>,
    comments: Vec<StoredComment>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn author_ref(&self, user_id: i64) -> Result<AuthorRef, DomainError> {
        self.users
            .iter()
            .find(|stored| stored.user.id == user_id)
            .map(|stored| AuthorRef {
                id: stored.user.id,
                username: stored.user.username.clone(),
            })
            .ok_or_else(|| DomainError::Unexpected(format!("dangling author id {user_id}")))
    }

    fn check_references(
        &self,
        category_id: Option<i64>,
        location_id: Option<i64>,
    ) -> Result<(), DomainError> {
        if let Some(id) = category_id
            && !self.categories.iter().any(|category| category.id == id)
        {
            return Err(DomainError::Validation {
                field: "category",
                message: "select a valid choice",
            });
        }
        if let Some(id) = location_id
            && !self.locations.iter().any(|location| location.id == id)
        {
            return Err(DomainError::Validation {
                field: "location",
                message: "select a valid choice",
            });
        }
        Ok(())
    }

    fn materialize_post(&self, stored: &StoredPost) -> Result<Post, DomainError> {
        let category = stored
            .category_id
            .and_then(|id| self.categories.iter().find(|category| category.id == id))
            .map(|category| CategoryRef {
                id: category.id,
                title: category.title.clone(),
                slug: category.slug.clone(),
                is_published: category.is_published,
            });
        let location = stored
            .location_id
            .and_then(|id| self.locations.iter().find(|location| location.id == id))
            .map(|location| LocationRef {
                id: location.id,
                name: location.name.clone(),
                is_published: location.is_published,
            });
        let comment_count = self
            .comments
            .iter()
            .filter(|comment| comment.post_id == stored.id)
            .count();

        Ok(Post {
            id: stored.id,
            title: stored.title.clone(),
            text: stored.text.clone(),
            pub_date: stored.pub_date,
            is_published: stored.is_published,
            author: self.author_ref(stored.author_id)?,
            category,
            location,
            image: stored.image.clone(),
            created_at: stored.created_at,
            comment_count: i64::try_from(comment_count).unwrap_or(i64::MAX),
        })
    }

    fn find_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        self.posts
            .iter()
            .find(|post| post.id == id)
            .map(|post| self.materialize_post(post))
            .transpose()
    }

    fn materialize_comment(&self, stored: &StoredComment) -> Result<Comment, DomainError> {
        Ok(Comment {
            id: stored.id,
            post_id: stored.post_id,
            author: self.author_ref(stored.author_id)?,
            text: stored.text.clone(),
            created_at: stored.created_at,
        })
    }

    fn username_taken(&self, username: &str, except_id: Option<i64>) -> bool {
        self.users
            .iter()
            .any(|stored| stored.user.username == username && Some(stored.user.id) != except_id)
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    pub(crate) fn from_fixture_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read fixtures from {}", path.display()))?;
        let fixtures: Fixtures = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse fixtures in {}", path.display()))?;

        let store = Self::default();
        for category in fixtures.categories {
            store.add_category(category)?;
        }
        for location in fixtures.locations {
            store.add_location(location)?;
        }
        Ok(store)
    }

    pub(crate) fn add_category(&self, fixture: CategoryFixture) -> Result<Category, DomainError> {
        let mut state = self.write()?;
        if state
            .categories
            .iter()
            .any(|category| category.slug == fixture.slug)
        {
            return Err(DomainError::AlreadyExists(format!(
                "category slug: {}",
                fixture.slug
            )));
        }
        let category = Category {
            id: state.next_id(),
            title: fixture.title,
            description: fixture.description,
            slug: fixture.slug,
            is_published: fixture.is_published,
            created_at: Utc::now(),
        };
        state.categories.push(category.clone());
        Ok(category)
    }

    pub(crate) fn add_location(&self, fixture: LocationFixture) -> Result<i64, DomainError> {
        let mut state = self.write()?;
        let id = state.next_id();
        state.locations.push(StoredLocation {
            id,
            name: fixture.name,
            is_published: fixture.is_published,
        });
        Ok(id)
    }

    #[cfg(test)]
    pub(crate) fn set_post_published(&self, post_id: i64, is_published: bool) {
        let mut state = self.write().expect("memory store lock poisoned");
        let post = state
            .posts
            .iter_mut()
            .find(|post| post.id == post_id)
            .expect("post must exist");
        post.is_published = is_published;
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, DomainError> {
        self.state
            .read()
            .map_err(|_| DomainError::Unexpected("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, DomainError> {
        self.state
            .write()
            .map_err(|_| DomainError::Unexpected("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let mut state = self.write()?;
        if state.username_taken(&input.username, None) {
            return Err(DomainError::username_taken());
        }
        let user = User {
            id: state.next_id(),
            username: input.username,
            email: input.email,
            first_name: input.first_name,
            last_name: input.last_name,
            created_at: Utc::now(),
        };
        state.users.push(StoredUser {
            user: user.clone(),
            password_hash: input.password_hash,
        });
        Ok(user)
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, DomainError> {
        let state = self.read()?;
        Ok(state
            .users
            .iter()
            .find(|stored| stored.user.username == username)
            .map(|stored| UserCredentials {
                user: stored.user.clone(),
                password_hash: stored.password_hash.clone(),
            }))
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, DomainError> {
        let state = self.read()?;
        Ok(state
            .users
            .iter()
            .find(|stored| stored.user.id == id)
            .map(|stored| stored.user.clone()))
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let state = self.read()?;
        Ok(state
            .users
            .iter()
            .find(|stored| stored.user.username == username)
            .map(|stored| stored.user.clone()))
    }

    async fn update_profile(
        &self,
        id: i64,
        patch: ProfilePatch,
    ) -> Result<Option<User>, DomainError> {
        let mut state = self.write()?;
        if state.username_taken(&patch.username, Some(id)) {
            return Err(DomainError::username_taken());
        }
        let Some(stored) = state.users.iter_mut().find(|stored| stored.user.id == id) else {
            return Ok(None);
        };
        stored.user.username = patch.username;
        stored.user.email = patch.email;
        stored.user.first_name = patch.first_name;
        stored.user.last_name = patch.last_name;
        Ok(Some(stored.user.clone()))
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError> {
        let state = self.read()?;
        Ok(state
            .categories
            .iter()
            .find(|category| category.slug == slug)
            .cloned())
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let mut state = self.write()?;
        state.author_ref(input.author_id)?;
        state.check_references(input.category_id, input.location_id)?;

        let stored = StoredPost {
            id: state.next_id(),
            title: input.title,
            text: input.text,
            pub_date: input.pub_date,
            is_published: true,
            author_id: input.author_id,
            category_id: input.category_id,
            location_id: input.location_id,
            image: input.image,
            created_at: Utc::now(),
        };
        let post = state.materialize_post(&stored)?;
        state.posts.push(stored);
        Ok(post)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        self.read()?.find_post(id)
    }

    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        let mut state = self.write()?;
        state.check_references(patch.category_id, patch.location_id)?;
        let Some(stored) = state
            .posts
            .iter_mut()
            .find(|post| post.id == post_id && post.author_id == owner_id)
        else {
            return Ok(None);
        };
        stored.title = patch.title;
        stored.text = patch.text;
        stored.pub_date = patch.pub_date;
        stored.category_id = patch.category_id;
        stored.location_id = patch.location_id;
        stored.image = patch.image;
        state.find_post(post_id)
    }

    async fn delete_post_owned(&self, post_id: i64, owner_id: i64) -> Result<bool, DomainError> {
        let mut state = self.write()?;
        let before = state.posts.len();
        state
            .posts
            .retain(|post| !(post.id == post_id && post.author_id == owner_id));
        let deleted = state.posts.len() < before;
        if deleted {
            state.comments.retain(|comment| comment.post_id != post_id);
        }
        Ok(deleted)
    }

    async fn list_posts(
        &self,
        filter: &PostFilter,
        page: RequestedPage,
        page_size: u32,
    ) -> Result<Page<Post>, DomainError> {
        let state = self.read()?;
        let posts = state
            .posts
            .iter()
            .map(|stored| state.materialize_post(stored))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(paginate(filtered_posts(posts, filter), page, page_size))
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        let mut state = self.write()?;
        if !state.posts.iter().any(|post| post.id == input.post_id) {
            return Err(DomainError::NotFound("post".to_string()));
        }
        state.author_ref(input.author_id)?;
        let stored = StoredComment {
            id: state.next_id(),
            post_id: input.post_id,
            author_id: input.author_id,
            text: input.text,
            created_at: Utc::now(),
        };
        let comment = state.materialize_comment(&stored)?;
        state.comments.push(stored);
        Ok(comment)
    }

    async fn get_comment(
        &self,
        post_id: i64,
        comment_id: i64,
    ) -> Result<Option<Comment>, DomainError> {
        let state = self.read()?;
        state
            .comments
            .iter()
            .find(|comment| comment.id == comment_id && comment.post_id == post_id)
            .map(|comment| state.materialize_comment(comment))
            .transpose()
    }

    async fn update_comment_owned(
        &self,
        comment_id: i64,
        owner_id: i64,
        text: String,
    ) -> Result<Option<Comment>, DomainError> {
        let mut state = self.write()?;
        let Some(stored) = state
            .comments
            .iter_mut()
            .find(|comment| comment.id == comment_id && comment.author_id == owner_id)
        else {
            return Ok(None);
        };
        stored.text = text;
        let stored = stored.clone();
        state.materialize_comment(&stored).map(Some)
    }

    async fn delete_comment_owned(
        &self,
        comment_id: i64,
        owner_id: i64,
    ) -> Result<bool, DomainError> {
        let mut state = self.write()?;
        let before = state.comments.len();
        state
            .comments
            .retain(|comment| !(comment.id == comment_id && comment.author_id == owner_id));
        Ok(state.comments.len() < before)
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, DomainError> {
        let state = self.read()?;
        let mut comments: Vec<&StoredComment> = state
            .comments
            .iter()
            .filter(|comment| comment.post_id == post_id)
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        comments
            .into_iter()
            .map(|comment| state.materialize_comment(comment))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::MemoryStore;
    use crate::data::category_repository::CategoryRepository;

    #[tokio::test]
    async fn fixtures_seed_categories_and_locations() {
        let path = std::env::temp_dir().join(format!(
            "blogicum-fixtures-{}.json",
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).expect("temp file must be created");
        file.write_all(
            br#"{
                "categories": [
                    {"title": "Travel", "slug": "travel"},
                    {"title": "Drafts", "slug": "drafts", "is_published": false}
                ],
                "locations": [{"name": "Island"}]
            }"#,
        )
        .expect("fixtures must be written");

        let store = MemoryStore::from_fixture_file(&path).expect("fixtures must load");
        std::fs::remove_file(&path).ok();

        let travel = store
            .find_by_slug("travel")
            .await
            .expect("lookup must succeed")
            .expect("travel must exist");
        assert!(travel.is_published);
        let drafts = store
            .find_by_slug("drafts")
            .await
            .expect("lookup must succeed")
            .expect("drafts must exist");
        assert!(!drafts.is_published);
    }

    #[test]
    fn duplicate_category_slug_is_rejected() {
        let store = MemoryStore::default();
        let fixture = super::CategoryFixture {
            title: "Travel".to_string(),
            description: String::new(),
            slug: "travel".to_string(),
            is_published: true,
        };
        store
            .add_category(fixture.clone())
            .expect("first insert must succeed");
        assert!(store.add_category(fixture).is_err());
    }
}
