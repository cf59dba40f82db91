pub(crate) mod auth_service;
pub(crate) mod blog_service;
pub(crate) mod comment_service;
pub(crate) mod profile_service;

/// Result of an operation that only the resource's author may perform.
#[derive(Debug)]
pub(crate) enum OwnerOutcome<T> {
    Done(T),
    NotOwner,
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{Duration, Utc};

    use crate::data::repositories::memory::{CategoryFixture, MemoryStore};
    use crate::data::user_repository::{NewUser, UserRepository};
    use crate::domain::category::Category;
    use crate::domain::post::PostRequest;
    use crate::domain::user::User;

    pub(crate) async fn user(store: &MemoryStore, username: &str) -> User {
        store
            .create_user(NewUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                first_name: String::new(),
                last_name: String::new(),
                password_hash: "not-a-real-hash".to_string(),
            })
            .await
            .expect("user must be created")
    }

    pub(crate) fn category(store: &MemoryStore, slug: &str, is_published: bool) -> Category {
        store
            .add_category(CategoryFixture {
                title: slug.to_string(),
                description: String::new(),
                slug: slug.to_string(),
                is_published,
            })
            .expect("category must be created")
    }

    /// A form that yields a publicly visible post in `category_id`.
    pub(crate) fn post_form(title: &str, category_id: i64, age_minutes: i64) -> PostRequest {
        PostRequest {
            title: title.to_string(),
            text: format!("{title} text"),
            pub_date: Some(Utc::now() - Duration::minutes(age_minutes)),
            category_id: Some(category_id),
            location_id: None,
            image: None,
        }
    }
}
