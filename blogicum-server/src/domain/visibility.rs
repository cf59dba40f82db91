//! Post visibility rules.
//!
//! A post is publicly visible when it is published, its publication date is
//! not in the future and it belongs to a published category. Posts without a
//! category are never publicly visible. The only exception is the author
//! looking at their own posts.
//!
//! `PostFilter` is the declarative form of these rules. The in-memory
//! [`filtered_posts`] applies it to a collection; the Postgres repository
//! renders the same filter as a `WHERE` clause.

use chrono::{DateTime, Utc};

use super::post::Post;

/// Identity of whoever issued the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Viewer {
    Anonymous,
    Authenticated { user_id: i64 },
}

impl Viewer {
    pub(crate) fn user_id(&self) -> Option<i64> {
        match self {
            Viewer::Anonymous => None,
            Viewer::Authenticated { user_id } => Some(*user_id),
        }
    }

    pub(crate) fn is_user(&self, user_id: i64) -> bool {
        self.user_id() == Some(user_id)
    }
}

/// Which posts a listing starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PostScope {
    All,
    Author(i64),
    Category(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PostFilter {
    scope: PostScope,
    owner_bypass: bool,
    now: DateTime<Utc>,
}

impl PostFilter {
    /// Builds the filter for `viewer` looking at `scope`.
    ///
    /// The visibility rules are bypassed only when the scope is a single
    /// author's posts and the viewer is that author.
    pub(crate) fn new(scope: PostScope, viewer: Viewer, now: DateTime<Utc>) -> Self {
        let owner_bypass = match scope {
            PostScope::Author(author_id) => viewer.is_user(author_id),
            PostScope::All | PostScope::Category(_) => false,
        };
        Self {
            scope,
            owner_bypass,
            now,
        }
    }

    pub(crate) fn public(scope: PostScope, now: DateTime<Utc>) -> Self {
        Self::new(scope, Viewer::Anonymous, now)
    }

    pub(crate) fn scope(&self) -> PostScope {
        self.scope
    }

    pub(crate) fn owner_bypass(&self) -> bool {
        self.owner_bypass
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub(crate) fn in_scope(&self, post: &Post) -> bool {
        match self.scope {
            PostScope::All => true,
            PostScope::Author(author_id) => post.author.id == author_id,
            PostScope::Category(category_id) => post
                .category
                .as_ref()
                .is_some_and(|category| category.id == category_id),
        }
    }

    pub(crate) fn matches(&self, post: &Post) -> bool {
        self.in_scope(post) && (self.owner_bypass || is_publicly_visible(post, self.now))
    }
}

pub(crate) fn is_publicly_visible(post: &Post, now: DateTime<Utc>) -> bool {
    post.is_published
        && post.pub_date <= now
        && post
            .category
            .as_ref()
            .is_some_and(|category| category.is_published)
}

/// Whether `viewer` may open the detail page of `post`.
pub(crate) fn can_view(post: &Post, viewer: Viewer, now: DateTime<Utc>) -> bool {
    viewer.is_user(post.author.id) || is_publicly_visible(post, now)
}

/// Keeps the posts matching `filter`, newest publication date first.
pub(crate) fn filtered_posts<I>(posts: I, filter: &PostFilter) -> Vec<Post>
where
    I: IntoIterator<Item = Post>,
{
    let mut visible: Vec<Post> = posts
        .into_iter()
        .filter(|post| filter.matches(post))
        .collect();
    sort_newest_first(&mut visible);
    visible
}

fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then_with(|| b.id.cmp(&a.id)));
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{DateTime, Duration, Utc};

    use crate::domain::post::{AuthorRef, CategoryRef, Post};

    pub(crate) const PUBLISHED_CATEGORY: i64 = 1;
    pub(crate) const HIDDEN_CATEGORY: i64 = 2;

    pub(crate) fn category(id: i64) -> CategoryRef {
        CategoryRef {
            id,
            title: format!("category {id}"),
            slug: format!("category-{id}"),
            is_published: id != HIDDEN_CATEGORY,
        }
    }

    /// A publicly visible post by `author_id`, published `age_minutes` ago.
    pub(crate) fn visible_post(id: i64, author_id: i64, age_minutes: i64) -> Post {
        let now = Utc::now();
        Post {
            id,
            title: format!("post {id}"),
            text: "text".to_string(),
            pub_date: now - Duration::minutes(age_minutes),
            is_published: true,
            author: AuthorRef {
                id: author_id,
                username: format!("user{author_id}"),
            },
            category: Some(category(PUBLISHED_CATEGORY)),
            location: None,
            image: None,
            created_at: now - Duration::minutes(age_minutes),
            comment_count: 0,
        }
    }

    pub(crate) fn future(mut post: Post, now: DateTime<Utc>) -> Post {
        post.pub_date = now + Duration::days(1);
        post
    }
}
