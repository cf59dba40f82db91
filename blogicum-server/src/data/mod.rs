use std::sync::Arc;

use sqlx::PgPool;

use self::category_repository::CategoryRepository;
use self::comment_repository::CommentRepository;
use self::post_repository::PostRepository;
use self::repositories::memory::MemoryStore;
use self::repositories::postgres::category_repository::PostgresCategoryRepository;
use self::repositories::postgres::comment_repository::PostgresCommentRepository;
use self::repositories::postgres::post_repository::PostgresPostRepository;
use self::repositories::postgres::user_repository::PostgresUserRepository;
use self::user_repository::UserRepository;

pub(crate) mod category_repository;
pub(crate) mod comment_repository;
pub(crate) mod post_repository;
pub(crate) mod repositories;
pub(crate) mod user_repository;

/// Storage handles shared by the application services.
#[derive(Clone)]
pub(crate) struct Repositories {
    pub(crate) users: Arc<dyn UserRepository>,
    pub(crate) categories: Arc<dyn CategoryRepository>,
    pub(crate) posts: Arc<dyn PostRepository>,
    pub(crate) comments: Arc<dyn CommentRepository>,
}

impl Repositories {
    pub(crate) fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(pool.clone())),
            posts: Arc::new(PostgresPostRepository::new(pool.clone())),
            comments: Arc::new(PostgresCommentRepository::new(pool)),
        }
    }

    pub(crate) fn memory(store: MemoryStore) -> Self {
        Self {
            users: Arc::new(store.clone()),
            categories: Arc::new(store.clone()),
            posts: Arc::new(store.clone()),
            comments: Arc::new(store),
        }
    }
}
