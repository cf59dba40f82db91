use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::data::post_repository::{NewPost, PostPatch, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::pagination::{Page, PageWindow, RequestedPage};
use crate::domain::post::{AuthorRef, CategoryRef, LocationRef, Post};
use crate::domain::visibility::{PostFilter, PostScope};

macro_rules! post_select {
    () => {
        r#"
        SELECT
            p.id,
            p.title,
            p.text,
            p.pub_date,
            p.is_published,
            p.image,
            p.created_at,
            u.id AS author_id,
            u.username AS author_username,
            c.id AS category_id,
            c.title AS category_title,
            c.slug AS category_slug,
            c.is_published AS category_is_published,
            l.id AS location_id,
            l.name AS location_name,
            l.is_published AS location_is_published,
            (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id) AS comment_count
        FROM posts p
        JOIN users u ON u.id = p.author_id
        LEFT JOIN categories c ON c.id = p.category_id
        LEFT JOIN locations l ON l.id = p.location_id
        "#
    };
}

const GET_POST_SQL: &str = concat!(post_select!(), " WHERE p.id = $1");

const COUNT_POSTS_SQL: &str = r#"
    SELECT COUNT(*)
    FROM posts p
    LEFT JOIN categories c ON c.id = p.category_id
"#;

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct PostRow {
    id: i64,
    title: String,
    text: String,
    pub_date: DateTime<Utc>,
    is_published: bool,
    image: Option<String>,
    created_at: DateTime<Utc>,
    author_id: i64,
    author_username: String,
    category_id: Option<i64>,
    category_title: Option<String>,
    category_slug: Option<String>,
    category_is_published: Option<bool>,
    location_id: Option<i64>,
    location_name: Option<String>,
    location_is_published: Option<bool>,
    comment_count: i64,
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO posts (title, text, pub_date, author_id, category_id, location_id, image)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(input.title)
        .bind(input.text)
        .bind(input.pub_date)
        .bind(input.author_id)
        .bind(input.category_id)
        .bind(input.location_id)
        .bind(input.image)
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        self.get_post(id)
            .await?
            .ok_or_else(|| DomainError::Unexpected(format!("created post {id} vanished")))
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(GET_POST_SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(Post::try_from).transpose()
    }

    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        let updated: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE posts
            SET title = $3,
                text = $4,
                pub_date = $5,
                category_id = $6,
                location_id = $7,
                image = $8
            WHERE id = $1 AND author_id = $2
            RETURNING id
            "#,
        )
        .bind(post_id)
        .bind(owner_id)
        .bind(patch.title)
        .bind(patch.text)
        .bind(patch.pub_date)
        .bind(patch.category_id)
        .bind(patch.location_id)
        .bind(patch.image)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        match updated {
            Some(id) => self.get_post(id).await,
            None => Ok(None),
        }
    }

    async fn delete_post_owned(&self, post_id: i64, owner_id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = $1 AND author_id = $2
            "#,
        )
        .bind(post_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_posts(
        &self,
        filter: &PostFilter,
        page: RequestedPage,
        page_size: u32,
    ) -> Result<Page<Post>, DomainError> {
        let mut count_query = QueryBuilder::<Postgres>::new(COUNT_POSTS_SQL);
        push_filter(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        let window = PageWindow::resolve(page, u64::try_from(total).unwrap_or(0), page_size);

        let mut query = QueryBuilder::<Postgres>::new(post_select!());
        push_filter(&mut query, filter);
        query
            .push(" ORDER BY p.pub_date DESC, p.id DESC LIMIT ")
            .push_bind(i64::try_from(window.limit()).unwrap_or(i64::MAX))
            .push(" OFFSET ")
            .push_bind(i64::try_from(window.offset()).unwrap_or(i64::MAX));

        let rows: Vec<PostRow> = query
            .build_query_as::<PostRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        let items = rows
            .into_iter()
            .map(Post::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page { items, window })
    }
}

/// Renders `filter` as a `WHERE` clause over `posts p LEFT JOIN categories c`.
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &PostFilter) {
    builder.push(" WHERE TRUE");
    match filter.scope() {
        PostScope::All => {}
        PostScope::Author(author_id) => {
            builder.push(" AND p.author_id = ").push_bind(author_id);
        }
        PostScope::Category(category_id) => {
            builder.push(" AND p.category_id = ").push_bind(category_id);
        }
    }
    if !filter.owner_bypass() {
        // a missing category fails `IS TRUE`
        builder
            .push(" AND p.is_published AND c.is_published IS TRUE AND p.pub_date <= ")
            .push_bind(filter.now());
    }
}

impl TryFrom<PostRow> for Post {
    type Error = DomainError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        let category = match (
            row.category_id,
            row.category_title,
            row.category_slug,
            row.category_is_published,
        ) {
            (Some(id), Some(title), Some(slug), Some(is_published)) => Some(CategoryRef {
                id,
                title,
                slug,
                is_published,
            }),
            (None, _, _, _) => None,
            _ => {
                return Err(DomainError::Unexpected(format!(
                    "incomplete category row for post {}",
                    row.id
                )));
            }
        };

        let location = match (row.location_id, row.location_name, row.location_is_published) {
            (Some(id), Some(name), Some(is_published)) => Some(LocationRef {
                id,
                name,
                is_published,
            }),
            (None, _, _) => None,
            _ => {
                return Err(DomainError::Unexpected(format!(
                    "incomplete location row for post {}",
                    row.id
                )));
            }
        };

        Ok(Post {
            id: row.id,
            title: row.title,
            text: row.text,
            pub_date: row.pub_date,
            is_published: row.is_published,
            author: AuthorRef {
                id: row.author_id,
                username: row.author_username,
            },
            category,
            location,
            image: row.image,
            created_at: row.created_at,
            comment_count: row.comment_count,
        })
    }
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        return match db_err.constraint() {
            Some("posts_category_id_fkey") => DomainError::Validation {
                field: "category",
                message: "select a valid choice",
            },
            Some("posts_location_id_fkey") => DomainError::Validation {
                field: "location",
                message: "select a valid choice",
            },
            _ => DomainError::NotFound("author".to_string()),
        };
    }
    DomainError::Unexpected(err.to_string())
}
