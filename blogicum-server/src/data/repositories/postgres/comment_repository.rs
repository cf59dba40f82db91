use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::post::AuthorRef;

macro_rules! comment_select {
    () => {
        r#"
        SELECT
            cm.id,
            cm.post_id,
            cm.text,
            cm.created_at,
            u.id AS author_id,
            u.username AS author_username
        FROM comments cm
        JOIN users u ON u.id = cm.author_id
        "#
    };
}

#[derive(Debug, Clone)]
pub(crate) struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_comment(&self, id: i64) -> Result<Option<Comment>, DomainError> {
        let row = sqlx::query_as::<_, CommentRow>(concat!(comment_select!(), " WHERE cm.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_comment_db_error)?;

        Ok(row.map(Comment::from))
    }
}

#[derive(FromRow)]
struct CommentRow {
    id: i64,
    post_id: i64,
    text: String,
    created_at: DateTime<Utc>,
    author_id: i64,
    author_username: String,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            post_id: row.post_id,
            author: AuthorRef {
                id: row.author_id,
                username: row.author_username,
            },
            text: row.text,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO comments (post_id, author_id, text)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(input.post_id)
        .bind(input.author_id)
        .bind(input.text)
        .fetch_one(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        self.fetch_comment(id)
            .await?
            .ok_or_else(|| DomainError::Unexpected(format!("created comment {id} vanished")))
    }

    async fn get_comment(
        &self,
        post_id: i64,
        comment_id: i64,
    ) -> Result<Option<Comment>, DomainError> {
        let row = sqlx::query_as::<_, CommentRow>(concat!(
            comment_select!(),
            " WHERE cm.id = $1 AND cm.post_id = $2"
        ))
        .bind(comment_id)
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        Ok(row.map(Comment::from))
    }

    async fn update_comment_owned(
        &self,
        comment_id: i64,
        owner_id: i64,
        text: String,
    ) -> Result<Option<Comment>, DomainError> {
        let updated: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE comments
            SET text = $3
            WHERE id = $1 AND author_id = $2
            RETURNING id
            "#,
        )
        .bind(comment_id)
        .bind(owner_id)
        .bind(text)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        match updated {
            Some(id) => self.fetch_comment(id).await,
            None => Ok(None),
        }
    }

    async fn delete_comment_owned(
        &self,
        comment_id: i64,
        owner_id: i64,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM comments
            WHERE id = $1 AND author_id = $2
            "#,
        )
        .bind(comment_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, DomainError> {
        let rows = sqlx::query_as::<_, CommentRow>(concat!(
            comment_select!(),
            " WHERE cm.post_id = $1 ORDER BY cm.created_at ASC, cm.id ASC"
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }
}

fn map_comment_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        let resource = match db_err.constraint() {
            Some("comments_post_id_fkey") => "post",
            _ => "author",
        };
        return DomainError::NotFound(resource.to_string());
    }
    DomainError::Unexpected(err.to_string())
}
