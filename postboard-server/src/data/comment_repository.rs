use crate::domain::comment::{Comment, NewComment};
use crate::domain::error::DomainError;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: NewComment) -> Result<Comment, DomainError>;
    /// Comments of a post, oldest first.
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, DomainError>;
}

#[derive(Clone)]
pub struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create(&self, comment: NewComment) -> Result<Comment, DomainError> {
        let created = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (post_id, author_id, text)
            VALUES ($1, $2, $3)
            RETURNING id, post_id, author_id, text, created_at
            "#,
        )
        .bind(comment.post_id)
        .bind(comment.author_id)
        .bind(&comment.text)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to create comment on post {}: {}", comment.post_id, e);
            DomainError::from(e)
        })?;

        info!(comment_id = created.id, post_id = created.post_id, "comment created");
        Ok(created)
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, DomainError> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, author_id, text, created_at
            FROM comments
            WHERE post_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to list comments for post {}: {}", post_id, e);
            DomainError::from(e)
        })
    }
}
