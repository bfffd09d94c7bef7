use crate::domain::error::DomainError;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Authors followed by `user_id`.
    async fn list_follows(&self, user_id: Uuid) -> Result<Vec<Uuid>, DomainError>;
    /// Returns `false` when the pair already existed.
    async fn create_follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError>;
    /// Returns `false` when there was nothing to delete.
    async fn delete_follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError>;
    async fn exists(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError>;
}

#[derive(Clone)]
pub struct PostgresFollowRepository {
    pool: PgPool,
}

impl PostgresFollowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FollowRepository for PostgresFollowRepository {
    async fn list_follows(&self, user_id: Uuid) -> Result<Vec<Uuid>, DomainError> {
        sqlx::query_scalar("SELECT author_id FROM follows WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to list follows of {}: {}", user_id, e);
                DomainError::from(e)
            })
    }

    async fn create_follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO follows (user_id, author_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, author_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(author_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to follow {} -> {}: {}", user_id, author_id, e);
            DomainError::from(e)
        })?;

        let created = inserted.rows_affected() > 0;
        if created {
            info!(user_id = %user_id, author_id = %author_id, "follow created");
        }
        Ok(created)
    }

    async fn delete_follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError> {
        let deleted = sqlx::query("DELETE FROM follows WHERE user_id = $1 AND author_id = $2")
            .bind(user_id)
            .bind(author_id)
            .execute(&self.pool)
            .await
            .map_err(DomainError::from)?;

        let removed = deleted.rows_affected() > 0;
        if removed {
            info!(user_id = %user_id, author_id = %author_id, "follow deleted");
        }
        Ok(removed)
    }

    async fn exists(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE user_id = $1 AND author_id = $2)",
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(DomainError::from)
    }
}
