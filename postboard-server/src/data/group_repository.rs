use crate::domain::error::DomainError;
use crate::domain::group::{Group, NewGroup};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};

#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn create(&self, group: NewGroup) -> Result<Group, DomainError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, DomainError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, DomainError>;
}

#[derive(Clone)]
pub struct PostgresGroupRepository {
    pool: PgPool,
}

impl PostgresGroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn create(&self, group: NewGroup) -> Result<Group, DomainError> {
        let created = sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO post_groups (title, slug, description)
            VALUES ($1, $2, $3)
            RETURNING id, title, slug, description
            "#,
        )
        .bind(&group.title)
        .bind(&group.slug)
        .bind(&group.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to create group {}: {}", group.slug, e);
            if e.as_database_error()
                .and_then(|db| db.constraint())
                .map(|c| c.contains("post_groups_slug"))
                == Some(true)
            {
                DomainError::Conflict(format!("group slug {}", group.slug))
            } else {
                DomainError::from(e)
            }
        })?;

        info!(group_id = created.id, slug = %created.slug, "group created");
        Ok(created)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, DomainError> {
        sqlx::query_as::<_, Group>(
            "SELECT id, title, slug, description FROM post_groups WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to find group by slug {}: {}", slug, e);
            DomainError::from(e)
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, DomainError> {
        sqlx::query_as::<_, Group>(
            "SELECT id, title, slug, description FROM post_groups WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to find group by id {}: {}", id, e);
            DomainError::from(e)
        })
    }
}
