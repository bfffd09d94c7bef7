use crate::domain::error::DomainError;
use crate::domain::post::{NewPost, Post, PostChanges, PostFilter};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: NewPost) -> Result<Post, DomainError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, DomainError>;
    /// Posts matching `filter`, newest first.
    async fn find_posts(&self, filter: &PostFilter) -> Result<Vec<Post>, DomainError>;
    /// Applies `changes` only when `author_id` owns the post; `None` otherwise.
    async fn update(
        &self,
        id: i64,
        author_id: Uuid,
        changes: PostChanges,
    ) -> Result<Option<Post>, DomainError>;
    async fn count_by_author(&self, author_id: Uuid) -> Result<i64, DomainError>;
}

#[derive(Clone)]
pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, post: NewPost) -> Result<Post, DomainError> {
        let created = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (author_id, text, group_id, image)
            VALUES ($1, $2, $3, $4)
            RETURNING id, author_id, text, group_id, image, created_at
            "#,
        )
        .bind(post.author_id)
        .bind(&post.text)
        .bind(post.group_id)
        .bind(&post.image)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to create post: {}", e);
            DomainError::from(e)
        })?;

        info!(post_id = created.id, author_id = %created.author_id, "post created");
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, DomainError> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, author_id, text, group_id, image, created_at
            FROM posts WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("db error find_by_id {}: {}", id, e);
            DomainError::from(e)
        })
    }

    async fn find_posts(&self, filter: &PostFilter) -> Result<Vec<Post>, DomainError> {
        let query = match filter {
            PostFilter::All => sqlx::query_as::<_, Post>(
                r#"
                SELECT id, author_id, text, group_id, image, created_at
                FROM posts
                ORDER BY id DESC
                "#,
            ),
            PostFilter::Group(group_id) => sqlx::query_as::<_, Post>(
                r#"
                SELECT id, author_id, text, group_id, image, created_at
                FROM posts
                WHERE group_id = $1
                ORDER BY id DESC
                "#,
            )
            .bind(*group_id),
            PostFilter::Author(author_id) => sqlx::query_as::<_, Post>(
                r#"
                SELECT id, author_id, text, group_id, image, created_at
                FROM posts
                WHERE author_id = $1
                ORDER BY id DESC
                "#,
            )
            .bind(*author_id),
            PostFilter::Authors(authors) => sqlx::query_as::<_, Post>(
                r#"
                SELECT id, author_id, text, group_id, image, created_at
                FROM posts
                WHERE author_id = ANY($1)
                ORDER BY id DESC
                "#,
            )
            .bind(authors.clone()),
        };

        query.fetch_all(&self.pool).await.map_err(|e| {
            error!(?filter, "db error while fetching posts: {}", e);
            DomainError::from(e)
        })
    }

    async fn update(
        &self,
        id: i64,
        author_id: Uuid,
        changes: PostChanges,
    ) -> Result<Option<Post>, DomainError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET
                text = $1,
                group_id = $2,
                image = COALESCE($3, image)
            WHERE id = $4 AND author_id = $5
            RETURNING id, author_id, text, group_id, image, created_at
            "#,
        )
        .bind(&changes.text)
        .bind(changes.group_id)
        .bind(&changes.image)
        .bind(id)
        .bind(author_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to update post {}: {}", id, e);
            DomainError::from(e)
        })?;

        if post.is_some() {
            info!(post_id = id, "post updated");
        }

        Ok(post)
    }

    async fn count_by_author(&self, author_id: Uuid) -> Result<i64, DomainError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await
            .map_err(DomainError::from)
    }
}
