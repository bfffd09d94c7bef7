pub mod comment_repository;
pub mod follow_repository;
pub mod group_repository;
pub mod memory;
pub mod post_repository;
pub mod user_repository;

use std::sync::Arc;

use sqlx::PgPool;

use comment_repository::{CommentRepository, PostgresCommentRepository};
use follow_repository::{FollowRepository, PostgresFollowRepository};
use group_repository::{GroupRepository, PostgresGroupRepository};
use memory::MemoryStore;
use post_repository::{PostRepository, PostgresPostRepository};
use user_repository::{PostgresUserRepository, UserRepository};

/// Every repository the services need, behind trait objects.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub follows: Arc<dyn FollowRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            groups: Arc::new(PostgresGroupRepository::new(pool.clone())),
            posts: Arc::new(PostgresPostRepository::new(pool.clone())),
            comments: Arc::new(PostgresCommentRepository::new(pool.clone())),
            follows: Arc::new(PostgresFollowRepository::new(pool)),
        }
    }

    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            groups: store.clone(),
            posts: store.clone(),
            comments: store.clone(),
            follows: store,
        }
    }
}
