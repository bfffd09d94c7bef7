use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Directed link: `user_id` sees posts authored by `author_id` in their feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::FromRow)]
pub struct Follow {
    pub user_id: Uuid,
    pub author_id: Uuid,
}
