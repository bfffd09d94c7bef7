use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of characters a post shows when printed.
const DISPLAY_CHARS: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub author_id: Uuid,
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short: String = self.text.chars().take(DISPLAY_CHARS).collect();
        f.write_str(&short)
    }
}

/// Fields of a post that is about to be inserted; the store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: Uuid,
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

/// Replacement values for an author's edit. `image: None` keeps the stored image.
#[derive(Debug, Clone)]
pub struct PostChanges {
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

/// Selects which posts the store returns. Results are always newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(i64),
    Author(Uuid),
    Authors(Vec<Uuid>),
}
