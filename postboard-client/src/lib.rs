//! HTTP client for a postboard server.

mod error;
mod http_client;
mod models;

pub use error::ClientError;
pub use http_client::{DEFAULT_TOKEN_FILE, PostboardClient};
pub use models::{
    Comment, FeedKind, Group, ImageUpload, Page, Post, PostDetail, Profile, UserSummary,
};
