use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
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
        write!(
            f,
            "[{}] {} ({})",
            self.id,
            self.text,
            self.created_at.format("%Y-%m-%d %H:%M")
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub page_size: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostDetail {
    pub post: Post,
    pub author: UserSummary,
    pub author_posts_count: i64,
    pub group: Option<Group>,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub author: UserSummary,
    pub posts_count: usize,
    pub following: bool,
    pub page: Page<Post>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PageEnvelope {
    pub page: Page<Post>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AuthResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

/// Which listing to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedKind {
    Global,
    Group(String),
    Author(String),
    Following,
}

impl FeedKind {
    pub fn path(&self) -> String {
        match self {
            FeedKind::Global => "/".to_string(),
            FeedKind::Group(slug) => format!("/group/{}/", urlencoding::encode(slug)),
            FeedKind::Author(username) => profile_path(username),
            FeedKind::Following => "/follow/".to_string(),
        }
    }
}

pub(crate) fn profile_path(username: &str) -> String {
    format!("/profile/{}/", urlencoding::encode(username))
}

/// Image attached to a post submission.
#[derive(Debug, Clone, Serialize)]
pub struct ImageUpload {
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub data: String,
}

impl ImageUpload {
    pub fn from_bytes(filename: impl Into<String>, bytes: &[u8]) -> Self {
        let filename = filename.into();
        let content_type = match filename.rsplit('.').next().map(str::to_ascii_lowercase) {
            Some(ext) if ext == "gif" => Some("image/gif".to_string()),
            Some(ext) if ext == "png" => Some("image/png".to_string()),
            Some(ext) if ext == "jpg" || ext == "jpeg" => Some("image/jpeg".to_string()),
            Some(ext) if ext == "webp" => Some("image/webp".to_string()),
            _ => None,
        };
        Self {
            filename,
            content_type,
            data: STANDARD.encode(bytes),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct PostSubmission<'a> {
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageUpload>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_paths() {
        assert_eq!(FeedKind::Global.path(), "/");
        assert_eq!(FeedKind::Group("cats".into()).path(), "/group/cats/");
        assert_eq!(FeedKind::Author("leo".into()).path(), "/profile/leo/");
        assert_eq!(FeedKind::Following.path(), "/follow/");
    }

    #[test]
    fn path_segments_are_percent_encoded() {
        assert_eq!(
            FeedKind::Author("bob@home".into()).path(),
            "/profile/bob%40home/"
        );
        assert_eq!(FeedKind::Group("a b?#".into()).path(), "/group/a%20b%3F%23/");
        assert_eq!(profile_path("x/y"), "/profile/x%2Fy/");
    }

    #[test]
    fn upload_guesses_content_type_from_extension() {
        let upload = ImageUpload::from_bytes("Photo.JPG", b"abc");
        assert_eq!(upload.content_type.as_deref(), Some("image/jpeg"));
        assert_eq!(upload.data, "YWJj");

        assert!(ImageUpload::from_bytes("notes", b"abc").content_type.is_none());
    }
}
