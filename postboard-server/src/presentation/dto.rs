use crate::application::forms::{COMMENT_FORM_FIELDS, FormField, POST_FORM_FIELDS};
use crate::application::pagination::Page;
use crate::domain::comment::Comment;
use crate::domain::error::FieldErrors;
use crate::domain::group::Group;
use crate::domain::post::Post;
use crate::domain::user::User;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ======================= AUTH =======================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email address.
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub expires_in: i64,
    #[serde(rename = "token_type")]
    pub token_type: String, // "Bearer"
}

#[derive(Debug, Serialize)]
pub struct LoginPageResponse {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

// ======================= FEEDS =======================

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub page: Page<Post>,
}

#[derive(Debug, Serialize)]
pub struct GroupResponse {
    pub group: Group,
    pub page: Page<Post>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub author: UserSummary,
    pub posts_count: usize,
    pub following: bool,
    pub page: Page<Post>,
}

#[derive(Debug, Serialize)]
pub struct FollowFeedResponse {
    pub page: Page<Post>,
}

// ======================= POSTS =======================

#[derive(Debug, Serialize)]
pub struct PostDetailResponse {
    pub post: Post,
    pub author: UserSummary,
    pub author_posts_count: i64,
    pub group: Option<Group>,
    pub comments: Vec<Comment>,
    pub comment_form: &'static [FormField],
}

#[derive(Debug, Default, Serialize)]
pub struct FormValues {
    pub text: String,
    pub group: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// The create/edit form, with submitted values and errors when re-rendered.
#[derive(Debug, Serialize)]
pub struct PostFormResponse {
    pub is_edit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<i64>,
    pub fields: &'static [FormField],
    pub values: FormValues,
    #[serde(skip_serializing_if = "FieldErrors::is_empty")]
    pub errors: FieldErrors,
}

impl PostFormResponse {
    pub fn new(post_id: Option<i64>, values: FormValues, errors: FieldErrors) -> Self {
        Self {
            is_edit: post_id.is_some(),
            post_id,
            fields: &POST_FORM_FIELDS,
            values,
            errors,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentFormResponse {
    pub post_id: i64,
    pub fields: &'static [FormField],
    pub errors: FieldErrors,
}

impl CommentFormResponse {
    pub fn new(post_id: i64, errors: FieldErrors) -> Self {
        Self {
            post_id,
            fields: &COMMENT_FORM_FIELDS,
            errors,
        }
    }
}
