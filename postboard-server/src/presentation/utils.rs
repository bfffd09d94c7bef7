use std::time::Duration;

use actix_web::dev::Payload;
use actix_web::error::InternalError;
use actix_web::http::header::LOCATION;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest, HttpResponse, web};
use bytes::Bytes;
use futures_util::future::{Ready, ready};
use serde::Serialize;
use uuid::Uuid;

use crate::application::auth_service::AuthService;
use crate::application::pagination::Paginator;
use crate::domain::error::DomainError;
use crate::infrastructure::config::{AppConfig, DEFAULT_LOGIN_URL};

/// Per-deployment knobs the views need.
#[derive(Debug, Clone)]
pub struct ViewSettings {
    pub paginator: Paginator,
    pub index_cache_ttl: Duration,
    pub login_url: String,
}

impl From<&AppConfig> for ViewSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            paginator: Paginator::new(config.page_size),
            index_cache_ttl: config.index_cache_ttl(),
            login_url: config.login_url.clone(),
        }
    }
}

/// The session's user, attached by the session middleware.
///
/// Extracting it on a request without a session answers with a redirect to
/// the login page that carries the original URL in `next`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub username: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(login_redirect(req))),
        }
    }
}

pub fn login_redirect(req: &HttpRequest) -> Error {
    let login_url = req
        .app_data::<web::Data<ViewSettings>>()
        .map(|settings| settings.login_url.clone())
        .unwrap_or_else(|| DEFAULT_LOGIN_URL.to_string());
    let next = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let location = format!("{}?next={}", login_url, urlencoding::encode(next));

    InternalError::from_response("login required", redirect(&location)).into()
}

pub async fn extract_user_from_token(
    token: &str,
    auth_service: &AuthService,
) -> Result<AuthenticatedUser, DomainError> {
    let claims = auth_service
        .keys()
        .verify_token(token)
        .map_err(|_| DomainError::Unauthorized)?;
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| DomainError::Unauthorized)?;

    let user = auth_service
        .get_user(user_id)
        .await
        .map_err(|_| DomainError::Unauthorized)?;

    Ok(AuthenticatedUser {
        id: user.id,
        username: user.username,
    })
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((LOCATION, location))
        .finish()
}

pub fn profile_url(username: &str) -> String {
    format!("/profile/{}/", urlencoding::encode(username))
}

pub fn post_url(post_id: i64) -> String {
    format!("/posts/{post_id}/")
}

pub fn render_json<T: Serialize>(value: &T) -> Result<Bytes, DomainError> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(|e| DomainError::Internal(format!("render error: {e}")))
}

pub fn request_id(req: &HttpRequest) -> String {
    req.extensions()
        .get::<crate::presentation::middleware::RequestId>()
        .map(|rid| rid.0.clone())
        .unwrap_or_else(|| "unknown".into())
}
