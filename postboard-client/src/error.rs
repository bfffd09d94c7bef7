use std::collections::BTreeMap;

use reqwest::StatusCode;
use reqwest::header::LOCATION;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Token storage error: {0}")]
    TokenStorage(#[from] std::io::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Login required (redirected to {0})")]
    LoginRequired(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid submission: {0:?}")]
    Validation(BTreeMap<String, Vec<String>>),
    #[error("Unexpected response {status}: {message}")]
    Unexpected { status: u16, message: String },
}

impl ClientError {
    pub async fn from_http_response(resp: reqwest::Response) -> Self {
        let status = resp.status();

        if status.is_redirection() {
            let location = resp
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            if location.contains("next=") {
                return ClientError::LoginRequired(location);
            }
            return ClientError::Unexpected {
                status: status.as_u16(),
                message: format!("redirect to {location}"),
            };
        }

        let body: Value = resp.json().await.unwrap_or(Value::Null);
        Self::from_status_and_body(status, &body)
    }

    fn from_status_and_body(status: StatusCode, body: &Value) -> Self {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown"))
            .to_string();

        match status {
            StatusCode::BAD_REQUEST => ClientError::Validation(field_errors(body)),
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            StatusCode::CONFLICT => ClientError::Conflict(message),
            _ => ClientError::Unexpected {
                status: status.as_u16(),
                message,
            },
        }
    }
}

/// Field errors from either a re-rendered form (`errors`) or an error body
/// (`details.fields`).
fn field_errors(body: &Value) -> BTreeMap<String, Vec<String>> {
    let fields = body
        .get("errors")
        .or_else(|| body.get("details").and_then(|d| d.get("fields")));

    fields
        .and_then(|f| serde_json::from_value(f.clone()).ok())
        .unwrap_or_default()
}
