use std::fs;
use std::path::PathBuf;

use reqwest::header::{AUTHORIZATION, HeaderValue, LOCATION};
use reqwest::{Client, RequestBuilder, Response, redirect};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::error::ClientError;
use crate::models::{
    AuthResponse, FeedKind, ImageUpload, Page, PageEnvelope, Post, PostDetail, PostSubmission,
    Profile, profile_path,
};

pub const DEFAULT_TOKEN_FILE: &str = ".postboard_token";

#[derive(Clone)]
pub struct PostboardClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    token_file: PathBuf,
}

impl PostboardClient {
    pub fn connect(endpoint: &str) -> Result<Self, ClientError> {
        let base_url = endpoint.trim_end_matches('/').to_string();
        // Submissions answer with 302s.
        let client = Client::builder().redirect(redirect::Policy::none()).build()?;
        Ok(Self {
            client,
            base_url,
            token: None,
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
        })
    }

    pub fn with_token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_file = path.into();
        self
    }

    pub fn set_token(&mut self, token: String) -> Result<(), ClientError> {
        fs::write(&self.token_file, &token)?;
        self.token = Some(token);
        Ok(())
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth_header(&self) -> Option<HeaderValue> {
        let token = match &self.token {
            Some(t) if !t.is_empty() => t.clone(),
            _ => fs::read_to_string(&self.token_file)
                .map(|t| t.trim().to_string())
                .unwrap_or_default(),
        };

        if token.is_empty() {
            return None;
        }

        HeaderValue::from_str(&format!("Bearer {token}")).ok()
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match self.auth_header() {
            Some(h) => req.header(AUTHORIZATION, h),
            None => req,
        }
    }

    async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
        if resp.status().is_success() {
            Ok(resp.json().await?)
        } else {
            Err(ClientError::from_http_response(resp).await)
        }
    }

    /// Returns the redirect target of a successful form submission.
    async fn expect_redirect(resp: Response) -> Result<String, ClientError> {
        let location = resp
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        match location {
            Some(location) if resp.status().is_redirection() && !location.contains("next=") => {
                debug!(%location, "redirected");
                Ok(location)
            }
            _ => Err(ClientError::from_http_response(resp).await),
        }
    }

    pub async fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ClientError> {
        let resp = self
            .client
            .post(self.url("/auth/signup/"))
            .json(&json!({
                "username": username,
                "email": email,
                "password": password,
            }))
            .send()
            .await?;

        let auth: AuthResponse = Self::read_json(resp).await?;
        self.set_token(auth.access_token)
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), ClientError> {
        let resp = self
            .client
            .post(self.url("/auth/login/"))
            .json(&json!({
                "username": username,
                "password": password,
            }))
            .send()
            .await?;

        let auth: AuthResponse = Self::read_json(resp).await?;
        self.set_token(auth.access_token)
    }

    pub async fn feed(&self, kind: &FeedKind, page: Option<&str>) -> Result<Page<Post>, ClientError> {
        let mut req = self.authorized(self.client.get(self.url(&kind.path())));
        if let Some(page) = page {
            req = req.query(&[("page", page)]);
        }

        let resp = req.send().await?;
        let envelope: PageEnvelope = Self::read_json(resp).await?;
        Ok(envelope.page)
    }

    pub async fn profile(&self, username: &str, page: Option<&str>) -> Result<Profile, ClientError> {
        let path = FeedKind::Author(username.to_string()).path();
        let mut req = self.authorized(self.client.get(self.url(&path)));
        if let Some(page) = page {
            req = req.query(&[("page", page)]);
        }

        Self::read_json(req.send().await?).await
    }

    pub async fn get_post(&self, id: i64) -> Result<PostDetail, ClientError> {
        let resp = self
            .authorized(self.client.get(self.url(&format!("/posts/{id}/"))))
            .send()
            .await?;
        Self::read_json(resp).await
    }

    /// Creates a post and returns the profile URL the server redirected to.
    pub async fn create_post(
        &self,
        text: &str,
        group: Option<i64>,
        image: Option<ImageUpload>,
    ) -> Result<String, ClientError> {
        let resp = self
            .authorized(self.client.post(self.url("/create/")))
            .json(&PostSubmission { text, group, image })
            .send()
            .await?;
        Self::expect_redirect(resp).await
    }

    pub async fn edit_post(
        &self,
        id: i64,
        text: &str,
        group: Option<i64>,
        image: Option<ImageUpload>,
    ) -> Result<String, ClientError> {
        let resp = self
            .authorized(self.client.post(self.url(&format!("/posts/{id}/edit/"))))
            .json(&PostSubmission { text, group, image })
            .send()
            .await?;
        Self::expect_redirect(resp).await
    }

    pub async fn comment(&self, post_id: i64, text: &str) -> Result<String, ClientError> {
        let resp = self
            .authorized(
                self.client
                    .post(self.url(&format!("/posts/{post_id}/comment/"))),
            )
            .json(&json!({ "text": text }))
            .send()
            .await?;
        Self::expect_redirect(resp).await
    }

    pub async fn follow(&self, username: &str) -> Result<String, ClientError> {
        let resp = self
            .authorized(
                self.client
                    .get(self.url(&format!("{}follow/", profile_path(username)))),
            )
            .send()
            .await?;
        Self::expect_redirect(resp).await
    }

    pub async fn unfollow(&self, username: &str) -> Result<String, ClientError> {
        let resp = self
            .authorized(
                self.client
                    .get(self.url(&format!("{}unfollow/", profile_path(username)))),
            )
            .send()
            .await?;
        Self::expect_redirect(resp).await
    }
}
