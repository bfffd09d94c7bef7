use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::application::pagination::DEFAULT_PAGE_SIZE;

pub const DEFAULT_INDEX_CACHE_TTL_SECS: u64 = 20;
pub const DEFAULT_CACHE_CAPACITY: u64 = 1_000;
pub const DEFAULT_LOGIN_URL: &str = "/auth/login/";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Postgres connection string; without it the server keeps data in memory.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    #[serde(default)]
    pub cors_origins: Vec<String>,
    pub page_size: usize,
    pub index_cache_ttl_secs: u64,
    pub cache_capacity: u64,
    pub media_root: String,
    pub login_url: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into());
        let port = parse_var("PORT", 8080)?;
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());
        let jwt_secret =
            std::env::var("JWT_SECRET").map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?;
        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let page_size = parse_var("PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        let index_cache_ttl_secs = parse_var("INDEX_CACHE_TTL_SECS", DEFAULT_INDEX_CACHE_TTL_SECS)?;
        let cache_capacity = parse_var("CACHE_CAPACITY", DEFAULT_CACHE_CAPACITY)?;
        let media_root = std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".into());
        let login_url = std::env::var("LOGIN_URL").unwrap_or_else(|_| DEFAULT_LOGIN_URL.into());

        if page_size == 0 {
            anyhow::bail!("PAGE_SIZE must be positive");
        }

        Ok(Self {
            host,
            port,
            database_url,
            jwt_secret,
            cors_origins,
            page_size,
            index_cache_ttl_secs,
            cache_capacity,
            media_root,
            login_url,
        })
    }

    pub fn index_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.index_cache_ttl_secs)
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {}: {}", name, e)),
        Err(_) => Ok(default),
    }
}
