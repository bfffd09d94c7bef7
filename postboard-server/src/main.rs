use std::sync::Arc;

use anyhow::Context;
use postboard_server::application::response_cache::ResponseCache;
use postboard_server::data::Repositories;
use postboard_server::data::memory::MemoryStore;
use postboard_server::infrastructure::cache::MemoryCacheBackend;
use postboard_server::infrastructure::config::AppConfig;
use postboard_server::infrastructure::database::{create_pool, run_migrations};
use postboard_server::infrastructure::logging::init_logging;
use postboard_server::infrastructure::media::FileSystemStorage;
use postboard_server::infrastructure::security::JwtKeys;
use postboard_server::presentation::utils::ViewSettings;
use postboard_server::server::{AppState, start_rest_server};
use tracing::{info, warn};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = AppConfig::from_env().context("invalid configuration")?;

    let repos = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url)
                .await
                .context("failed to connect to database")?;
            run_migrations(&pool)
                .await
                .context("failed to run migrations")?;
            info!("using postgres store");
            Repositories::postgres(pool)
        }
        None => {
            warn!("DATABASE_URL not set, data is kept in memory");
            Repositories::memory(Arc::new(MemoryStore::new()))
        }
    };

    let cache = if config.index_cache_ttl_secs == 0 {
        info!("index cache disabled");
        ResponseCache::disabled()
    } else {
        ResponseCache::new(Arc::new(MemoryCacheBackend::new(config.cache_capacity)))
    };

    let state = AppState::new(
        repos,
        JwtKeys::new(config.jwt_secret.clone()),
        Arc::new(FileSystemStorage::new(&config.media_root)),
        cache,
        ViewSettings::from(&config),
    );

    start_rest_server(config, state).await
}
