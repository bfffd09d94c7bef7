use std::sync::Arc;

use crate::application::auth_service::AuthService;
use crate::application::feed_service::FeedService;
use crate::application::follow_service::FollowService;
use crate::application::post_service::PostService;
use crate::application::response_cache::ResponseCache;
use crate::data::Repositories;
use crate::domain::error::not_found_body;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::media::MediaStorage;
use crate::infrastructure::security::JwtKeys;
use crate::presentation::handlers;
use crate::presentation::middleware::{RequestIdMiddleware, SessionMiddleware, TimingMiddleware};
use crate::presentation::utils::ViewSettings;
use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, Responder, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

/// Services and settings shared by every worker.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub feeds: FeedService,
    pub posts: PostService,
    pub follows: FollowService,
    pub cache: ResponseCache,
    pub settings: ViewSettings,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        keys: JwtKeys,
        media: Arc<dyn MediaStorage>,
        cache: ResponseCache,
        settings: ViewSettings,
    ) -> Self {
        let auth = AuthService::new(repos.users.clone(), keys);
        let feeds = FeedService::new(
            repos.posts.clone(),
            repos.groups.clone(),
            repos.users.clone(),
            repos.follows.clone(),
        );
        let posts = PostService::new(
            repos.posts,
            repos.groups,
            repos.users.clone(),
            repos.comments,
            media,
        );
        let follows = FollowService::new(repos.users, repos.follows);

        Self {
            auth,
            feeds,
            posts,
            follows,
            cache,
            settings,
        }
    }
}

/// The application with every route and middleware except CORS and access
/// logging, which depend on the deployment.
pub fn build_app(
    state: AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap(SessionMiddleware::new(state.auth.clone()))
        .wrap(TimingMiddleware)
        .wrap(RequestIdMiddleware)
        .wrap(
            DefaultHeaders::new()
                .add(("X-Content-Type-Options", "nosniff"))
                .add(("Referrer-Policy", "no-referrer"))
                .add(("Permissions-Policy", "geolocation=()"))
                .add(("Cross-Origin-Opener-Policy", "same-origin")),
        )
        .app_data(web::Data::new(state.auth))
        .app_data(web::Data::new(state.feeds))
        .app_data(web::Data::new(state.posts))
        .app_data(web::Data::new(state.follows))
        .app_data(web::Data::new(state.cache))
        .app_data(web::Data::new(state.settings))
        .route("/health", web::get().to(health))
        .configure(handlers::configure)
        .default_service(web::to(not_found))
}

pub async fn start_rest_server(config: AppConfig, state: AppState) -> anyhow::Result<()> {
    let bind_address = (config.host.clone(), config.port);

    info!(
        host = %bind_address.0,
        port = bind_address.1,
        "HTTP server starting"
    );

    HttpServer::new(move || {
        build_app(state.clone())
            .wrap(build_cors(&config))
            .wrap(Logger::default())
    })
    .bind(bind_address)?
    .run()
    .await
    .map_err(anyhow::Error::new)?;

    Ok(())
}

fn build_cors(config: &AppConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST"])
        .allowed_headers(vec![
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::AUTHORIZATION,
        ])
        .max_age(3600);

    if config.cors_origins.iter().any(|origin| origin == "*") {
        return cors.allow_any_origin();
    }

    cors = cors.supports_credentials();
    for origin in &config.cors_origins {
        cors = cors.allowed_origin(origin);
    }

    cors
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}

async fn not_found(req: HttpRequest) -> HttpResponse {
    HttpResponse::NotFound().json(not_found_body(req.path()))
}
