use crate::application::auth_service::AuthService;
use crate::domain::error::DomainError;
use crate::infrastructure::security::TOKEN_TTL_HOURS;
use crate::presentation::dto::{
    AuthResponse, LoginPageResponse, LoginRequest, NextQuery, RegisterRequest,
};
use actix_web::{HttpResponse, Responder, Scope, get, post, web};
use tracing::info;

pub fn scope() -> Scope {
    web::scope("/auth")
        .service(login_page)
        .service(signup)
        .service(login)
}

fn token_response(access_token: String) -> AuthResponse {
    AuthResponse {
        access_token,
        expires_in: TOKEN_TTL_HOURS * 3600,
        token_type: "Bearer".to_string(),
    }
}

/// Where guests are sent when a page needs a session.
#[get("/login/")]
async fn login_page(query: web::Query<NextQuery>) -> impl Responder {
    HttpResponse::Ok().json(LoginPageResponse {
        message: "POST username and password to obtain a bearer token",
        next: query.into_inner().next,
    })
}

#[post("/signup/")]
async fn signup(
    service: web::Data<AuthService>,
    payload: web::Json<RegisterRequest>,
) -> Result<impl Responder, DomainError> {
    let user = service
        .register(&payload.username, &payload.email, &payload.password)
        .await?;
    let jwt = service.login(&user.username, &payload.password).await?;

    info!(user_id = %user.id, username = %user.username, "user signed up");

    Ok(HttpResponse::Created().json(token_response(jwt)))
}

#[post("/login/")]
async fn login(
    service: web::Data<AuthService>,
    payload: web::Json<LoginRequest>,
) -> Result<impl Responder, DomainError> {
    let jwt = service.login(&payload.username, &payload.password).await?;

    info!(username = %payload.username, "user logged in");

    Ok(HttpResponse::Ok().json(token_response(jwt)))
}
