use crate::application::follow_service::{FollowOutcome, FollowService};
use crate::domain::error::DomainError;
use crate::presentation::utils::{AuthenticatedUser, profile_url, redirect, request_id};
use actix_web::{HttpRequest, HttpResponse, get, web};
use tracing::info;

#[get("/profile/{username}/follow/")]
async fn profile_follow(
    user: AuthenticatedUser,
    req: HttpRequest,
    follows: web::Data<FollowService>,
    path: web::Path<String>,
) -> Result<HttpResponse, DomainError> {
    let author = path.into_inner();
    let outcome = follows.follow(user.id, &author).await?;

    if outcome == FollowOutcome::Followed {
        info!(
            request_id = %request_id(&req),
            username = %user.username,
            author = %author,
            "author followed"
        );
    }

    Ok(redirect(&profile_url(&author)))
}

#[get("/profile/{username}/unfollow/")]
async fn profile_unfollow(
    user: AuthenticatedUser,
    req: HttpRequest,
    follows: web::Data<FollowService>,
    path: web::Path<String>,
) -> Result<HttpResponse, DomainError> {
    let author = path.into_inner();

    if follows.unfollow(user.id, &author).await? {
        info!(
            request_id = %request_id(&req),
            username = %user.username,
            author = %author,
            "author unfollowed"
        );
    }

    Ok(redirect(&profile_url(&author)))
}
