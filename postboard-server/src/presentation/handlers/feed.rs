use crate::application::feed_service::{FeedMode, FeedScope, FeedService};
use crate::application::follow_service::FollowService;
use crate::application::response_cache::{ResponseCache, index_key};
use crate::domain::error::DomainError;
use crate::presentation::dto::{
    FollowFeedResponse, GroupResponse, IndexResponse, PageQuery, ProfileResponse, UserSummary,
};
use crate::presentation::utils::{
    AuthenticatedUser, ViewSettings, render_json, request_id,
};
use actix_web::http::header::ContentType;
use actix_web::{HttpRequest, HttpResponse, get, web};
use tracing::{debug, info};

/// Global feed. The rendered body is cached per requested page.
#[get("/")]
async fn index(
    feeds: web::Data<FeedService>,
    cache: web::Data<ResponseCache>,
    settings: web::Data<ViewSettings>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let requested = query.page.as_deref();
    let key = index_key(requested);

    let body = cache
        .get_or_render(&key, settings.index_cache_ttl, || async {
            let feed = feeds.compose(&FeedMode::Global, None).await?;
            let page = settings.paginator.paginate(feed.posts, requested);
            debug!(page = page.number, total = page.total_items, "index rendered");
            render_json(&IndexResponse { page })
        })
        .await?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::json())
        .body(body))
}

#[get("/group/{slug}/")]
async fn group_list(
    feeds: web::Data<FeedService>,
    settings: web::Data<ViewSettings>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let slug = path.into_inner();
    let feed = feeds.compose(&FeedMode::ByGroup(slug.clone()), None).await?;
    let FeedScope::Group(group) = feed.scope else {
        return Err(DomainError::Internal(format!("group feed {slug} lost its scope")));
    };
    let page = settings.paginator.paginate(feed.posts, query.page.as_deref());

    Ok(HttpResponse::Ok().json(GroupResponse { group, page }))
}

#[get("/profile/{username}/")]
async fn profile(
    viewer: Option<AuthenticatedUser>,
    feeds: web::Data<FeedService>,
    follows: web::Data<FollowService>,
    settings: web::Data<ViewSettings>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let username = path.into_inner();
    let feed = feeds
        .compose(&FeedMode::ByAuthor(username.clone()), None)
        .await?;
    let FeedScope::Author(author) = feed.scope else {
        return Err(DomainError::Internal(format!("profile feed {username} lost its scope")));
    };

    let following = match &viewer {
        Some(viewer) => follows.is_following(viewer.id, author.id).await?,
        None => false,
    };
    let page = settings.paginator.paginate(feed.posts, query.page.as_deref());

    Ok(HttpResponse::Ok().json(ProfileResponse {
        author: UserSummary::from(&author),
        posts_count: page.total_items,
        following,
        page,
    }))
}

/// Posts by the authors the current user follows.
#[get("/follow/")]
async fn follow_index(
    req: HttpRequest,
    user: AuthenticatedUser,
    feeds: web::Data<FeedService>,
    settings: web::Data<ViewSettings>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let feed = feeds.compose(&FeedMode::Following, Some(user.id)).await?;
    let page = settings.paginator.paginate(feed.posts, query.page.as_deref());

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        total = page.total_items,
        "follow feed served"
    );

    Ok(HttpResponse::Ok().json(FollowFeedResponse { page }))
}
