use crate::application::forms::{COMMENT_FORM_FIELDS, CommentForm, PostForm};
use crate::application::post_service::{EditOutcome, PostService};
use crate::domain::error::{DomainError, FieldErrors};
use crate::presentation::dto::{
    CommentFormResponse, FormValues, PostDetailResponse, PostFormResponse, UserSummary,
};
use crate::presentation::utils::{AuthenticatedUser, post_url, profile_url, redirect, request_id};
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use tracing::info;

#[get("/posts/{id}/")]
async fn post_detail(
    posts: web::Data<PostService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, DomainError> {
    let detail = posts.post_detail(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(PostDetailResponse {
        author: UserSummary::from(&detail.author),
        post: detail.post,
        author_posts_count: detail.author_posts_count,
        group: detail.group,
        comments: detail.comments,
        comment_form: &COMMENT_FORM_FIELDS,
    }))
}

#[get("/create/")]
async fn create_form(_user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(PostFormResponse::new(
        None,
        FormValues::default(),
        FieldErrors::default(),
    ))
}

#[post("/create/")]
async fn create_post(
    user: AuthenticatedUser,
    req: HttpRequest,
    posts: web::Data<PostService>,
    payload: web::Json<PostForm>,
) -> Result<HttpResponse, DomainError> {
    let form = payload.into_inner();
    let values = submitted_values(&form);

    match posts.create_post(user.id, form).await {
        Ok(post) => {
            info!(
                request_id = %request_id(&req),
                username = %user.username,
                post_id = post.id,
                "post created"
            );
            Ok(redirect(&profile_url(&user.username)))
        }
        Err(DomainError::Validation(errors)) => {
            Ok(HttpResponse::BadRequest().json(PostFormResponse::new(None, values, errors)))
        }
        Err(err) => Err(err),
    }
}

/// Edit form for the author. Anyone else is sent back to the post.
#[get("/posts/{id}/edit/")]
async fn edit_form(
    user: AuthenticatedUser,
    posts: web::Data<PostService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, DomainError> {
    let post = posts.get_post(path.into_inner()).await?;
    if post.author_id != user.id {
        return Ok(redirect(&post_url(post.id)));
    }

    let values = FormValues {
        text: post.text,
        group: post.group_id,
        image: post.image,
    };
    Ok(HttpResponse::Ok().json(PostFormResponse::new(
        Some(post.id),
        values,
        FieldErrors::default(),
    )))
}

#[post("/posts/{id}/edit/")]
async fn edit_post(
    user: AuthenticatedUser,
    req: HttpRequest,
    posts: web::Data<PostService>,
    path: web::Path<i64>,
    payload: web::Json<PostForm>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    let form = payload.into_inner();
    let values = submitted_values(&form);

    match posts.edit_post(user.id, post_id, form).await {
        Ok(outcome) => {
            if let EditOutcome::Updated(post) = &outcome {
                info!(
                    request_id = %request_id(&req),
                    username = %user.username,
                    post_id = post.id,
                    "post updated"
                );
            }
            Ok(redirect(&post_url(outcome.post().id)))
        }
        Err(DomainError::Validation(errors)) => Ok(HttpResponse::BadRequest().json(
            PostFormResponse::new(Some(post_id), values, errors),
        )),
        Err(err) => Err(err),
    }
}

#[post("/posts/{id}/comment/")]
async fn add_comment(
    user: AuthenticatedUser,
    req: HttpRequest,
    posts: web::Data<PostService>,
    path: web::Path<i64>,
    payload: web::Json<CommentForm>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();

    match posts.add_comment(user.id, post_id, payload.into_inner()).await {
        Ok(comment) => {
            info!(
                request_id = %request_id(&req),
                username = %user.username,
                post_id,
                comment_id = comment.id,
                "comment added"
            );
            Ok(redirect(&post_url(post_id)))
        }
        Err(DomainError::Validation(errors)) => {
            Ok(HttpResponse::BadRequest().json(CommentFormResponse::new(post_id, errors)))
        }
        Err(err) => Err(err),
    }
}

/// Without a body there is nothing to add; signed-in users land on the post.
#[get("/posts/{id}/comment/")]
async fn comment_redirect(_user: AuthenticatedUser, path: web::Path<i64>) -> HttpResponse {
    redirect(&post_url(path.into_inner()))
}

fn submitted_values(form: &PostForm) -> FormValues {
    FormValues {
        text: form.text.clone(),
        group: form.group,
        image: form.image.as_ref().map(|upload| upload.filename.clone()),
    }
}
