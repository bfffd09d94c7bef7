pub mod auth;
pub mod feed;
pub mod follow;
pub mod post;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(feed::index)
        .service(feed::group_list)
        .service(feed::profile)
        .service(feed::follow_index)
        .service(follow::profile_follow)
        .service(follow::profile_unfollow)
        .service(post::post_detail)
        .service(post::create_form)
        .service(post::create_post)
        .service(post::edit_form)
        .service(post::edit_post)
        .service(post::add_comment)
        .service(post::comment_redirect)
        .service(auth::scope());
}
