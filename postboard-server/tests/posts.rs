mod common;

use actix_web::http::{StatusCode, header};
use actix_web::test;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use common::{SMALL_GIF, TestEnv};
use postboard_server::server::build_app;
use serde_json::{Value, json};

fn location<B>(resp: &actix_web::dev::ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[actix_web::test]
async fn guest_cannot_create_a_post() {
    let env = TestEnv::new();
    let app = test::init_service(build_app(env.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/create/")
        .set_json(json!({ "text": "guest text" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login/?next=%2Fcreate%2F");
    assert!(env.all_posts().await.is_empty());
}

#[actix_web::test]
async fn create_form_lists_the_fields() {
    let env = TestEnv::new();
    let author = env.user("auth").await;
    let app = test::init_service(build_app(env.state.clone())).await;

    let req = test::TestRequest::get()
        .uri("/create/")
        .insert_header((header::AUTHORIZATION, env.bearer(&author)))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["is_edit"], false);
    let names: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["text", "group", "image"]);
    assert_eq!(body["fields"][0]["required"], true);
    assert_eq!(body["fields"][1]["kind"], "choice");
    assert_eq!(body["fields"][2]["kind"], "image");
}

#[actix_web::test]
async fn create_redirects_to_the_author_profile() {
    let env = TestEnv::new();
    let author = env.user("auth").await;
    let group = env.group("test-slug").await;
    let app = test::init_service(build_app(env.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/create/")
        .insert_header((header::AUTHORIZATION, env.bearer(&author)))
        .set_json(json!({ "text": "Test text", "group": group.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/auth/");

    let posts = env.all_posts().await;
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].text, "Test text");
    assert_eq!(posts[0].group_id, Some(group.id));
    assert_eq!(posts[0].author_id, author.id);
}

#[actix_web::test]
async fn create_with_image_stores_the_upload() {
    let env = TestEnv::new();
    let author = env.user("auth").await;
    let app = test::init_service(build_app(env.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/create/")
        .insert_header((header::AUTHORIZATION, env.bearer(&author)))
        .set_json(json!({
            "text": "with picture",
            "image": {
                "filename": "small.gif",
                "content_type": "image/gif",
                "data": STANDARD.encode(SMALL_GIF),
            }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let posts = env.all_posts().await;
    let image = posts[0].image.clone().expect("image reference");
    assert!(image.starts_with("posts/"));
    assert!(image.ends_with(".gif"));

    let stored = std::fs::read(env.media.path().join(&image)).unwrap();
    assert_eq!(stored, SMALL_GIF);

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/", posts[0].id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["post"]["image"], image.as_str());
}

#[actix_web::test]
async fn invalid_submissions_come_back_with_field_errors() {
    let env = TestEnv::new();
    let author = env.user("auth").await;
    let app = test::init_service(build_app(env.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/create/")
        .insert_header((header::AUTHORIZATION, env.bearer(&author)))
        .set_json(json!({
            "text": "   ",
            "group": 404,
            "image": { "filename": "notes.txt", "data": STANDARD.encode(b"plain text") }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errors"]["text"][0], "This field is required.");
    assert_eq!(body["errors"]["group"][0], "Select a valid choice.");
    assert!(body["errors"]["image"][0].as_str().unwrap().starts_with("Upload a valid image"));
    assert_eq!(body["values"]["group"], 404);
    assert_eq!(body["fields"].as_array().unwrap().len(), 3);
    assert!(env.all_posts().await.is_empty());
}

#[actix_web::test]
async fn author_can_edit_their_post() {
    let env = TestEnv::new();
    let author = env.user("auth").await;
    let group = env.group("test-slug").await;
    let post = env.post(&author, "original", None).await;
    let app = test::init_service(build_app(env.state.clone())).await;

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/edit/", post.id))
        .insert_header((header::AUTHORIZATION, env.bearer(&author)))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["is_edit"], true);
    assert_eq!(body["values"]["text"], "original");

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit/", post.id))
        .insert_header((header::AUTHORIZATION, env.bearer(&author)))
        .set_json(json!({ "text": "edited", "group": group.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));

    let stored = env.fetch_post(post.id).await;
    assert_eq!(stored.text, "edited");
    assert_eq!(stored.group_id, Some(group.id));
    assert_eq!(stored.created_at, post.created_at);
}

#[actix_web::test]
async fn edit_by_someone_else_leaves_the_post_unchanged() {
    let env = TestEnv::new();
    let author = env.user("auth").await;
    let intruder = env.user("intruder").await;
    let post = env.post(&author, "original", None).await;
    let app = test::init_service(build_app(env.state.clone())).await;

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/edit/", post.id))
        .insert_header((header::AUTHORIZATION, env.bearer(&intruder)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit/", post.id))
        .insert_header((header::AUTHORIZATION, env.bearer(&intruder)))
        .set_json(json!({ "text": "hijacked" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));

    assert_eq!(env.fetch_post(post.id).await.text, "original");
}

#[actix_web::test]
async fn guest_edit_redirects_to_login() {
    let env = TestEnv::new();
    let author = env.user("auth").await;
    let post = env.post(&author, "original", None).await;
    let app = test::init_service(build_app(env.state.clone())).await;

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/edit/", post.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        location(&resp),
        format!("/auth/login/?next=%2Fposts%2F{}%2Fedit%2F", post.id)
    );
}

#[actix_web::test]
async fn comments_show_up_on_the_post_detail() {
    let env = TestEnv::new();
    let author = env.user("auth").await;
    let reader = env.user("reader").await;
    let post = env.post(&author, "commentable", None).await;
    let app = test::init_service(build_app(env.state.clone())).await;

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment/", post.id))
        .insert_header((header::AUTHORIZATION, env.bearer(&reader)))
        .set_json(json!({ "text": "nice post" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/", post.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["comments"][0]["text"], "nice post");
    assert_eq!(body["comments"][0]["author_id"], reader.id.to_string());
    assert_eq!(body["author"]["username"], "auth");
    assert_eq!(body["author_posts_count"], 1);
    assert_eq!(body["comment_form"][0]["name"], "text");
}

#[actix_web::test]
async fn guest_comment_redirects_to_login_and_adds_nothing() {
    let env = TestEnv::new();
    let author = env.user("auth").await;
    let post = env.post(&author, "commentable", None).await;
    let app = test::init_service(build_app(env.state.clone())).await;

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment/", post.id))
        .set_json(json!({ "text": "drive-by" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        location(&resp),
        format!("/auth/login/?next=%2Fposts%2F{}%2Fcomment%2F", post.id)
    );

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/", post.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["comments"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn blank_comment_is_rejected() {
    let env = TestEnv::new();
    let author = env.user("auth").await;
    let post = env.post(&author, "commentable", None).await;
    let app = test::init_service(build_app(env.state.clone())).await;

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment/", post.id))
        .insert_header((header::AUTHORIZATION, env.bearer(&author)))
        .set_json(json!({ "text": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errors"]["text"][0], "This field is required.");
}

#[actix_web::test]
async fn unknown_post_is_not_found() {
    let env = TestEnv::new();
    let app = test::init_service(build_app(env.state.clone())).await;

    let req = test::TestRequest::get().uri("/posts/999/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
