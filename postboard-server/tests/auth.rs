mod common;

use actix_web::http::{StatusCode, header};
use actix_web::test;
use common::TestEnv;
use postboard_server::server::build_app;
use serde_json::{Value, json};

#[actix_web::test]
async fn signup_issues_a_token_that_opens_the_follow_feed() {
    let env = TestEnv::new();
    let app = test::init_service(build_app(env.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/auth/signup/")
        .set_json(json!({
            "username": "newcomer",
            "email": "newcomer@example.com",
            "password": "long enough"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["token_type"], "Bearer");
    let token = body["access_token"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/follow/")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn login_accepts_username_or_email() {
    let env = TestEnv::new();
    let app = test::init_service(build_app(env.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/auth/signup/")
        .set_json(json!({
            "username": "reader",
            "email": "reader@example.com",
            "password": "long enough"
        }))
        .to_request();
    test::call_service(&app, req).await;

    for username in ["reader", "reader@example.com"] {
        let req = test::TestRequest::post()
            .uri("/auth/login/")
            .set_json(json!({ "username": username, "password": "long enough" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "login as {username}");
    }

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_json(json!({ "username": "reader", "password": "wrong password" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn username_with_at_sign_signs_up_and_logs_in() {
    let env = TestEnv::new();
    let app = test::init_service(build_app(env.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/auth/signup/")
        .set_json(json!({
            "username": "bob@home",
            "email": "bob@example.com",
            "password": "long enough"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    for username in ["bob@home", "bob@example.com"] {
        let req = test::TestRequest::post()
            .uri("/auth/login/")
            .set_json(json!({ "username": username, "password": "long enough" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "login as {username}");
    }
}

#[actix_web::test]
async fn signup_rejects_usernames_with_url_characters() {
    let env = TestEnv::new();
    let app = test::init_service(build_app(env.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/auth/signup/")
        .set_json(json!({
            "username": "who?#",
            "email": "who@example.com",
            "password": "long enough"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_json(json!({ "username": "who@example.com", "password": "long enough" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn duplicate_signup_conflicts() {
    let env = TestEnv::new();
    env.user("taken").await;
    let app = test::init_service(build_app(env.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/auth/signup/")
        .set_json(json!({
            "username": "taken",
            "email": "other@example.com",
            "password": "long enough"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn invalid_token_is_treated_as_a_guest() {
    let env = TestEnv::new();
    let app = test::init_service(build_app(env.state.clone())).await;

    let req = test::TestRequest::get()
        .uri("/follow/")
        .insert_header((header::AUTHORIZATION, "Bearer not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let req = test::TestRequest::get()
        .uri("/")
        .insert_header((header::AUTHORIZATION, "Bearer not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn login_page_echoes_next() {
    let env = TestEnv::new();
    let app = test::init_service(build_app(env.state.clone())).await;

    let req = test::TestRequest::get()
        .uri("/auth/login/?next=%2Fcreate%2F")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["next"], "/create/");
}

#[actix_web::test]
async fn health_reports_ok_and_echoes_the_request_id() {
    let env = TestEnv::new();
    let app = test::init_service(build_app(env.state.clone())).await;

    let req = test::TestRequest::get()
        .uri("/health")
        .insert_header(("x-request-id", "abc-123"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("x-request-id").unwrap(), "abc-123");
    assert!(resp.headers().contains_key("server-timing"));
    assert_eq!(
        resp.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
}
