mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;

use common::{PASSWORD, TestApp};
use country_tracker::services::auth::{Role, TokenService};

#[tokio::test]
async fn login_returns_a_token_for_the_traveller() {
    let app = TestApp::new();
    let traveller_id = app
        .store
        .seed_user("alice@example.com", Role::Traveller, Some(true))
        .unwrap();

    let res = app
        .post(
            "/api/v1/auth/authenticate",
            None,
            json!({ "username": "alice@example.com", "password": PASSWORD }),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["firstname"], "alice");
    assert_eq!(res.body["lastname"], "Tester");
    assert_eq!(res.body["travellerId"], traveller_id);

    let token = res.body["token"].as_str().unwrap();
    let claims = app.tokens.validate(token).unwrap();
    assert_eq!(claims.sub, "alice@example.com");
    assert_eq!(claims.role, Role::Traveller);
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let app = TestApp::new();
    app.store
        .seed_user("alice@example.com", Role::Traveller, Some(true));

    let res = app
        .post(
            "/api/v1/auth/authenticate",
            None,
            json!({ "username": "alice@example.com", "password": "Nope1234!" }),
        )
        .await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["code"], "InvalidCredentials");
}

#[tokio::test]
async fn unknown_and_disabled_users_look_the_same() {
    let app = TestApp::new();
    app.store
        .seed_user("bob@example.com", Role::Traveller, Some(false));

    for username in ["bob@example.com", "nobody@example.com"] {
        let res = app
            .post(
                "/api/v1/auth/authenticate",
                None,
                json!({ "username": username, "password": PASSWORD }),
            )
            .await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED, "{username}");
        assert_eq!(res.body["code"], "InvalidCredentials");
    }
}

#[tokio::test]
async fn blank_credentials_fail_validation() {
    let app = TestApp::new();

    let res = app
        .post("/api/v1/auth/authenticate", None, json!({ "username": " " }))
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["code"], "ValidationFailed");
    assert!(res.body["errors"]["username"].is_string());
    assert!(res.body["errors"]["password"].is_string());
}

#[tokio::test]
async fn protected_route_without_token_is_unauthenticated() {
    let app = TestApp::new();

    let res = app.get("/api/v1/travellers", None).await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["code"], "userNotAuthenticated");
}

#[tokio::test]
async fn expired_token_is_reported_as_expired() {
    let app = TestApp::new();
    app.store.seed_user("root@example.com", Role::Admin, Some(true));
    let issued = Utc::now() - Duration::hours(4);
    let token = app
        .tokens
        .issue_at("root@example.com", Role::Admin, issued)
        .unwrap();

    let res = app.get("/api/v1/travellers", Some(&token)).await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["code"], "Token is expired");
    assert!(res.body["message"].as_str().unwrap().starts_with("JWT expired at "));
}

#[tokio::test]
async fn foreign_signature_is_invalid() {
    let app = TestApp::new();
    app.store.seed_user("root@example.com", Role::Admin, Some(true));
    let other = TokenService::new(
        "c2VjcmV0LXNlY3JldC1zZWNyZXQtc2VjcmV0LXNlY3JldC1zZWNyZXQ=",
        "self",
        3600,
    )
    .unwrap();
    let token = other.issue("root@example.com", Role::Admin).unwrap();

    let res = app.get("/api/v1/travellers", Some(&token)).await;

    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body["code"], "Token is invalid");
}

#[tokio::test]
async fn garbage_token_is_invalid() {
    let app = TestApp::new();

    let res = app.get("/api/v1/travellers", Some("not.a-token")).await;

    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body["code"], "Token is invalid");
}

#[tokio::test]
async fn token_for_a_deleted_user_is_invalid() {
    let app = TestApp::new();
    let token = app.token_for("ghost@example.com", Role::Admin);

    let res = app.get("/api/v1/travellers", Some(&token)).await;

    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body["code"], "Token is invalid");
}

#[tokio::test]
async fn role_comes_from_storage_not_the_token() {
    let app = TestApp::new();
    app.store
        .seed_user("alice@example.com", Role::Traveller, Some(true));
    // signed by us, but the stored role is still TRAVELLER
    let token = app.token_for("alice@example.com", Role::Admin);

    let res = app.get("/api/v1/travellers", Some(&token)).await;

    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body["code"], "userNotAuthorized");
}

#[tokio::test]
async fn public_routes_ignore_missing_token() {
    let app = TestApp::new();
    app.store.seed_countries(&[("Greece", "GR"), ("Albania", "AL")]);

    let res = app.get("/api/v1/countries", None).await;

    assert_eq!(res.status, StatusCode::OK);
    let names: Vec<&str> = res
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Albania", "Greece"]);
    assert_eq!(res.body[0]["flagUrl"], "https://flagcdn.com/al.svg");
}

#[tokio::test]
async fn responses_carry_request_id_and_security_headers() {
    let app = TestApp::new();

    let res = app.get("/api/v1/health", None).await;

    assert_eq!(res.status, StatusCode::OK);
    assert!(res.headers.contains_key("x-request-id"));
    assert_eq!(res.headers["x-content-type-options"], "nosniff");
    assert_eq!(res.headers["x-frame-options"], "DENY");
}
