//! Integration tests for the login and logout flow.

mod helpers;

use http::StatusCode;
use warden_core::traits::UserStore;
use warden_entity::user::UserRole;

use helpers::{PASSWORD, TestApp};

#[tokio::test]
async fn test_login_sets_session_cookie() {
    let app = TestApp::new();
    app.create_test_user("reader@example.com", UserRole::User);

    let response = app
        .request(
            "POST",
            "/auth/login",
            Some(serde_json::json!({
                "email": "Reader@Example.com",
                "password": PASSWORD,
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let cookie = response.session_cookie().unwrap();
    assert!(cookie.contains("; Path=/; Max-Age=1296000; HttpOnly; Secure; SameSite=Lax"));
    assert_eq!(response.session_cookie_value().unwrap().len(), 43);
    assert_eq!(response.body["data"]["role"], "user");
}

#[tokio::test]
async fn test_login_invalid_password() {
    let app = TestApp::new();
    app.create_test_user("reader@example.com", UserRole::User);

    let response = app
        .request(
            "POST",
            "/auth/login",
            Some(serde_json::json!({
                "email": "reader@example.com",
                "password": "Wrong1Password",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.session_cookie().is_none());
}

#[tokio::test]
async fn test_login_unknown_user() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/auth/login",
            Some(serde_json::json!({
                "email": "nobody@example.com",
                "password": PASSWORD,
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_login_malformed_email() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/auth/login",
            Some(serde_json::json!({ "email": "not-an-email", "password": PASSWORD })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_me_returns_profile() {
    let app = TestApp::new();
    let id = app.create_test_user("editor@example.com", UserRole::Editor);
    let sid = app.login("editor@example.com").await;

    let response = app.request("GET", "/auth/me", None, Some(&sid)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["id"], id.to_string());
    assert_eq!(response.body["data"]["email"], "editor@example.com");
    assert_eq!(response.body["data"]["role"], "editor");
    response.assert_private();
}

#[tokio::test]
async fn test_logout_clears_cookie_and_revokes() {
    let app = TestApp::new();
    let sid = app.session_for(UserRole::User).await;

    let response = app.request("POST", "/auth/logout", None, Some(&sid)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.session_max_age(), Some(0));
    assert_eq!(response.session_cookie_value(), None);

    let response = app.request("GET", "/auth/me", None, Some(&sid)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.session_max_age(), Some(0));
}

#[tokio::test]
async fn test_logout_without_cookie_still_clears() {
    let app = TestApp::new();

    let response = app.request("POST", "/auth/logout", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.session_max_age(), Some(0));
}

#[tokio::test]
async fn test_logout_all_revokes_every_session() {
    let app = TestApp::new();
    app.create_test_user("multi@example.com", UserRole::User);
    let first = app.login("multi@example.com").await;
    let second = app.login("multi@example.com").await;

    let response = app
        .request("POST", "/auth/logout-all", None, Some(&first))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["revoked"], 2);
    assert_eq!(response.session_max_age(), Some(0));

    for sid in [&first, &second] {
        let response = app.request("GET", "/auth/me", None, Some(sid)).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_login_upgrades_outdated_hash() {
    let app = TestApp::new();
    let id = app.create_test_user("legacy@example.com", UserRole::User);

    let mut weaker = app.config.auth.clone();
    weaker.scrypt_log_n = 3;
    let legacy_hash = warden_auth::PasswordHasher::new(&weaker)
        .unwrap()
        .hash_blocking(PASSWORD)
        .unwrap();
    app.store.update_password_hash(id, &legacy_hash).await.unwrap();

    app.login("legacy@example.com").await;

    let user = app.store.find_user(id).await.unwrap().unwrap();
    assert_ne!(user.password_hash, legacy_hash);
    assert!(user.password_hash.contains("$N=16,r=8,p=1$"));
}
