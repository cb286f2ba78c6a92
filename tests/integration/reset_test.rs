//! Integration tests for the password reset flow.

mod helpers;

use http::StatusCode;
use uuid::Uuid;
use warden_core::traits::ResetTokenStore;
use warden_entity::user::UserRole;

use helpers::TestApp;

const NEW_PASSWORD: &str = "Brand1NewPassword";

async fn issue_token(app: &TestApp, user_id: Uuid) -> String {
    let admin = app.session_for(UserRole::Admin).await;
    let response = app
        .request(
            "POST",
            &format!("/admin/users/{user_id}/password-reset"),
            None,
            Some(&admin),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(response.body["data"]["expires_in_minutes"], 30);
    response.body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_reset_is_single_use_and_revokes_sessions() {
    let app = TestApp::new();
    let user_id = app.create_test_user("forgetful@example.com", UserRole::User);
    let old_session = app.login("forgetful@example.com").await;
    let token = issue_token(&app, user_id).await;

    let body = serde_json::json!({ "token": token, "new_password": NEW_PASSWORD });
    let response = app
        .request("POST", "/auth/password-reset/confirm", Some(body.clone()), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.session_max_age(), Some(0));

    let response = app
        .request("GET", "/auth/me", None, Some(&old_session))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request(
            "POST",
            "/auth/login",
            Some(serde_json::json!({
                "email": "forgetful@example.com",
                "password": NEW_PASSWORD,
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request("POST", "/auth/password-reset/confirm", Some(body), None)
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_weak_password_keeps_token_usable() {
    let app = TestApp::new();
    let user_id = app.create_test_user("weak@example.com", UserRole::User);
    let token = issue_token(&app, user_id).await;

    let response = app
        .request(
            "POST",
            "/auth/password-reset/confirm",
            Some(serde_json::json!({ "token": token, "new_password": "short" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .request(
            "POST",
            "/auth/password-reset/confirm",
            Some(serde_json::json!({ "token": token, "new_password": NEW_PASSWORD })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_token_is_rejected() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/auth/password-reset/confirm",
            Some(serde_json::json!({ "token": "made-up", "new_password": NEW_PASSWORD })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_issue_for_missing_user() {
    let app = TestApp::new();
    let admin = app.session_for(UserRole::Admin).await;

    let response = app
        .request(
            "POST",
            &format!("/admin/users/{}/password-reset", Uuid::new_v4()),
            None,
            Some(&admin),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    response.assert_private();
}

#[tokio::test]
async fn test_failed_password_write_keeps_sessions_and_token() {
    let app = TestApp::with_failing_password_writes();
    let user_id = app.create_test_user("stuck@example.com", UserRole::User);
    let old_session = app.login("stuck@example.com").await;
    let token = issue_token(&app, user_id).await;

    let body = serde_json::json!({ "token": token, "new_password": NEW_PASSWORD });
    let response = app
        .request("POST", "/auth/password-reset/confirm", Some(body), None)
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);

    let response = app
        .request("GET", "/auth/me", None, Some(&old_session))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    // The old password still works and the token was put back.
    app.login("stuck@example.com").await;
    let restored = app
        .store
        .take_reset_token(&warden_auth::token::sha256_hex(&token))
        .await
        .unwrap();
    assert_eq!(restored.map(|t| t.user_id), Some(user_id));
}
