//! Integration tests for the authorization gate.

mod helpers;

use http::StatusCode;
use warden_entity::user::UserRole;

use helpers::TestApp;

#[tokio::test]
async fn test_missing_cookie_is_unauthorized() {
    let app = TestApp::new();

    let response = app.request("GET", "/auth/me", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    response.assert_private();
    assert!(response.session_cookie().is_none());
}

#[tokio::test]
async fn test_unknown_cookie_is_unauthorized_and_cleared() {
    let app = TestApp::new();

    let response = app
        .request("GET", "/auth/me", None, Some("forged-session-token"))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    response.assert_private();
    assert_eq!(response.session_max_age(), Some(0));
}

#[tokio::test]
async fn test_admin_route_rejects_lower_roles() {
    let app = TestApp::new();
    let target = app.create_test_user("target@example.com", UserRole::User);
    let path = format!("/admin/users/{target}/password-reset");

    for role in [UserRole::User, UserRole::Editor] {
        let sid = app.session_for(role).await;
        let response = app.request("POST", &path, None, Some(&sid)).await;

        assert_eq!(response.status, StatusCode::FORBIDDEN, "{role}");
        response.assert_private();
        // Validation already ran, so the refreshed cookie is still forwarded.
        assert_eq!(response.session_cookie_value().as_deref(), Some(sid.as_str()));
    }
}

#[tokio::test]
async fn test_user_route_accepts_every_known_role() {
    let app = TestApp::new();

    for role in [UserRole::Admin, UserRole::Editor, UserRole::User] {
        let sid = app.session_for(role).await;
        let response = app.request("GET", "/auth/me", None, Some(&sid)).await;

        assert_eq!(response.status, StatusCode::OK, "{role}");
        response.assert_private();
        assert!(response.session_max_age().unwrap() > 0);
    }
}

#[tokio::test]
async fn test_unrecognized_role_is_rejected_everywhere() {
    let app = TestApp::new();
    let target = app.create_test_user("target@example.com", UserRole::User);
    let sid = app.session_for(UserRole::Unrecognized).await;

    let response = app.request("GET", "/auth/me", None, Some(&sid)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    response.assert_private();

    let path = format!("/admin/users/{target}/password-reset");
    let response = app.request("POST", &path, None, Some(&sid)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_role_change_applies_on_next_request() {
    let app = TestApp::new();
    let id = app.create_test_user("promoted@example.com", UserRole::User);
    let target = app.create_test_user("target@example.com", UserRole::User);
    let sid = app.login("promoted@example.com").await;
    let path = format!("/admin/users/{target}/password-reset");

    let response = app.request("POST", &path, None, Some(&sid)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let mut user = app.store.remove_user(id).unwrap();
    user.role = UserRole::Admin;
    app.store.insert_user(user);

    let response = app.request("POST", &path, None, Some(&sid)).await;
    assert_eq!(response.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_optional_route_without_session() {
    let app = TestApp::new();

    let response = app.request("GET", "/auth/session", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["authenticated"], false);
    response.assert_private();
}

#[tokio::test]
async fn test_optional_route_with_session() {
    let app = TestApp::new();
    let sid = app.session_for(UserRole::Editor).await;

    let response = app.request("GET", "/auth/session", None, Some(&sid)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["authenticated"], true);
    assert_eq!(response.body["data"]["session"]["role"], "editor");
    response.assert_private();
    assert_eq!(response.session_cookie_value().as_deref(), Some(sid.as_str()));
}

#[tokio::test]
async fn test_optional_route_with_invalid_session() {
    let app = TestApp::new();

    let response = app
        .request("GET", "/auth/session", None, Some("stale-token"))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["authenticated"], false);
    assert_eq!(response.session_max_age(), Some(0));
    response.assert_private();
}

#[tokio::test]
async fn test_storage_failure_is_server_error_with_private_headers() {
    let app = TestApp::with_unreachable_sessions();

    let response = app
        .request("GET", "/auth/me", None, Some("any-session-token"))
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["error"], "INTERNAL_ERROR");
    response.assert_private();
    assert!(response.session_cookie().is_none());
}

#[tokio::test]
async fn test_optional_route_survives_storage_failure() {
    let app = TestApp::with_unreachable_sessions();

    let response = app
        .request("GET", "/auth/session", None, Some("any-session-token"))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["authenticated"], false);
    response.assert_private();
}

#[tokio::test]
async fn test_logout_clears_cookie_when_storage_fails() {
    let app = TestApp::with_unreachable_sessions();

    let response = app
        .request("POST", "/auth/logout", None, Some("any-session-token"))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.session_max_age(), Some(0));
}
