//! Auth handlers: login, logout, logout everywhere, me, session status.

use axum::Json;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, warn};

use warden_core::error::AppError;

use crate::dto::request::{LoginRequest, validate_body};
use crate::dto::response::{
    ApiResponse, MeResponse, MessageResponse, RevokedResponse, SessionResponse,
    SessionStatusResponse,
};
use crate::extractors::{AuthUser, ClientInfo, MaybeAuthUser};
use crate::state::AppState;

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    client: ClientInfo,
    Json(req): Json<LoginRequest>,
) -> Result<Response, AppError> {
    validate_body(&req)?;
    let email = req.email.trim().to_lowercase();

    let user = state.users.find_user_by_email(&email).await?;
    let verified = match &user {
        Some(user) => {
            state
                .password_hasher
                .verify(&req.password, &user.password_hash)
                .await
        }
        None => state.password_hasher.verify_missing(&req.password).await,
    };
    let Some(user) = user.filter(|_| verified) else {
        info!(ip = %client.ip, "Login failed");
        return Err(AppError::authentication("Invalid email or password"));
    };

    if state.password_hasher.needs_rehash(&user.password_hash) {
        match state.password_hasher.hash(&req.password).await {
            Ok(hash) => {
                if let Err(e) = state.users.update_password_hash(user.id, &hash).await {
                    warn!(user_id = %user.id, error = %e, "Failed to store rehashed password");
                }
            }
            Err(e) => warn!(user_id = %user.id, error = %e, "Failed to rehash password"),
        }
    }

    let issued = state
        .session_manager
        .create(user.id, &client.ip, &client.user_agent)
        .await?;

    Ok((
        [(SET_COOKIE, issued.cookie)],
        Json(ApiResponse::ok(SessionResponse {
            user_id: user.id,
            role: user.role,
            expires_at: issued.expires_at,
        })),
    )
        .into_response())
}

/// POST /auth/logout
///
/// Always succeeds and always clears the cookie.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    let sid = jar
        .get(state.session_manager.cookie_name())
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty());

    let cookie = state.session_manager.invalidate(sid.as_deref()).await;

    (
        [(SET_COOKIE, cookie)],
        Json(ApiResponse::ok(MessageResponse {
            message: "Logged out".to_string(),
        })),
    )
        .into_response()
}

/// POST /auth/logout-all
pub async fn logout_all(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Response, AppError> {
    let revoked = state.session_manager.invalidate_all(auth.user_id).await?;

    Ok((
        [(SET_COOKIE, state.session_manager.clear_cookie())],
        Json(ApiResponse::ok(RevokedResponse { revoked })),
    )
        .into_response())
}

/// GET /auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<MeResponse>>, AppError> {
    let user = state
        .users
        .find_user(auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(ApiResponse::ok(MeResponse {
        id: user.id,
        email: user.email,
        role: auth.role,
        session_expires_at: auth.expires_at,
    })))
}

/// GET /auth/session
pub async fn session(MaybeAuthUser(identity): MaybeAuthUser) -> Json<ApiResponse<SessionStatusResponse>> {
    Json(ApiResponse::ok(SessionStatusResponse {
        authenticated: identity.is_some(),
        session: identity.map(SessionResponse::from),
    }))
}
