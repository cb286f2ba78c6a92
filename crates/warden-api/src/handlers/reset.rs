//! Password reset handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Response};
use tracing::info;
use uuid::Uuid;

use warden_core::error::AppError;

use crate::dto::request::{ResetConfirmRequest, validate_body};
use crate::dto::response::{ApiResponse, MessageResponse, ResetIssuedResponse};
use crate::extractors::{AuthUser, ClientInfo};
use crate::state::AppState;

/// POST /admin/users/{id}/password-reset
///
/// Issues a reset token for a user. The token is returned once; only its
/// hash is stored.
pub async fn issue(
    State(state): State<AppState>,
    admin: AuthUser,
    client: ClientInfo,
    Path(user_id): Path<Uuid>,
) -> Result<Response, AppError> {
    if state.users.find_user(user_id).await?.is_none() {
        return Err(AppError::not_found(format!("User {user_id} not found")));
    }

    let token = state
        .reset_manager
        .issue(user_id, &client.ip, &client.user_agent)
        .await?;
    info!(admin_id = %admin.user_id, user_id = %user_id, "Admin issued password reset");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(ResetIssuedResponse {
            token,
            expires_in_minutes: state.config.auth.reset_token_ttl_minutes,
        })),
    )
        .into_response())
}

/// POST /auth/password-reset/confirm
///
/// Consumes a reset token and sets the new password. Every session of the
/// user is revoked.
pub async fn confirm(
    State(state): State<AppState>,
    Json(req): Json<ResetConfirmRequest>,
) -> Result<Response, AppError> {
    validate_body(&req)?;
    state.password_validator.validate(&req.new_password)?;

    let password_hash = state.password_hasher.hash(&req.new_password).await?;

    let Some(user_id) = state
        .reset_manager
        .reset_password(&req.token, &password_hash)
        .await?
    else {
        return Err(AppError::validation("Invalid or expired reset token"));
    };
    info!(user_id = %user_id, "Password reset completed");

    Ok((
        [(SET_COOKIE, state.session_manager.clear_cookie())],
        Json(ApiResponse::ok(MessageResponse {
            message: "Password updated".to_string(),
        })),
    )
        .into_response())
}
