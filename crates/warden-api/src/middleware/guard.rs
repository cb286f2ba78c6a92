//! Cookie-session authorization gate.
//!
//! Every response that passes through [`guard`] or [`optional`] is marked
//! `Cache-Control: private, no-store` and `Vary: Cookie`, whether the request
//! was accepted or rejected. The cookie produced by session validation
//! (refreshed or clearing) is always forwarded.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::{CACHE_CONTROL, SET_COOKIE, VARY};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, warn};

use warden_auth::rbac::RbacEnforcer;
use warden_auth::session::{SessionManager, Validation};
use warden_core::error::AppError;
use warden_entity::session::SessionIdentity;
use warden_entity::user::UserRole;

use crate::state::AppState;

/// Validates session cookies and enforces the role hierarchy.
#[derive(Debug, Clone)]
pub struct AuthorizationGate {
    sessions: Arc<SessionManager>,
    rbac: RbacEnforcer,
}

/// Middleware state for a route group that requires a role.
#[derive(Debug, Clone)]
pub struct RoleGuard {
    gate: AuthorizationGate,
    required: UserRole,
}

impl AuthorizationGate {
    /// Creates a gate over a session manager.
    pub fn new(sessions: Arc<SessionManager>, rbac: RbacEnforcer) -> Self {
        Self { sessions, rbac }
    }

    /// Creates a gate from the application state.
    pub fn from_state(state: &AppState) -> Self {
        Self::new(Arc::clone(&state.session_manager), state.rbac_enforcer)
    }

    /// Middleware state requiring `role` or a role above it.
    pub fn require(&self, role: UserRole) -> RoleGuard {
        RoleGuard {
            gate: self.clone(),
            required: role,
        }
    }

    /// Reads the session token from the request cookies. Empty values count as absent.
    fn session_cookie(&self, headers: &HeaderMap) -> Option<String> {
        CookieJar::from_headers(headers)
            .get(self.sessions.cookie_name())
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    }

    /// Authenticate and authorize a request.
    ///
    /// Returns the cookie to forward (if validation ran) together with the
    /// identity or the rejection.
    async fn authorize(
        &self,
        headers: &HeaderMap,
        required: &UserRole,
    ) -> (Option<String>, Result<SessionIdentity, AppError>) {
        let Some(sid) = self.session_cookie(headers) else {
            return (None, Err(AppError::authentication("Authentication required")));
        };

        let validation = match self.sessions.validate(&sid).await {
            Ok(validation) => validation,
            Err(e) => return (None, Err(e)),
        };
        let cookie = Some(validation.cookie().to_string());

        match validation {
            Validation::Invalid { reason, .. } => {
                debug!(reason = reason.as_str(), "Rejecting request with invalid session");
                (cookie, Err(AppError::authentication("Session is invalid or expired")))
            }
            Validation::Valid { session, .. } => {
                match self.rbac.require_role(&session.role, required) {
                    Ok(()) => (cookie, Ok(session)),
                    Err(e) => {
                        debug!(
                            user_id = %session.user_id,
                            role = %session.role,
                            required = %required,
                            "Rejecting request with insufficient role"
                        );
                        (cookie, Err(e))
                    }
                }
            }
        }
    }
}

/// Require a session whose role satisfies the guard's role.
///
/// Missing or invalid sessions get 401, insufficient roles get 403. On
/// success the [`SessionIdentity`] is inserted into the request extensions.
pub async fn guard(State(guard): State<RoleGuard>, mut request: Request, next: Next) -> Response {
    let (cookie, outcome) = guard
        .gate
        .authorize(request.headers(), &guard.required)
        .await;

    let mut response = match outcome {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    };

    apply_session_headers(&mut response, cookie);
    response
}

/// Resolve the session when present, never rejecting.
///
/// Invalid or missing sessions leave the request anonymous. Storage failures
/// are logged and the request proceeds anonymously.
pub async fn optional(
    State(gate): State<AuthorizationGate>,
    mut request: Request,
    next: Next,
) -> Response {
    let mut cookie = None;
    if let Some(sid) = gate.session_cookie(request.headers()) {
        match gate.sessions.validate(&sid).await {
            Ok(validation) => {
                cookie = Some(validation.cookie().to_string());
                if let Validation::Valid { session, .. } = validation {
                    request.extensions_mut().insert(session);
                }
            }
            Err(e) => warn!(error = %e, "Session validation failed, continuing anonymously"),
        }
    }

    let mut response = next.run(request).await;
    apply_session_headers(&mut response, cookie);
    response
}

/// Mark the response private and forward the validation cookie.
///
/// The validation cookie goes before any `Set-Cookie` the handler produced,
/// so a handler that logs the user out has the last word.
fn apply_session_headers(response: &mut Response, cookie: Option<String>) {
    let headers = response.headers_mut();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("private, no-store"));
    headers.append(VARY, HeaderValue::from_static("Cookie"));

    let Some(value) = cookie.and_then(|c| HeaderValue::from_str(&c).ok()) else {
        return;
    };
    let handler_cookies: Vec<HeaderValue> = headers.get_all(SET_COOKIE).iter().cloned().collect();
    headers.remove(SET_COOKIE);
    headers.append(SET_COOKIE, value);
    for existing in handler_cookies {
        headers.append(SET_COOKIE, existing);
    }
}
