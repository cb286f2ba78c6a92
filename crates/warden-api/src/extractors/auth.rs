//! Identity extractors fed by the authorization gate.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use warden_core::error::AppError;
use warden_entity::session::SessionIdentity;

/// The identity of a request that passed [`guard`](crate::middleware::guard::guard).
#[derive(Debug, Clone)]
pub struct AuthUser(pub SessionIdentity);

impl std::ops::Deref for AuthUser {
    type Target = SessionIdentity;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionIdentity>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::authentication("Authentication required"))
    }
}

/// The identity behind [`optional`](crate::middleware::guard::optional), if any.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<SessionIdentity>);

impl<S: Send + Sync> FromRequestParts<S> for MaybeAuthUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(parts.extensions.get::<SessionIdentity>().cloned()))
    }
}
