//! Request extractors for bearer-token authentication.

use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::error::ApiError;
use crate::session::{Session, SessionManager};

/// An authenticated caller.
///
/// Extraction rejects with 401 when the `Authorization: Bearer` header is
/// missing, malformed or names a token no login produced.
pub struct Authed(pub Session);

#[async_trait]
impl<S> FromRequestParts<S> for Authed
where
    S: Send + Sync,
    Arc<SessionManager>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let sessions = Arc::<SessionManager>::from_ref(state);
        let token = bearer_token(parts).ok_or(ApiError::Unauthenticated)?;
        let session = sessions
            .resolve(token)
            .await
            .ok_or(ApiError::Unauthenticated)?;
        Ok(Authed(session))
    }
}

/// An authenticated caller with an elevated role.
///
/// Extraction rejects with 403 when the session's role is not
/// Admin or Operator.
pub struct Elevated(pub Session);

#[async_trait]
impl<S> FromRequestParts<S> for Elevated
where
    S: Send + Sync,
    Arc<SessionManager>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Authed(session) = Authed::from_request_parts(parts, state).await?;
        if !session.role.is_elevated() {
            return Err(ApiError::Forbidden(
                "Administrator role required".to_string(),
            ));
        }
        Ok(Elevated(session))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
