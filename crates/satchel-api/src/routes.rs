//! Login and member-facing routes.

use axum::extract::State;
use axum::Json;
use satchel::store::Store;
use satchel::{Document, IdentitySummary, ShareToken};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, Result};
use crate::extract::Authed;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: IdentitySummary,
}

/// POST /api/login
///
/// Verifies the credential pair and mints a bearer token. Unknown
/// usernames and wrong passwords both come back 401.
pub async fn login<S: Store>(
    State(state): State<AppState<S>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let identity = state
        .service
        .verify_credentials(&body.username, &body.password)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    let token = state.sessions.open(&identity).await;
    info!(user = %identity.username, "login");
    Ok(Json(LoginResponse {
        token,
        user: identity.summary(),
    }))
}

/// GET /api/me
pub async fn me<S: Store>(
    State(state): State<AppState<S>>,
    Authed(session): Authed,
) -> Result<Json<IdentitySummary>> {
    let identity = state.service.identity(session.identity_id).await?;
    Ok(Json(identity.summary()))
}

/// GET /api/contacts
pub async fn contacts<S: Store>(
    State(state): State<AppState<S>>,
    Authed(session): Authed,
) -> Result<Json<Vec<IdentitySummary>>> {
    let contacts = state.service.contacts_of(session.identity_id).await?;
    Ok(Json(contacts.iter().map(|c| c.summary()).collect()))
}

#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    pub qr_code: String,
}

#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    pub message: &'static str,
    pub contact: IdentitySummary,
}

/// POST /api/contacts
///
/// Adds the identity behind a scanned share token as a mutual contact.
pub async fn connect<S: Store>(
    State(state): State<AppState<S>>,
    Authed(session): Authed,
    Json(body): Json<ConnectRequest>,
) -> Result<Json<ConnectResponse>> {
    let token = ShareToken::new(body.qr_code);
    let contact = state
        .service
        .connect_by_token(session.identity_id, &token)
        .await?;

    info!(user = %session.username, contact = %contact.username, "contact added");
    Ok(Json(ConnectResponse {
        message: "Contact added",
        contact: contact.summary(),
    }))
}

/// GET /api/documents
pub async fn documents<S: Store>(
    State(state): State<AppState<S>>,
    Authed(session): Authed,
) -> Result<Json<Vec<Document>>> {
    Ok(Json(state.service.library_of(session.identity_id).await?))
}
