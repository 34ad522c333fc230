//! Administrative routes, restricted to elevated roles.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use satchel::store::Store;
use satchel::{Document, DocumentId, IdentityId, IdentitySummary, IdentityUpdate, Role, ServiceError};
use serde::Deserialize;
use tracing::info;

use crate::error::{ApiError, Result};
use crate::extract::Elevated;
use crate::AppState;

/// GET /api/admin/users
pub async fn list_users<S: Store>(
    State(state): State<AppState<S>>,
    Elevated(_): Elevated,
) -> Result<Json<Vec<IdentitySummary>>> {
    let identities = state.service.list_identities().await?;
    Ok(Json(identities.iter().map(|i| i.summary()).collect()))
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// POST /api/admin/users
///
/// New identities default to the plain member role. Duplicate usernames
/// come back 409.
pub async fn create_user<S: Store>(
    State(state): State<AppState<S>>,
    Elevated(session): Elevated,
    Json(body): Json<CreateUserRequest>,
) -> Result<Json<IdentitySummary>> {
    let role = body.role.unwrap_or(Role::Member);
    let identity = state
        .service
        .create_identity(&body.username, &body.password, role)
        .await?;

    info!(by = %session.username, user = %identity.username, ?role, "identity created");
    Ok(Json(identity.summary()))
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// PUT /api/admin/users/:id
pub async fn update_user<S: Store>(
    State(state): State<AppState<S>>,
    Elevated(session): Elevated,
    Path(id): Path<i64>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<IdentitySummary>> {
    let update = IdentityUpdate {
        credential: body.password,
        role: body.role,
    };
    let identity = state
        .service
        .update_identity(IdentityId::new(id), update)
        .await?;

    info!(by = %session.username, user = %identity.username, "identity updated");
    Ok(Json(identity.summary()))
}

/// DELETE /api/admin/users/:id
pub async fn delete_user<S: Store>(
    State(state): State<AppState<S>>,
    Elevated(session): Elevated,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    match state.service.delete_identity(IdentityId::new(id)).await {
        Ok(()) => {
            info!(by = %session.username, user = id, "identity deleted");
            Ok(StatusCode::OK)
        }
        Err(ServiceError::OperatorProtected) => Err(ApiError::Forbidden(
            "Cannot delete the Operator account".to_string(),
        )),
        Err(err) => Err(err.into()),
    }
}

/// GET /api/admin/documents
pub async fn list_documents<S: Store>(
    State(state): State<AppState<S>>,
    Elevated(_): Elevated,
) -> Result<Json<Vec<Document>>> {
    Ok(Json(state.service.all_documents().await?))
}

/// GET /api/admin/permissions/:userId
///
/// The ids of every document the given identity can currently see.
/// Unknown identities simply see nothing.
pub async fn user_grants<S: Store>(
    State(state): State<AppState<S>>,
    Elevated(_): Elevated,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<DocumentId>>> {
    let documents = state.service.library_of(IdentityId::new(user_id)).await?;
    Ok(Json(documents.iter().map(|d| d.id).collect()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetGrantRequest {
    pub user_id: i64,
    pub document_id: i64,
    pub grant: bool,
}

/// POST /api/admin/permissions
pub async fn set_grant<S: Store>(
    State(state): State<AppState<S>>,
    Elevated(session): Elevated,
    Json(body): Json<SetGrantRequest>,
) -> Result<StatusCode> {
    state
        .service
        .set_access(
            IdentityId::new(body.user_id),
            DocumentId::new(body.document_id),
            body.grant,
        )
        .await?;

    info!(
        by = %session.username,
        user = body.user_id,
        document = body.document_id,
        grant = body.grant,
        "access updated"
    );
    Ok(StatusCode::OK)
}
