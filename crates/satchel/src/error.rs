//! Error types for the Exchange Service.

use satchel_core::{CoreError, DocumentId, IdentityId, ShareToken};
use satchel_store::StoreError;
use thiserror::Error;

/// Errors that can occur during Exchange Service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Invalid input (bad role, bad media kind, empty fields).
    #[error("validation error: {0}")]
    Validation(#[from] CoreError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Identity not found.
    #[error("identity not found: {0}")]
    IdentityNotFound(IdentityId),

    /// Document not found.
    #[error("document not found: {0}")]
    DocumentNotFound(DocumentId),

    /// No identity holds this share token.
    #[error("no identity holds share token {0}")]
    UnknownShareToken(ShareToken),

    /// The username is already in use.
    #[error("username already taken: {0}")]
    UsernameTaken(String),

    /// The Operator identity cannot be modified or deleted.
    #[error("the operator identity is protected")]
    OperatorProtected,

    /// The Operator role is held only by the bootstrap seed; no create or
    /// update may assign it.
    #[error("the operator role is reserved")]
    OperatorRoleReserved,
}

/// Result type for Exchange Service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
