//! Error types for the Satchel core.

use thiserror::Error;

/// Errors that can occur while building or validating core records.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("unknown media kind: {0}")]
    UnknownMediaKind(String),

    #[error("username must not be empty")]
    EmptyUsername,

    #[error("credential must not be empty")]
    EmptyCredential,

    #[error("credential hashing failed: {0}")]
    CredentialHash(String),

    #[error("malformed credential hash: {0}")]
    MalformedCredentialHash(String),
}
