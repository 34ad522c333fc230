//! Store trait: the abstract interface for identity, contact, document, and
//! grant persistence.
//!
//! This trait keeps the exchange service storage-agnostic. Implementations
//! include SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use satchel_core::{Document, DocumentId, Identity, IdentityId, MediaKind, NewIdentity, Role, ShareToken};

use crate::error::Result;

/// Result of an idempotent insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// At least one row was written.
    Inserted,
    /// Everything was already present (idempotent, not an error).
    AlreadyPresent,
}

/// The Store trait: async interface for exchange persistence.
///
/// All methods are async to support both sync (SQLite) and async backends.
/// For SQLite, we use `spawn_blocking` internally to avoid blocking the
/// runtime.
///
/// # Design Notes
///
/// - **Idempotent relation inserts**: re-inserting an existing contact pair or
///   grant returns `AlreadyPresent`.
/// - **Atomic composites**: a document row and its owner grant commit in one
///   transaction; the two directed rows of a contact pair likewise.
/// - **Derived visibility**: `contacts_of` computes the explicit-edge ∪
///   elevated-role union at read time; it is never materialized.
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Identity Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert a new identity and return the stored record.
    ///
    /// Fails with [`StoreError::UsernameTaken`] if the username is in use.
    ///
    /// [`StoreError::UsernameTaken`]: crate::error::StoreError::UsernameTaken
    async fn insert_identity(&self, new: &NewIdentity) -> Result<Identity>;

    /// Get an identity by id.
    async fn identity_by_id(&self, id: IdentityId) -> Result<Option<Identity>>;

    /// Get an identity by its unique username.
    async fn identity_by_username(&self, username: &str) -> Result<Option<Identity>>;

    /// Resolve a share token to the identity holding it.
    async fn identity_by_share_token(&self, token: &ShareToken) -> Result<Option<Identity>>;

    /// The lowest-id identity holding `role`, if any. Backs the bootstrap
    /// lookup for the seeded Operator.
    async fn identity_by_role(&self, role: Role) -> Result<Option<Identity>>;

    /// List all identities, ordered by id.
    async fn list_identities(&self) -> Result<Vec<Identity>>;

    /// Update an identity's credential hash and/or role. `None` leaves a
    /// field untouched. Returns the updated record, or `None` if the id is
    /// unknown.
    ///
    /// The username is immutable; there is deliberately no way to change it.
    async fn update_identity(
        &self,
        id: IdentityId,
        credential_hash: Option<&str>,
        role: Option<Role>,
    ) -> Result<Option<Identity>>;

    /// Delete an identity together with its contact edges and grants.
    /// Documents it owns remain. Returns `false` if the id is unknown.
    async fn delete_identity(&self, id: IdentityId) -> Result<bool>;

    // ─────────────────────────────────────────────────────────────────────────
    // Contact Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert both directed edges of a contact pair in one transaction.
    /// Idempotent: edges already present are left alone.
    async fn insert_contact_pair(&self, a: IdentityId, b: IdentityId) -> Result<InsertOutcome>;

    /// The identities visible to `viewer`: explicit contacts plus every
    /// elevated-role identity, minus the viewer itself, deduplicated,
    /// ordered by id.
    async fn contacts_of(&self, viewer: IdentityId) -> Result<Vec<Identity>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Document Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert a document and the owner's self-grant in one transaction;
    /// returns the stored record.
    async fn insert_document(
        &self,
        owner: IdentityId,
        kind: MediaKind,
        storage_ref: &str,
        created_at: u64,
    ) -> Result<Document>;

    /// Get a document by id.
    async fn document_by_id(&self, id: DocumentId) -> Result<Option<Document>>;

    /// List every document, ordered by id. Privileged use only; role gating
    /// happens above the store.
    async fn list_documents(&self) -> Result<Vec<Document>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Grant Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Grant `user` visibility of `document`. Idempotent.
    async fn insert_grant(&self, user: IdentityId, document: DocumentId) -> Result<InsertOutcome>;

    /// Revoke a grant. Returns `false` when there was nothing to revoke
    /// (tolerated, not an error).
    async fn delete_grant(&self, user: IdentityId, document: DocumentId) -> Result<bool>;

    /// Full records of every document `user` holds a grant for, ordered
    /// by id.
    async fn documents_visible_to(&self, user: IdentityId) -> Result<Vec<Document>>;

    /// Ids of every identity holding a grant for `document`, ordered by id.
    /// Admin introspection only.
    async fn grant_holders(&self, document: DocumentId) -> Result<Vec<IdentityId>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_outcome_eq() {
        assert_eq!(InsertOutcome::Inserted, InsertOutcome::Inserted);
        assert_ne!(InsertOutcome::Inserted, InsertOutcome::AlreadyPresent);
    }
}
