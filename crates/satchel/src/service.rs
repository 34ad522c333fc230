//! The Exchange Service: unified API for the Satchel system.
//!
//! The service brings together identity storage, the relationship graph,
//! documents, permission grants and the delivery channel into one
//! interface for building transports on top of.

use std::sync::Arc;

use tracing::info;

use satchel_core::{
    credential, CoreError, Document, DocumentId, Identity, IdentityId, IdentityUpdate, MediaKind,
    NewIdentity, Role, ShareToken,
};
use satchel_realtime::{ContentNotice, DeliveryEvent, DeliveryRegistry, RelayRequest};
use satchel_store::{Store, StoreError};

use crate::error::{Result, ServiceError};

/// Configuration for the Exchange Service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Username of the seeded Operator identity.
    pub operator_username: String,
    /// Initial credential for the seeded Operator identity.
    pub operator_credential: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            operator_username: "Operator".to_string(),
            operator_credential: "please-rotate-me".to_string(),
        }
    }
}

/// The main Exchange Service struct.
///
/// Provides a unified API for:
/// - Creating and managing identities
/// - Establishing contacts via share tokens
/// - Submitting documents with automatic recipient grants
/// - Granting and revoking document access
/// - Pushing delivery events to connected clients
pub struct ExchangeService<S: Store> {
    /// The storage backend.
    store: Arc<S>,
    /// Room registry for real-time pushes.
    delivery: Arc<DeliveryRegistry>,
    /// Configuration.
    config: ServiceConfig,
}

impl<S: Store> ExchangeService<S> {
    /// Create a new service instance.
    pub fn new(store: S, config: ServiceConfig) -> Self {
        Self {
            store: Arc::new(store),
            delivery: Arc::new(DeliveryRegistry::new()),
            config,
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the delivery registry, shared with the transport layer.
    pub fn delivery(&self) -> Arc<DeliveryRegistry> {
        Arc::clone(&self.delivery)
    }

    /// Ensure the Operator identity exists, creating it on first run.
    ///
    /// Idempotent, and keyed by role rather than username: a reconfigured
    /// seed username on an existing database resolves to the original
    /// Operator instead of minting a second one.
    pub async fn bootstrap(&self) -> Result<Identity> {
        if let Some(operator) = self.store.identity_by_role(Role::Operator).await? {
            return Ok(operator);
        }

        let operator = self
            .insert_new(
                &self.config.operator_username,
                &self.config.operator_credential,
                Role::Operator,
            )
            .await?;
        info!(username = %operator.username, "seeded operator identity");
        Ok(operator)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Identity Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a new identity with a freshly issued share token.
    ///
    /// The Operator role belongs to the bootstrap seed alone and cannot be
    /// requested here.
    pub async fn create_identity(
        &self,
        username: &str,
        credential: &str,
        role: Role,
    ) -> Result<Identity> {
        if role == Role::Operator {
            return Err(ServiceError::OperatorRoleReserved);
        }
        self.insert_new(username, credential, role).await
    }

    /// Check a username/credential pair against the stored hash.
    ///
    /// Returns the identity on success, `None` for an unknown username or
    /// a wrong credential. The two cases are indistinguishable on purpose.
    pub async fn verify_credentials(
        &self,
        username: &str,
        credential: &str,
    ) -> Result<Option<Identity>> {
        let Some(identity) = self.store.identity_by_username(username).await? else {
            return Ok(None);
        };
        if credential::verify_credential(credential, &identity.credential_hash)? {
            Ok(Some(identity))
        } else {
            Ok(None)
        }
    }

    /// Get an identity by id.
    pub async fn identity(&self, id: IdentityId) -> Result<Identity> {
        self.store
            .identity_by_id(id)
            .await?
            .ok_or(ServiceError::IdentityNotFound(id))
    }

    /// List every identity.
    pub async fn list_identities(&self) -> Result<Vec<Identity>> {
        Ok(self.store.list_identities().await?)
    }

    /// Apply a partial update to an identity.
    ///
    /// The Operator identity is immutable and rejects every update, and no
    /// update may promote another identity to the Operator role.
    pub async fn update_identity(&self, id: IdentityId, update: IdentityUpdate) -> Result<Identity> {
        let target = self.identity(id).await?;
        if target.is_operator() {
            return Err(ServiceError::OperatorProtected);
        }
        if update.role == Some(Role::Operator) {
            return Err(ServiceError::OperatorRoleReserved);
        }
        if update.is_empty() {
            return Ok(target);
        }

        let credential_hash = match &update.credential {
            Some(credential) => Some(credential::hash_credential(credential)?),
            None => None,
        };

        self.store
            .update_identity(id, credential_hash.as_deref(), update.role)
            .await?
            .ok_or(ServiceError::IdentityNotFound(id))
    }

    /// Delete an identity.
    ///
    /// Contact edges and grants held by it disappear with it; documents it
    /// owned remain. The Operator identity cannot be deleted.
    pub async fn delete_identity(&self, id: IdentityId) -> Result<()> {
        let target = self.identity(id).await?;
        if target.is_operator() {
            return Err(ServiceError::OperatorProtected);
        }
        if !self.store.delete_identity(id).await? {
            return Err(ServiceError::IdentityNotFound(id));
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Contact Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Establish mutual contact with whoever holds the share token.
    ///
    /// The target is told about its new contact over the delivery channel;
    /// the actor learns about the target from the returned identity.
    /// Connecting to one's own token is a harmless no-op.
    pub async fn connect_by_token(
        &self,
        actor: IdentityId,
        token: &ShareToken,
    ) -> Result<Identity> {
        let target = self
            .store
            .identity_by_share_token(token)
            .await?
            .ok_or_else(|| ServiceError::UnknownShareToken(token.clone()))?;
        let actor = self.identity(actor).await?;

        self.store.insert_contact_pair(actor.id, target.id).await?;

        self.delivery.notify(
            target.id,
            DeliveryEvent::ContactAdded {
                contact: actor.summary(),
            },
        );
        Ok(target)
    }

    /// List the identities visible to a viewer.
    ///
    /// Explicit contacts plus every elevated identity, viewer excluded.
    pub async fn contacts_of(&self, viewer: IdentityId) -> Result<Vec<Identity>> {
        Ok(self.store.contacts_of(viewer).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Document Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Record a new document and fan out access.
    ///
    /// The owner always gets a self-grant. A named recipient additionally
    /// gets a grant, then a `receive_message` push; the grant lands before
    /// the push so a client reacting to the event sees the document.
    pub async fn submit(
        &self,
        owner: IdentityId,
        kind: MediaKind,
        storage_ref: &str,
        recipient: Option<IdentityId>,
    ) -> Result<Document> {
        let recipient = match recipient {
            Some(id) => Some(self.identity(id).await?),
            None => None,
        };

        let document = self
            .store
            .insert_document(owner, kind, storage_ref, now_millis())
            .await?;

        if let Some(recipient) = recipient {
            self.store.insert_grant(recipient.id, document.id).await?;
            self.delivery.notify(
                recipient.id,
                DeliveryEvent::ReceiveMessage(ContentNotice {
                    from: owner,
                    kind,
                    content: document.storage_ref.clone(),
                    document_id: Some(document.id),
                }),
            );
        }
        Ok(document)
    }

    /// List the documents a viewer holds a grant for.
    pub async fn library_of(&self, viewer: IdentityId) -> Result<Vec<Document>> {
        Ok(self.store.documents_visible_to(viewer).await?)
    }

    /// List every document regardless of grants.
    pub async fn all_documents(&self) -> Result<Vec<Document>> {
        Ok(self.store.list_documents().await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Permission Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Grant or revoke a user's access to a document.
    ///
    /// Both sides of the pair must exist. Granting twice and revoking a
    /// grant that was never made are both no-ops.
    pub async fn set_access(
        &self,
        user: IdentityId,
        document: DocumentId,
        allowed: bool,
    ) -> Result<()> {
        self.identity(user).await?;
        if self.store.document_by_id(document).await?.is_none() {
            return Err(ServiceError::DocumentNotFound(document));
        }

        if allowed {
            self.store.insert_grant(user, document).await?;
        } else {
            self.store.delete_grant(user, document).await?;
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Delivery Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Forward a client-relayed notice to the addressed identity's room.
    ///
    /// Returns how many connections received it; zero when the room is
    /// empty, which is not an error.
    pub fn relay(&self, relay: &RelayRequest) -> usize {
        self.delivery
            .notify(relay.to, DeliveryEvent::ReceiveMessage(relay.notice()))
    }

    /// Hash, validate and insert a fresh identity.
    async fn insert_new(&self, username: &str, credential: &str, role: Role) -> Result<Identity> {
        if username.trim().is_empty() {
            return Err(CoreError::EmptyUsername.into());
        }
        let new = NewIdentity {
            username: username.to_string(),
            credential_hash: credential::hash_credential(credential)?,
            role,
            share_token: ShareToken::issue(username, now_millis()),
        };
        match self.store.insert_identity(&new).await {
            Ok(identity) => Ok(identity),
            Err(StoreError::UsernameTaken(name)) => Err(ServiceError::UsernameTaken(name)),
            Err(e) => Err(e.into()),
        }
    }
}

/// Get current time in milliseconds.
fn now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as u64
}
