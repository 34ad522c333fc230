//! In-memory implementation of the Store trait.
//!
//! Useful for tests and ephemeral deployments. Mirrors the SQLite backend's
//! semantics exactly, including the document self-grant and the cascade on
//! identity deletion.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;

use satchel_core::{
    Document, DocumentId, Identity, IdentityId, MediaKind, NewIdentity, Role, ShareToken,
};

use crate::error::{Result, StoreError};
use crate::traits::{InsertOutcome, Store};

#[derive(Default)]
struct Inner {
    identities: HashMap<IdentityId, Identity>,
    /// Directed follow edges. Pairing inserts both directions.
    contacts: HashSet<(IdentityId, IdentityId)>,
    documents: HashMap<DocumentId, Document>,
    grants: HashSet<(IdentityId, DocumentId)>,
    next_identity_id: i64,
    next_document_id: i64,
}

/// In-memory store. Cheap to create, nothing survives drop.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_identity(&self, new: &NewIdentity) -> Result<Identity> {
        let mut inner = self.inner.write().unwrap();

        if inner
            .identities
            .values()
            .any(|i| i.username == new.username)
        {
            return Err(StoreError::UsernameTaken(new.username.clone()));
        }

        inner.next_identity_id += 1;
        let identity = Identity {
            id: IdentityId::new(inner.next_identity_id),
            username: new.username.clone(),
            credential_hash: new.credential_hash.clone(),
            role: new.role,
            share_token: new.share_token.clone(),
        };
        inner.identities.insert(identity.id, identity.clone());
        Ok(identity)
    }

    async fn identity_by_id(&self, id: IdentityId) -> Result<Option<Identity>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.identities.get(&id).cloned())
    }

    async fn identity_by_username(&self, username: &str) -> Result<Option<Identity>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .identities
            .values()
            .find(|i| i.username == username)
            .cloned())
    }

    async fn identity_by_share_token(&self, token: &ShareToken) -> Result<Option<Identity>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .identities
            .values()
            .find(|i| i.share_token == *token)
            .cloned())
    }

    async fn identity_by_role(&self, role: Role) -> Result<Option<Identity>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .identities
            .values()
            .filter(|i| i.role == role)
            .min_by_key(|i| i.id.as_i64())
            .cloned())
    }

    async fn list_identities(&self) -> Result<Vec<Identity>> {
        let inner = self.inner.read().unwrap();
        let mut identities: Vec<_> = inner.identities.values().cloned().collect();
        identities.sort_by_key(|i| i.id.as_i64());
        Ok(identities)
    }

    async fn update_identity(
        &self,
        id: IdentityId,
        credential_hash: Option<&str>,
        role: Option<Role>,
    ) -> Result<Option<Identity>> {
        let mut inner = self.inner.write().unwrap();
        let Some(identity) = inner.identities.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(hash) = credential_hash {
            identity.credential_hash = hash.to_string();
        }
        if let Some(role) = role {
            identity.role = role;
        }
        Ok(Some(identity.clone()))
    }

    async fn delete_identity(&self, id: IdentityId) -> Result<bool> {
        let mut inner = self.inner.write().unwrap();
        if inner.identities.remove(&id).is_none() {
            return Ok(false);
        }
        // Same cascade as the FK constraints: edges and grants go,
        // owned documents stay.
        inner.contacts.retain(|(a, b)| *a != id && *b != id);
        inner.grants.retain(|(user, _)| *user != id);
        Ok(true)
    }

    async fn insert_contact_pair(&self, a: IdentityId, b: IdentityId) -> Result<InsertOutcome> {
        let mut inner = self.inner.write().unwrap();
        let forward = inner.contacts.insert((a, b));
        let backward = inner.contacts.insert((b, a));
        if forward || backward {
            Ok(InsertOutcome::Inserted)
        } else {
            Ok(InsertOutcome::AlreadyPresent)
        }
    }

    async fn contacts_of(&self, viewer: IdentityId) -> Result<Vec<Identity>> {
        let inner = self.inner.read().unwrap();
        let mut contacts: Vec<_> = inner
            .identities
            .values()
            .filter(|i| {
                i.id != viewer
                    && (i.role.is_elevated() || inner.contacts.contains(&(viewer, i.id)))
            })
            .cloned()
            .collect();
        contacts.sort_by_key(|i| i.id.as_i64());
        Ok(contacts)
    }

    async fn insert_document(
        &self,
        owner: IdentityId,
        kind: MediaKind,
        storage_ref: &str,
        created_at: u64,
    ) -> Result<Document> {
        let mut inner = self.inner.write().unwrap();
        inner.next_document_id += 1;
        let document = Document {
            id: DocumentId::new(inner.next_document_id),
            owner_id: owner,
            kind,
            storage_ref: storage_ref.to_string(),
            created_at,
        };
        inner.documents.insert(document.id, document.clone());
        inner.grants.insert((owner, document.id));
        Ok(document)
    }

    async fn document_by_id(&self, id: DocumentId) -> Result<Option<Document>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.documents.get(&id).cloned())
    }

    async fn list_documents(&self) -> Result<Vec<Document>> {
        let inner = self.inner.read().unwrap();
        let mut documents: Vec<_> = inner.documents.values().cloned().collect();
        documents.sort_by_key(|d| d.id.as_i64());
        Ok(documents)
    }

    async fn insert_grant(&self, user: IdentityId, document: DocumentId) -> Result<InsertOutcome> {
        let mut inner = self.inner.write().unwrap();
        if inner.grants.insert((user, document)) {
            Ok(InsertOutcome::Inserted)
        } else {
            Ok(InsertOutcome::AlreadyPresent)
        }
    }

    async fn delete_grant(&self, user: IdentityId, document: DocumentId) -> Result<bool> {
        let mut inner = self.inner.write().unwrap();
        Ok(inner.grants.remove(&(user, document)))
    }

    async fn documents_visible_to(&self, user: IdentityId) -> Result<Vec<Document>> {
        let inner = self.inner.read().unwrap();
        let mut documents: Vec<_> = inner
            .documents
            .values()
            .filter(|d| inner.grants.contains(&(user, d.id)))
            .cloned()
            .collect();
        documents.sort_by_key(|d| d.id.as_i64());
        Ok(documents)
    }

    async fn grant_holders(&self, document: DocumentId) -> Result<Vec<IdentityId>> {
        let inner = self.inner.read().unwrap();
        let mut holders: Vec<_> = inner
            .grants
            .iter()
            .filter(|(_, doc)| *doc == document)
            .map(|(user, _)| *user)
            .collect();
        holders.sort_by_key(|id| id.as_i64());
        Ok(holders)
    }
}
