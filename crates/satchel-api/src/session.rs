//! In-process bearer token sessions.
//!
//! Login mints an opaque uuid token; every authenticated request resolves
//! its bearer token back to the session minted for it. Sessions live in
//! process memory, so a restart logs everyone out.

use std::collections::HashMap;

use satchel::{Identity, IdentityId, Role};
use tokio::sync::RwLock;
use uuid::Uuid;

/// A live login session.
///
/// Username and role are snapshots taken at login, matching what the
/// token attested when it was minted.
#[derive(Debug, Clone)]
pub struct Session {
    /// The bearer token this session is keyed by.
    pub token: String,
    /// Identity the token was minted for.
    pub identity_id: IdentityId,
    /// Username at login time.
    pub username: String,
    /// Role at login time.
    pub role: Role,
}

/// Issues and resolves bearer tokens.
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a token for a verified identity.
    pub async fn open(&self, identity: &Identity) -> String {
        let token = Uuid::new_v4().to_string();
        let session = Session {
            token: token.clone(),
            identity_id: identity.id,
            username: identity.username.clone(),
            role: identity.role,
        };
        self.sessions.write().await.insert(token.clone(), session);
        token
    }

    /// Look up the session behind a bearer token.
    pub async fn resolve(&self, token: &str) -> Option<Session> {
        self.sessions.read().await.get(token).cloned()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
