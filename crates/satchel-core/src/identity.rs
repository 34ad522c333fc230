//! Identity records and their wire-facing summaries.

use serde::{Deserialize, Serialize};

use crate::types::{IdentityId, Role, ShareToken};

/// A full identity record as held by the store.
///
/// Carries the credential hash, so it is never serialized directly; the
/// wire-facing shape is [`IdentitySummary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: IdentityId,
    pub username: String,
    pub credential_hash: String,
    pub role: Role,
    pub share_token: ShareToken,
}

impl Identity {
    /// Whether this is the protected bootstrap identity.
    pub fn is_operator(&self) -> bool {
        self.role == Role::Operator
    }

    /// The wire-facing projection without the credential hash.
    pub fn summary(&self) -> IdentitySummary {
        IdentitySummary {
            id: self.id,
            username: self.username.clone(),
            role: self.role,
            share_token: self.share_token.clone(),
        }
    }
}

/// Public projection of an identity: everything except the credential hash.
///
/// The share token travels under the legacy wire name `qr_code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySummary {
    pub id: IdentityId,
    pub username: String,
    pub role: Role,
    #[serde(rename = "qr_code")]
    pub share_token: ShareToken,
}

/// Fields of an identity about to be inserted; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub username: String,
    pub credential_hash: String,
    pub role: Role,
    pub share_token: ShareToken,
}

/// Mutable fields of an identity update.
///
/// The username is immutable after creation; only the credential and the role
/// can change. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct IdentityUpdate {
    /// New plaintext credential, hashed by the service before it reaches
    /// the store.
    pub credential: Option<String>,
    pub role: Option<Role>,
}

impl IdentityUpdate {
    /// True when the update would change nothing.
    pub fn is_empty(&self) -> bool {
        self.credential.is_none() && self.role.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Identity {
        Identity {
            id: IdentityId::new(3),
            username: "mara".to_string(),
            credential_hash: "$argon2id$v=19$m=19456,t=2,p=1$abc$def".to_string(),
            role: Role::Member,
            share_token: ShareToken::new("mara-1700000000000"),
        }
    }

    #[test]
    fn test_summary_drops_credential_hash() {
        let identity = sample();
        let json = serde_json::to_value(identity.summary()).unwrap();
        assert!(json.get("credential_hash").is_none());
        assert_eq!(json["username"], "mara");
        assert_eq!(json["qr_code"], "mara-1700000000000");
    }

    #[test]
    fn test_summary_wire_shape() {
        let json = serde_json::to_value(sample().summary()).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["role"], "MEMBER");
    }

    #[test]
    fn test_operator_check() {
        let mut identity = sample();
        assert!(!identity.is_operator());
        identity.role = Role::Operator;
        assert!(identity.is_operator());
    }

    #[test]
    fn test_empty_update() {
        assert!(IdentityUpdate::default().is_empty());
        let update = IdentityUpdate {
            role: Some(Role::Admin),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
