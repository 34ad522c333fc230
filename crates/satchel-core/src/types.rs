//! Strong type definitions for Satchel.
//!
//! All identifiers are newtypes to prevent misuse at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Row identifier for an identity.
///
/// Allocated by the store on insert; never reused within one database.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentityId(pub i64);

impl IdentityId {
    /// Wrap a raw row id.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw row id.
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Debug for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityId({})", self.0)
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for IdentityId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Row identifier for a document.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(pub i64);

impl DocumentId {
    /// Wrap a raw row id.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw row id.
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Debug for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({})", self.0)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for DocumentId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Privilege tier of an identity.
///
/// `Admin` and `Operator` are the elevated tiers: they pass the admin gate on
/// the REST surface and are implicitly visible as contacts to every identity.
/// The single `Operator` identity is additionally immutable and undeletable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Regular participant.
    Member,
    /// Participant driven by the operator rather than a player.
    NonPlayerMember,
    /// Administrative identity.
    Admin,
    /// The bootstrap super-identity. Exactly one exists.
    Operator,
}

impl Role {
    /// Storage/wire name of the role.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "MEMBER",
            Role::NonPlayerMember => "NON_PLAYER_MEMBER",
            Role::Admin => "ADMIN",
            Role::Operator => "OPERATOR",
        }
    }

    /// Whether this role passes the admin gate and is globally visible
    /// as a contact.
    pub const fn is_elevated(&self) -> bool {
        matches!(self, Role::Admin | Role::Operator)
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MEMBER" => Ok(Role::Member),
            "NON_PLAYER_MEMBER" => Ok(Role::NonPlayerMember),
            "ADMIN" => Ok(Role::Admin),
            "OPERATOR" => Ok(Role::Operator),
            other => Err(CoreError::UnknownRole(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Media category of a stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Text,
    Image,
    Audio,
    Video,
}

impl MediaKind {
    /// Storage/wire name of the kind.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Text => "text",
            MediaKind::Image => "image",
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
        }
    }
}

impl FromStr for MediaKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(MediaKind::Text),
            "image" => Ok(MediaKind::Image),
            "audio" => Ok(MediaKind::Audio),
            "video" => Ok(MediaKind::Video),
            other => Err(CoreError::UnknownMediaKind(other.to_string())),
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable opaque token identifying one identity, exchanged out-of-band
/// (typically as a scannable code) to establish contact.
///
/// Unique per identity for its whole lifetime; resolving a token to an
/// identity is the only operation that interprets it.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShareToken(String);

impl ShareToken {
    /// Wrap an existing token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Derive the token issued to a fresh identity.
    ///
    /// The scheme is `{username}-{unix_millis}`: stable, human-traceable,
    /// and unique by table constraint.
    pub fn issue(username: &str, unix_millis: u64) -> Self {
        Self(format!("{username}-{unix_millis}"))
    }

    /// Get the token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ShareToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShareToken({})", self.0)
    }
}

impl fmt::Display for ShareToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ShareToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl AsRef<str> for ShareToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
