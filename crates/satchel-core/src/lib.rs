//! # Satchel Core
//!
//! Pure domain types for the Satchel content exchange: identities, documents,
//! roles, media kinds, and share tokens.
//!
//! This crate contains no I/O, no storage, no networking. The only
//! computation it performs is credential hashing.
//!
//! ## Key Types
//!
//! - [`Identity`] / [`IdentitySummary`] - an authenticated principal and its
//!   wire-facing projection
//! - [`Document`] - a persisted media artifact plus metadata
//! - [`Role`] - privilege tier; `Admin`/`Operator` are the elevated tiers
//! - [`ShareToken`] - stable opaque token exchanged out-of-band to establish
//!   contact

pub mod credential;
pub mod document;
pub mod error;
pub mod identity;
pub mod types;

pub use credential::{hash_credential, verify_credential};
pub use document::Document;
pub use error::CoreError;
pub use identity::{Identity, IdentitySummary, IdentityUpdate, NewIdentity};
pub use types::{DocumentId, IdentityId, MediaKind, Role, ShareToken};
