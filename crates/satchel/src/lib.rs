//! # Satchel
//!
//! The unified API for the Satchel system - access-controlled content
//! exchange between identities, with real-time delivery.
//!
//! ## Overview
//!
//! The Exchange Service composes four primitives:
//!
//! - **Identities**: accounts with roles, credentials and a share token
//! - **Contacts**: symmetric relationship edges established by token
//! - **Documents**: immutable content records owned by one identity
//! - **Grants**: per-user read access to documents
//!
//! and pushes **delivery events** to connected clients when content or
//! contacts arrive.
//!
//! ## Key Concepts
//!
//! - **Share token**: opaque string exchanged out-of-band; resolving it is
//!   the only way to establish contact.
//! - **Self-grant**: creating a document always grants its owner access,
//!   in the same transaction.
//! - **Elevated visibility**: Admin and Operator identities are visible to
//!   everyone without a stored edge.
//! - **Operator**: the seeded bootstrap identity; immutable and undeletable.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use satchel::{ExchangeService, ServiceConfig};
//! use satchel::core::{MediaKind, Role};
//! use satchel::store::SqliteStore;
//!
//! async fn example() {
//!     let store = SqliteStore::open("satchel.db").unwrap();
//!     let service = ExchangeService::new(store, ServiceConfig::default());
//!
//!     // Seed the Operator on first run
//!     service.bootstrap().await.unwrap();
//!
//!     // Create two identities and connect them
//!     let a = service
//!         .create_identity("wedge", "red-two", Role::Member)
//!         .await
//!         .unwrap();
//!     let b = service
//!         .create_identity("hobbie", "red-four", Role::Member)
//!         .await
//!         .unwrap();
//!     service.connect_by_token(a.id, &b.share_token).await.unwrap();
//!
//!     // a sends b a document; b is granted access and notified
//!     service
//!         .submit(a.id, MediaKind::Text, "note.txt", Some(b.id))
//!         .await
//!         .unwrap();
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `satchel::core` - Core types (Identity, Document, Role, etc.)
//! - `satchel::store` - Storage abstraction, SQLite and in-memory backends
//! - `satchel::realtime` - Delivery channel events and room registry

pub mod error;
pub mod service;

// Re-export component crates
pub use satchel_core as core;
pub use satchel_realtime as realtime;
pub use satchel_store as store;

// Re-export main types for convenience
pub use error::{Result, ServiceError};
pub use service::{ExchangeService, ServiceConfig};

// Re-export commonly used core types
pub use satchel_core::{
    Document, DocumentId, Identity, IdentityId, IdentitySummary, IdentityUpdate, MediaKind,
    Role, ShareToken,
};
