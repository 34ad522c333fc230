//! # Satchel Store
//!
//! Storage layer for the Satchel content exchange. Defines the [`Store`]
//! trait and ships two backends with identical semantics.
//!
//! ## Overview
//!
//! The store persists four kinds of rows:
//!
//! - **Identities**: accounts with a unique username, a credential hash,
//!   a role and a share token.
//! - **Contacts**: directed follow edges, always written in symmetric pairs.
//! - **Documents**: content records pointing at a storage ref on disk.
//! - **Grants**: read access from an identity to a document.
//!
//! ## Backends
//!
//! - [`SqliteStore`]: rusqlite with WAL journaling, async via
//!   `spawn_blocking`. The production backend.
//! - [`MemoryStore`]: hash maps behind an `RwLock`. For tests and
//!   ephemeral runs.
//!
//! ## Usage
//!
//! ```no_run
//! use satchel_store::{SqliteStore, Store};
//!
//! # async fn demo() -> satchel_store::Result<()> {
//! let store = SqliteStore::open("satchel.db")?;
//! let everyone = store.list_identities().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Design Notes
//!
//! Relation inserts (contacts, grants) are idempotent and report whether
//! anything new was written. Composite writes (the contact pair, the
//! document plus its owner self-grant) are atomic. Contact visibility is
//! a derived view: explicit edges unioned with every elevated identity.

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use migration::CURRENT_VERSION;
pub use sqlite::SqliteStore;
pub use traits::{InsertOutcome, Store};
