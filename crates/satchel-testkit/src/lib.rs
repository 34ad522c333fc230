//! # Satchel Testkit
//!
//! Testing utilities for the satchel exchange.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: a bootstrapped [`ExchangeService`](satchel::ExchangeService)
//!   over a memory store, with helpers for seeding identities and contacts
//! - **Generators**: proptest strategies for domain values
//!
//! ## Fixtures
//!
//! ```
//! use satchel_testkit::TestFixture;
//!
//! # tokio_test::block_on(async {
//! let fixture = TestFixture::new().await;
//! let alice = fixture.member("alice").await;
//! let bob = fixture.member("bob").await;
//! fixture.connect(&alice, &bob).await;
//! # });
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use satchel_testkit::generators::{media_kind, username};
//!
//! proptest! {
//!     #[test]
//!     fn kinds_have_stable_names(kind in media_kind()) {
//!         prop_assert_eq!(kind.as_str().parse::<satchel::MediaKind>().unwrap(), kind);
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{multi_identity, TestFixture, FIXTURE_CREDENTIAL};
