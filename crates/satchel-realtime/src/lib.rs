//! # Satchel Realtime
//!
//! The delivery channel: wire event types and the room registry that fans
//! events out to connected clients.
//!
//! ## Overview
//!
//! Every identity owns a logical room. A WebSocket connection joins the
//! room of whichever identity it announces, and from then on receives the
//! [`DeliveryEvent`]s pushed at that identity. Multiple connections may sit
//! in the same room; each one gets every event.
//!
//! Delivery is best-effort by design. If nobody is in the room the event is
//! dropped, and clients are expected to reconcile over the REST surface
//! when they next connect.
//!
//! ## Key Types
//!
//! - [`ClientEvent`] / [`DeliveryEvent`]: the `{event, data}` JSON frames.
//! - [`DeliveryRegistry`]: room membership plus fan-out.
//!
//! ## Usage
//!
//! ```
//! use satchel_core::IdentityId;
//! use satchel_realtime::{ContentNotice, DeliveryEvent, DeliveryRegistry};
//!
//! let registry = DeliveryRegistry::new();
//! let (connection, mut rx, tx) = registry.open();
//! registry.join(connection, IdentityId::new(1), tx);
//!
//! let delivered = registry.notify(
//!     IdentityId::new(1),
//!     DeliveryEvent::ReceiveMessage(ContentNotice {
//!         from: IdentityId::new(2),
//!         kind: satchel_core::MediaKind::Text,
//!         content: "hello".to_string(),
//!         document_id: None,
//!     }),
//! );
//! assert_eq!(delivered, 1);
//! ```

pub mod events;
pub mod registry;

pub use events::{ClientEvent, ContentNotice, DeliveryEvent, RelayRequest};
pub use registry::{ConnectionId, DeliveryRegistry};
