//! Order store - durable orders and line items keyed by vendor order number.
//!
//! The vendor order number is the natural key: at most one stored order
//! exists per number regardless of how many emails reference it. The first
//! email to mention a number creates the record; later emails may only move
//! its shipment status forward. Financial fields and line items are never
//! rewritten.
//!
//! # Example
//!
//! ```ignore
//! use mailharvest_core::{Repository, order};
//!
//! let mut tx = repository.begin().await?;
//!
//! match order::find_by_number(&mut tx, "123-4567890-1234567").await? {
//!     None => {
//!         // First sighting - create the order with its items
//!     }
//!     Some(existing) => {
//!         // Already stored - only the shipment status may change
//!     }
//! }
//! ```

mod model;
mod repository;

pub use model::{NewOrder, Order, OrderId, OrderItem};
pub use repository::{create, find_by_number, items, update_shipment_status};
