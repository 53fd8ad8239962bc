//! # mailharvest-extract
//!
//! Heuristic extraction of structured retail orders from confirmation emails.
//!
//! ## Features
//!
//! - **Order parsing**: Pull order number, date, total and status out of
//!   HTML or plain-text bodies
//! - **Line items**: Three-stage item extraction (product tables, priced
//!   text blocks, context windows around priced lines)
//! - **Markup scanner**: Small single-pass HTML flattener, no DOM
//! - **Permissive defaults**: Only the order identifier is mandatory
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailharvest_extract::parse;
//!
//! let html = "<p>Order #123-4567890-1234567</p>\
//!             <p>Order Date: March 3, 2025</p>\
//!             <p>Order Total: $39.98</p>";
//!
//! let order = parse(Some(html), None)?;
//! println!("{} for {} {}", order.order_id, order.total_amount, order.currency);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
mod markup;
mod model;
mod parser;
mod patterns;
mod strategy;

pub use error::{Error, Result};
pub use model::{DEFAULT_CURRENCY, ParsedOrder, ParsedOrderItem, ShipmentStatus};
pub use parser::parse;
