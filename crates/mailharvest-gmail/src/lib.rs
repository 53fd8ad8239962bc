//! # mailharvest-gmail
//!
//! Gmail REST adapter producing normalized email records.
//!
//! ## Features
//!
//! - **Search**: Provider query strings built from sender lists, subject
//!   keywords and a lower-bound date
//! - **Lazy fetching**: One search call up front, message content pulled on
//!   demand as the consumer iterates
//! - **MIME flattening**: Recursive part-tree walk recovering HTML and
//!   plain-text bodies, base64url decoded
//! - **Skip-not-crash decoding**: An undecodable message is logged and
//!   skipped, never fatal to the whole stream
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailharvest_gmail::{GmailClient, SearchQuery};
//!
//! let client = GmailClient::new(access_token);
//! let query = SearchQuery::new()
//!     .from_any(["orders@shop.example"])
//!     .subject_any(["order", "confirmation"]);
//!
//! let mut stream = client.search(&query, 100).await?;
//! while let Some(email) = stream.next().await {
//!     let email = email?;
//!     println!("{}: {}", email.message_id, email.subject);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod model;
mod payload;
mod query;

pub use client::{GmailClient, MessageStream};
pub use error::{Error, Result};
pub use model::NormalizedEmail;
pub use query::SearchQuery;
