//! # mailharvest-core
//!
//! Core sync and persistence layer for MailHarvest.
//!
//! This crate provides:
//! - Sync runs that reconcile extracted order mail into the store
//! - An order store keyed by vendor order number
//! - A processing log that makes message handling idempotent
//! - Secure per-user credential storage backed by the system keyring

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod credentials;
mod error;
pub mod ledger;
pub mod order;
mod repository;
pub mod sync;
mod user;

pub use credentials::{CredentialError, CredentialResult, StoredCredentials};
pub use error::{Error, Result};
pub use ledger::{NewLogEntry, ProcessingLogEntry, ProcessingStatus};
pub use order::{NewOrder, Order, OrderId, OrderItem};
pub use repository::Repository;
pub use sync::{RunStats, SyncRun, run_sync, test_extraction};
pub use user::UserId;
