//! Order mail synchronization.
//!
//! This module provides the sync pipeline that turns mailbox messages
//! into stored orders:
//! - Search recent mail from known order senders
//! - Extract a structured order from each message body
//! - Create or update the stored order and append a processing log entry
//! - Report per-run statistics
//!
//! # Example
//!
//! ```ignore
//! use mailharvest_core::{Repository, UserId, run_sync};
//!
//! let repository = Repository::new("mailharvest.db").await?;
//! let stats = run_sync(&repository, UserId::new(1), 30).await?;
//! println!("{stats}");
//! ```

mod service;
mod stats;

pub use service::{SyncRun, run_sync, test_extraction};
pub use stats::RunStats;
