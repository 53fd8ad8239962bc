//! Processing ledger - append-only audit log doubling as the dedup key set.
//!
//! Every non-duplicate message a sync run sees gets exactly one entry,
//! success or failure, written in the same savepoint as the order it
//! produced. The `UNIQUE` constraint on the message id is what makes
//! re-running a mailbox over the same messages idempotent: a message found
//! here is skipped without re-extraction.
//!
//! Entries are never updated or deleted.

mod model;
mod repository;

pub use model::{NewLogEntry, ProcessingLogEntry, ProcessingStatus};
pub use repository::{append, find_by_message_id, is_processed};
