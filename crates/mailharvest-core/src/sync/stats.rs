//! Counters accumulated over one sync run.

use std::fmt;

/// How many errors [`RunStats`] prints before eliding the rest.
const DISPLAYED_ERRORS: usize = 5;

/// Outcome summary of a single sync run.
///
/// Counters cover every message the mailbox search yielded, including
/// duplicates. A message that failed extraction or reconciliation shows up
/// in `errors` and in no other counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Messages yielded by the mailbox search, duplicates included.
    pub emails_processed: u32,
    /// Orders inserted for the first time.
    pub orders_created: u32,
    /// Messages matched to an already stored order.
    pub orders_updated: u32,
    /// Messages skipped because their id was already in the processing log.
    pub orders_skipped: u32,
    /// Per-message failure descriptions, in processing order.
    pub errors: Vec<String>,
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed {} emails: {} created, {} updated, {} skipped",
            self.emails_processed, self.orders_created, self.orders_updated, self.orders_skipped
        )?;

        if !self.errors.is_empty() {
            write!(f, ", {} errors", self.errors.len())?;
            for error in self.errors.iter().take(DISPLAYED_ERRORS) {
                write!(f, "\n  - {error}")?;
            }
            if self.errors.len() > DISPLAYED_ERRORS {
                write!(f, "\n  ... and {} more", self.errors.len() - DISPLAYED_ERRORS)?;
            }
        }

        Ok(())
    }
}
