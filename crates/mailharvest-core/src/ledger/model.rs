//! Processing ledger data models.

use crate::order::OrderId;
use crate::user::UserId;

/// Outcome recorded for one processed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStatus {
    /// Extraction and reconciliation both succeeded; an order was created
    /// or updated.
    Success,
    /// Extraction failed; no order was written.
    Failed,
}

impl ProcessingStatus {
    /// Parse from database string representation.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "success" => Self::Success,
            _ => Self::Failed,
        }
    }

    /// Convert to database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

/// One audit entry in the processing ledger.
#[derive(Debug, Clone)]
pub struct ProcessingLogEntry {
    /// Unique identifier.
    pub id: i64,
    /// User whose sync run processed the message.
    pub user_id: UserId,
    /// `Message-ID` header value, the global dedup key.
    pub email_message_id: String,
    /// Subject as stored, truncated.
    pub email_subject: Option<String>,
    /// Raw `Date` header value as stored.
    pub email_date: Option<String>,
    /// Processing outcome.
    pub processing_status: ProcessingStatus,
    /// Order the message resolved to, when processing succeeded.
    pub order_id: Option<OrderId>,
    /// Error detail for failed entries, truncated.
    pub error_message: Option<String>,
    /// Time the entry was written (RFC 3339).
    pub processed_at: String,
}

/// Payload for appending a ledger entry.
#[derive(Debug, Clone)]
pub struct NewLogEntry {
    /// User whose sync run processed the message.
    pub user_id: UserId,
    /// `Message-ID` header value. May be empty when the header was absent.
    pub email_message_id: String,
    /// Subject, already truncated by the caller.
    pub email_subject: String,
    /// Raw `Date` header value.
    pub email_date: String,
    /// Processing outcome.
    pub status: ProcessingStatus,
    /// Order the message resolved to.
    pub order_id: Option<OrderId>,
    /// Error detail, already truncated by the caller.
    pub error_message: Option<String>,
}
