//! Error types for order extraction.

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Extraction error types.
///
/// Extraction is deliberately permissive: almost every field has a default,
/// so the only hard failures are a message with no usable body at all and a
/// body with no recognizable order identifier. The display text of these
/// errors is what ends up in the processing ledger's `error_message` column.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The email carried neither an HTML nor a plain-text body.
    #[error("no parseable content in email body")]
    NoContent,

    /// No vendor-format order identifier anywhere in the visible text.
    #[error("no order identifier found in email body")]
    MissingOrderId,
}
