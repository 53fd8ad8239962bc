//! Error types for the Gmail REST adapter.

/// Result type alias for adapter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Gmail REST adapter error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The access token was rejected (HTTP 401). The caller owns
    /// re-authentication; this adapter never retries.
    #[error("access token rejected by provider")]
    AuthExpired,

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the provider API.
    #[error("provider returned {status} during {context}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// What the adapter was doing.
        context: &'static str,
    },

    /// A fetched message body could not be decoded.
    ///
    /// `MessageStream` handles this internally by skipping the message, so
    /// consumers normally never see it.
    #[error("undecodable message body: {0}")]
    Decode(String),
}
