//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Token refresh failed.
    #[error("Auth error: {0}")]
    Auth(#[from] mailharvest_oauth::Error),

    /// Mailbox search or fetch failed.
    #[error("Fetch error: {0}")]
    Fetch(#[from] mailharvest_gmail::Error),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Credential storage error.
    #[error("Credential error: {0}")]
    Credential(#[from] crate::credentials::CredentialError),

    /// Database schema was written by a newer build.
    #[error("Database schema version {found} is newer than supported version {supported}")]
    Schema {
        /// Version stamped in the database.
        found: i64,
        /// Newest version this build understands.
        supported: i64,
    },
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
