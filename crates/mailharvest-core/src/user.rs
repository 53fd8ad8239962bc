//! User identity newtype.
//!
//! User accounts themselves are managed by the surrounding application;
//! this crate only tags orders, ledger entries, and keyring entries with
//! the numeric id it is handed.

/// Unique identifier for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

impl UserId {
    /// Create a new user ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
