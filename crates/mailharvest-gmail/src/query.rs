//! Provider search query construction.

use chrono::NaiveDate;

/// Builder for the provider's mailbox search string.
///
/// Produces clauses of the form `from:(a OR b)`, `subject:(x OR y)` and
/// `after:YYYY/MM/DD`, joined with spaces. Empty clause groups are omitted.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    senders: Vec<String>,
    subjects: Vec<String>,
    after: Option<NaiveDate>,
}

impl SearchQuery {
    /// Creates an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts matches to messages from any of the given addresses.
    #[must_use]
    pub fn from_any<I, S>(mut self, senders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.senders.extend(senders.into_iter().map(Into::into));
        self
    }

    /// Restricts matches to subjects containing any of the given keywords.
    #[must_use]
    pub fn subject_any<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subjects.extend(keywords.into_iter().map(Into::into));
        self
    }

    /// Restricts matches to messages received after the given date.
    #[must_use]
    pub const fn after(mut self, date: NaiveDate) -> Self {
        self.after = Some(date);
        self
    }

    /// Renders the provider query string.
    #[must_use]
    pub fn build(&self) -> String {
        let mut clauses = Vec::new();

        if !self.senders.is_empty() {
            clauses.push(format!("from:({})", self.senders.join(" OR ")));
        }
        if !self.subjects.is_empty() {
            clauses.push(format!("subject:({})", self.subjects.join(" OR ")));
        }
        if let Some(date) = self.after {
            clauses.push(format!("after:{}", date.format("%Y/%m/%d")));
        }

        clauses.join(" ")
    }
}
