//! Normalized message representation.

/// One fetched mailbox message, flattened for downstream consumption.
///
/// Constructed per message and consumed immediately; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedEmail {
    /// Opaque provider message id.
    pub id: String,
    /// `Message-ID` header value, empty string when the header is absent.
    /// This is the global dedup key, not the provider id.
    pub message_id: String,
    /// `Subject` header value, empty string when absent.
    pub subject: String,
    /// `From` header value, empty string when absent.
    pub sender: String,
    /// Raw `Date` header value, empty string when absent.
    pub date: String,
    /// Decoded HTML body, if the payload has one.
    pub body_html: Option<String>,
    /// Decoded plain-text body, if the payload has one.
    pub body_text: Option<String>,
}

impl NormalizedEmail {
    /// Returns true when neither body was present in the payload.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.body_html.is_none() && self.body_text.is_none()
    }
}
