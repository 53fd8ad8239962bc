//! `OAuth2` provider configurations.
//!
//! Only the token endpoint matters here. Authorization is expected to have
//! happened out of band, so a provider is the address a refresh grant is
//! posted to plus the scopes the stored grant was issued for.

use crate::error::Result;
use url::Url;

/// `OAuth2` provider configuration.
#[derive(Debug, Clone)]
pub struct Provider {
    /// Provider name (e.g., "Google").
    pub name: String,
    /// Token endpoint URL.
    pub token_url: Url,
    /// Default scopes.
    pub default_scopes: Vec<String>,
}

impl Provider {
    /// Creates a new provider configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the token URL is invalid.
    pub fn new(name: impl Into<String>, token_url: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            token_url: Url::parse(token_url.as_ref())?,
            default_scopes: Vec::new(),
        })
    }

    /// Sets the default scopes.
    #[must_use]
    pub fn with_default_scopes(mut self, scopes: Vec<String>) -> Self {
        self.default_scopes = scopes;
        self
    }

    /// Google `OAuth2` provider configuration.
    ///
    /// Scopes:
    /// - `https://www.googleapis.com/auth/gmail.readonly` - Read-only mailbox
    ///   access, enough for searching and fetching messages
    ///
    /// # Errors
    ///
    /// Returns an error if URL parsing fails.
    pub fn google() -> Result<Self> {
        Ok(
            Self::new("Google", "https://oauth2.googleapis.com/token")?.with_default_scopes(vec![
                "https://www.googleapis.com/auth/gmail.readonly".to_string(),
            ]),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_google_provider() {
        let provider = Provider::google().unwrap();
        assert_eq!(provider.name, "Google");
        assert_eq!(
            provider.token_url.as_str(),
            "https://oauth2.googleapis.com/token"
        );
        assert_eq!(provider.default_scopes.len(), 1);
        assert!(provider.default_scopes[0].ends_with("gmail.readonly"));
    }

    #[test]
    fn test_custom_provider() {
        let provider = Provider::new("Custom", "https://auth.example.com/token")
            .unwrap()
            .with_default_scopes(vec!["email".to_string()]);

        assert_eq!(provider.name, "Custom");
        assert_eq!(provider.default_scopes.len(), 1);
    }

    #[test]
    fn test_invalid_token_url() {
        assert!(Provider::new("Broken", "not a url").is_err());
    }
}
