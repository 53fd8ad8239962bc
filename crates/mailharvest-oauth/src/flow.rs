//! Token refresh against a provider's token endpoint.

use std::collections::HashMap;

use reqwest::Client;

use crate::error::Result;
use crate::provider::Provider;
use crate::token::{ErrorResponse, Token, TokenResponse};

/// `OAuth2` client for a single provider.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    /// Client ID from provider.
    pub client_id: String,
    /// Client secret (optional for public clients).
    pub client_secret: Option<String>,
    /// Provider configuration.
    pub provider: Provider,
    /// HTTP client.
    http_client: Client,
}

impl OAuthClient {
    /// Creates a new OAuth client.
    #[must_use]
    pub fn new(client_id: impl Into<String>, provider: Provider) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            provider,
            http_client: Client::new(),
        }
    }

    /// Sets the client secret.
    #[must_use]
    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Refreshes an access token using its refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token has no refresh token, if the request
    /// fails, or if the server rejects the grant.
    pub async fn refresh_token(&self, token: &Token) -> Result<Token> {
        let refresh_token = token.refresh_token()?;

        let mut params = HashMap::new();
        params.insert("grant_type", "refresh_token");
        params.insert("refresh_token", refresh_token);
        params.insert("client_id", &self.client_id);

        if let Some(secret) = &self.client_secret {
            params.insert("client_secret", secret);
        }

        let response = self
            .http_client
            .post(self.provider.token_url.clone())
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let error: ErrorResponse = response.json().await?;
            return Err(error.into_error());
        }

        let token_response: TokenResponse = response.json().await?;
        Ok(with_preserved_refresh_token(
            Token::from_response(token_response),
            token,
        ))
    }
}

/// Providers may omit the refresh token from a refresh grant's response; the
/// previously issued one stays valid and is carried over.
fn with_preserved_refresh_token(mut refreshed: Token, previous: &Token) -> Token {
    if refreshed.refresh_token.is_none() {
        refreshed.refresh_token.clone_from(&previous.refresh_token);
    }
    refreshed
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_oauth_client_creation() {
        let provider = Provider::google().unwrap();
        let client = OAuthClient::new("test_client_id", provider);
        assert_eq!(client.client_id, "test_client_id");
        assert!(client.client_secret.is_none());
    }

    #[test]
    fn test_oauth_client_with_secret() {
        let provider = Provider::google().unwrap();
        let client = OAuthClient::new("test_client_id", provider).with_client_secret("secret");
        assert_eq!(client.client_secret.as_deref(), Some("secret"));
    }

    #[test]
    fn test_refresh_preserves_previous_refresh_token() {
        let previous = Token::new("old_access", "Bearer").with_refresh_token("refresh456");
        let refreshed =
            with_preserved_refresh_token(Token::new("new_access", "Bearer"), &previous);
        assert_eq!(refreshed.refresh_token.as_deref(), Some("refresh456"));
    }

    #[test]
    fn test_refresh_keeps_newly_issued_refresh_token() {
        let previous = Token::new("old_access", "Bearer").with_refresh_token("refresh456");
        let rotated = Token::new("new_access", "Bearer").with_refresh_token("refresh789");
        let refreshed = with_preserved_refresh_token(rotated, &previous);
        assert_eq!(refreshed.refresh_token.as_deref(), Some("refresh789"));
    }
}
