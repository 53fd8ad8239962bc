//! Secure credential storage using system keyring.
//!
//! Each user's mailbox credentials (`OAuth2` client id, optional secret,
//! and current token pair) are stored as one JSON blob in the platform's
//! native credential storage:
//! - Linux: Secret Service (GNOME Keyring, `KWallet`)
//! - macOS: Keychain
//! - Windows: Credential Manager
//!
//! The one-time interactive authorization that produces the initial
//! credentials happens outside this crate; from here on only refresh
//! grants are issued.

use keyring::Entry;
use mailharvest_oauth::{OAuthClient, Provider, Token};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::user::UserId;

/// Service name used for keyring entries.
const SERVICE_NAME: &str = "mailharvest";

/// Credential type identifier for mailbox `OAuth2` credentials.
const OAUTH_CREDENTIAL: &str = "oauth";

/// Error type for credential operations.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Failed to access keyring.
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    /// Stored credential blob failed to serialize or deserialize.
    #[error("Credential serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// No credentials stored for the user.
    #[error("No stored credentials for user {0}")]
    NotFound(i64),
}

/// Result type for credential operations.
pub type CredentialResult<T> = std::result::Result<T, CredentialError>;

/// Everything needed to mint fresh access tokens for one user's mailbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredentials {
    /// `OAuth2` client id issued by the provider console.
    pub client_id: String,
    /// Client secret, absent for public clients.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    /// Current token pair.
    pub token: Token,
}

impl StoredCredentials {
    /// Whether the stored access token can still be presented to the
    /// provider (present, and not within 60 seconds of expiry).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.token.access_token.is_empty() && self.token.is_valid()
    }

    /// Refresh the access token against Google's token endpoint.
    ///
    /// The refreshed token replaces the stored one in place; persisting it
    /// back to the keyring is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns an error if the token has no refresh token or the provider
    /// rejects the grant.
    pub async fn refresh(&mut self) -> crate::Result<()> {
        let mut client = OAuthClient::new(self.client_id.clone(), Provider::google()?);
        if let Some(secret) = &self.client_secret {
            client = client.with_client_secret(secret.clone());
        }

        self.token = client.refresh_token(&self.token).await?;
        Ok(())
    }
}

/// Generates the keyring entry key for a user's credentials.
fn credential_key(user_id: UserId) -> String {
    format!("{SERVICE_NAME}_{OAUTH_CREDENTIAL}_{}", user_id.0)
}

/// Stores mailbox credentials securely in the system keyring.
///
/// # Errors
///
/// Returns an error if serialization or the keyring operation fails.
pub fn store_credentials(user_id: UserId, credentials: &StoredCredentials) -> CredentialResult<()> {
    let json = serde_json::to_string(credentials)?;

    let key = credential_key(user_id);
    let entry = Entry::new(SERVICE_NAME, &key)?;
    entry.set_password(&json)?;
    debug!("Stored mailbox credentials for user {}", user_id.0);
    Ok(())
}

/// Retrieves mailbox credentials from the system keyring.
///
/// # Errors
///
/// Returns an error if the keyring operation or deserialization fails.
pub fn get_credentials(user_id: UserId) -> CredentialResult<Option<StoredCredentials>> {
    let key = credential_key(user_id);
    let entry = Entry::new(SERVICE_NAME, &key)?;
    match entry.get_password() {
        Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
        Err(keyring::Error::NoEntry) => {
            debug!("No mailbox credentials found for user {}", user_id.0);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Deletes mailbox credentials for a user from the keyring.
///
/// # Errors
///
/// Returns an error if the keyring operation fails (except for missing entries).
pub fn delete_credentials(user_id: UserId) -> CredentialResult<()> {
    let key = credential_key(user_id);
    let entry = Entry::new(SERVICE_NAME, &key)?;
    match entry.delete_credential() {
        Ok(()) => {
            debug!("Deleted mailbox credentials for user {}", user_id.0);
            Ok(())
        }
        Err(keyring::Error::NoEntry) => {
            debug!("No mailbox credentials to delete for user {}", user_id.0);
            Ok(())
        }
        Err(e) => {
            warn!("Failed to delete mailbox credentials: {e}");
            Err(e.into())
        }
    }
}

/// Load a user's credentials and guarantee a usable access token.
///
/// An expired token is refreshed and the refreshed credentials are written
/// back to the keyring before being returned.
///
/// # Errors
///
/// Returns an error if no credentials are stored for the user, or if the
/// refresh grant or keyring write-back fails.
pub async fn ensure_session(user_id: UserId) -> crate::Result<StoredCredentials> {
    let mut credentials = get_credentials(user_id)?.ok_or(CredentialError::NotFound(user_id.0))?;

    if !credentials.is_valid() {
        debug!("Access token for user {} expired, refreshing", user_id.0);
        credentials.refresh().await?;
        store_credentials(user_id, &credentials)?;
    }

    Ok(credentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    // Note: The keyring tests interact with the actual system keyring.
    // They are marked as ignored by default to avoid polluting the keyring
    // during automated testing. Run manually with `cargo test -- --ignored`

    use super::*;
    use chrono::{Duration, Utc};

    fn sample_credentials(access_token: &str) -> StoredCredentials {
        StoredCredentials {
            client_id: "client-id.apps.googleusercontent.com".to_string(),
            client_secret: Some("client-secret".to_string()),
            token: Token::new(access_token, "Bearer").with_refresh_token("refresh-token"),
        }
    }

    #[test]
    fn test_valid_token_reports_valid() {
        let credentials = sample_credentials("access123");
        assert!(credentials.is_valid());
    }

    #[test]
    fn test_expired_token_reports_invalid() {
        let mut credentials = sample_credentials("access123");
        credentials.token = credentials
            .token
            .with_expires_at(Utc::now() - Duration::seconds(10));
        assert!(!credentials.is_valid());
    }

    #[test]
    fn test_empty_access_token_reports_invalid() {
        let credentials = sample_credentials("");
        assert!(!credentials.is_valid());
    }

    #[test]
    #[ignore = "Interacts with system keyring"]
    fn test_store_and_retrieve_credentials() {
        let user_id = UserId::new(99999); // Use high ID to avoid conflicts
        let credentials = sample_credentials("access123");

        store_credentials(user_id, &credentials).unwrap();

        let retrieved = get_credentials(user_id).unwrap().unwrap();
        assert_eq!(retrieved.client_id, credentials.client_id);
        assert_eq!(retrieved.token.access_token, "access123");
        assert_eq!(retrieved.token.refresh_token.as_deref(), Some("refresh-token"));

        delete_credentials(user_id).unwrap();
    }

    #[test]
    #[ignore = "Interacts with system keyring"]
    fn test_missing_credentials_return_none() {
        let user_id = UserId::new(99998);
        assert!(get_credentials(user_id).unwrap().is_none());
    }

    #[test]
    #[ignore = "Interacts with system keyring"]
    fn test_delete_missing_credentials_is_tolerated() {
        let user_id = UserId::new(99997);
        delete_credentials(user_id).unwrap();
    }
}
