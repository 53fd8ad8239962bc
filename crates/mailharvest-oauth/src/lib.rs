//! # mailharvest-oauth
//!
//! `OAuth2` token management for mailbox polling.
//!
//! ## Features
//!
//! - **Token management**: Expiration checking with a safety buffer,
//!   serializable for persistence between runs
//! - **Token refresh**: Refresh-grant exchange against any provider's token
//!   endpoint, preserving the refresh token across rotations
//! - **Provider configurations**: Pre-configured for Gmail read-only access
//!
//! Interactive authorization is out of scope. This crate assumes a grant
//! already exists (client ID, client secret, refresh token) and keeps the
//! short-lived access token fresh.
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailharvest_oauth::{OAuthClient, Provider, Token};
//!
//! let provider = Provider::google()?;
//! let client = OAuthClient::new("client_id", provider).with_client_secret("secret");
//!
//! let stored = Token::new("stale_access", "Bearer").with_refresh_token("refresh");
//! if stored.is_expired() {
//!     let fresh = client.refresh_token(&stored).await?;
//!     println!("new token expires at {:?}", fresh.expires_at);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
pub mod flow;
pub mod provider;
pub mod token;

pub use error::{Error, Result};
pub use flow::OAuthClient;
pub use provider::Provider;
pub use token::Token;
