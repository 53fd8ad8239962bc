//! Example: refresh a stored Gmail access token
//!
//! This example demonstrates how to:
//! 1. Configure the Google token endpoint
//! 2. Rebuild a token from a stored refresh token
//! 3. Exchange the refresh grant for a fresh access token
//!
//! ## Prerequisites
//!
//! A Google Cloud OAuth client with the Gmail API enabled, already
//! authorized once so you hold a refresh token. Set:
//!
//! ```bash
//! export GMAIL_CLIENT_ID="your-client-id"
//! export GMAIL_CLIENT_SECRET="your-client-secret"
//! export GMAIL_REFRESH_TOKEN="your-refresh-token"
//! ```
//!
//! ## Running
//!
//! ```bash
//! cargo run --example gmail_refresh
//! ```

use std::env;

use mailharvest_oauth::{OAuthClient, Provider, Token};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client_id =
        env::var("GMAIL_CLIENT_ID").expect("GMAIL_CLIENT_ID environment variable not set");
    let client_secret =
        env::var("GMAIL_CLIENT_SECRET").expect("GMAIL_CLIENT_SECRET environment variable not set");
    let refresh_token =
        env::var("GMAIL_REFRESH_TOKEN").expect("GMAIL_REFRESH_TOKEN environment variable not set");

    println!("MailHarvest OAuth2 Example - Gmail Token Refresh");
    println!("================================================\n");

    // Step 1: Configure the Google provider
    println!("Step 1: Configuring Google OAuth2 provider...");
    let provider = Provider::google()?;
    println!("  Token URL: {}", provider.token_url);
    println!("  Scopes: {:?}\n", provider.default_scopes);

    // Step 2: Rebuild the stored grant
    println!("Step 2: Rebuilding stored grant...");
    let stored = Token::new("", "Bearer").with_refresh_token(refresh_token);
    println!("  Access token empty, refresh token present\n");

    // Step 3: Exchange the refresh grant
    println!("Step 3: Requesting a fresh access token...");
    let client = OAuthClient::new(client_id, provider).with_client_secret(client_secret);
    let token = client.refresh_token(&stored).await?;

    println!("  Access token: {}...", &token.access_token[..20]);
    println!("  Token type: {}", token.token_type);
    println!("  Expires at: {:?}", token.expires_at);
    println!("  Refresh token preserved: {}", token.refresh_token.is_some());

    println!("\nStore the new token securely (e.g., in a keyring) for the next run.");

    Ok(())
}
