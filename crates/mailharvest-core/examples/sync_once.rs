//! Example: run one mailbox sync
//!
//! This example demonstrates how to:
//! 1. Open the order store
//! 2. Sync recent order mail for one user
//! 3. Print the run statistics
//!
//! ## Prerequisites
//!
//! Mailbox credentials for the user stored in the system keyring (client
//! id plus token pair from a one-time interactive authorization).
//!
//! ## Running
//!
//! ```bash
//! cargo run --package mailharvest-core --example sync_once -- [user_id] [days_back] [database]
//! ```

use std::env;

use mailharvest_core::{Repository, UserId, run_sync};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailharvest_core=debug,mailharvest_gmail=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = env::args().skip(1);
    let user_id = args.next().and_then(|arg| arg.parse().ok()).unwrap_or(1);
    let days_back = args.next().and_then(|arg| arg.parse().ok()).unwrap_or(30);
    let database = args.next().unwrap_or_else(|| "mailharvest.db".to_string());

    println!("MailHarvest - One-Shot Mailbox Sync");
    println!("===================================\n");
    println!("Syncing user {user_id}, looking back {days_back} days into {database}\n");

    let repository = Repository::new(&database).await?;
    let stats = run_sync(&repository, UserId::new(user_id), days_back).await?;

    println!("\n{stats}");
    Ok(())
}
