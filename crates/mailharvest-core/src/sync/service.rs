//! Mailbox-to-store sync orchestration.
//!
//! One sync run is one database transaction, with a savepoint per message
//! so a bad message rolls back alone while the rest of the run commits
//! together. Message ids already present in the processing log are skipped
//! before extraction runs. An extraction failure is recorded in the log
//! without touching the order store. A mailbox fetch failure aborts the
//! whole run.

use chrono::{Duration, Utc};
use mailharvest_extract::ParsedOrder;
use mailharvest_gmail::{GmailClient, NormalizedEmail, SearchQuery};
use sqlx::{Acquire, Sqlite, Transaction};
use tracing::{debug, info, warn};

use super::stats::RunStats;
use crate::Result;
use crate::credentials::ensure_session;
use crate::ledger::{self, NewLogEntry, ProcessingStatus};
use crate::order::{self, NewOrder, OrderId};
use crate::repository::Repository;
use crate::user::UserId;

/// Senders whose messages are considered order mail.
const ORDER_SENDERS: [&str; 3] = [
    "auto-confirm@amazon.com",
    "ship-confirm@amazon.com",
    "order-update@amazon.com",
];

/// Subject keywords order mail is expected to carry.
const SUBJECT_KEYWORDS: [&str; 3] = ["order", "shipped", "confirmation"];

/// Messages fetched per run, at most.
const MAX_RESULTS: u32 = 100;

/// Stored subjects are capped at this many characters.
const MAX_SUBJECT_LEN: usize = 500;

/// Stored failure descriptions are capped at this many characters.
const MAX_ERROR_LEN: usize = 1000;

/// Stored raw HTML bodies are capped at this many characters.
const MAX_RAW_HTML_LEN: usize = 5000;

/// Source tag recorded on orders created from mailbox messages.
const SOURCE_EMAIL: &str = "email";

/// Fetch recent order mail for one user and reconcile it into the store.
///
/// Loads the user's stored credentials (refreshing the access token if it
/// has expired), searches the mailbox for order mail newer than `days_back`
/// days, and processes every message through [`SyncRun`].
///
/// # Errors
///
/// Returns an error when no credentials are stored for the user, when the
/// token refresh or the mailbox fetch fails, or when the store rejects an
/// operation outside a message savepoint. In every error case the whole
/// run is rolled back.
pub async fn run_sync(repository: &Repository, user_id: UserId, days_back: u32) -> Result<RunStats> {
    let credentials = ensure_session(user_id).await?;
    let client = GmailClient::new(credentials.token.access_token);

    let after = (Utc::now() - Duration::days(i64::from(days_back))).date_naive();
    let query = SearchQuery::new()
        .from_any(ORDER_SENDERS)
        .subject_any(SUBJECT_KEYWORDS)
        .after(after);

    info!("Starting sync for user {} ({days_back} days back)", user_id.0);
    let mut stream = client.search(&query, MAX_RESULTS).await?;

    let mut run = SyncRun::begin(repository, user_id).await?;
    while let Some(message) = stream.next().await {
        match message {
            Ok(email) => run.process(&email).await?,
            Err(err) => {
                run.abort().await;
                return Err(err.into());
            }
        }
    }

    let stats = run.finish().await?;
    info!("Sync complete for user {}: {stats}", user_id.0);
    Ok(stats)
}

/// One in-flight sync run over a single database transaction.
///
/// Dropping a run without calling [`SyncRun::finish`] rolls everything
/// back, orders and processing log entries alike.
pub struct SyncRun {
    tx: Transaction<'static, Sqlite>,
    user_id: UserId,
    stats: RunStats,
}

impl SyncRun {
    /// Open the run transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection cannot be acquired.
    pub async fn begin(repository: &Repository, user_id: UserId) -> Result<Self> {
        Ok(Self {
            tx: repository.begin().await?,
            user_id,
            stats: RunStats::default(),
        })
    }

    /// Process one fetched message.
    ///
    /// Messages whose id was already recorded are skipped. Extraction and
    /// reconciliation failures are absorbed into the run statistics; they
    /// never fail the run itself.
    ///
    /// # Errors
    ///
    /// Returns an error only when the store fails outside a message
    /// savepoint, which leaves the run unusable.
    pub async fn process(&mut self, email: &NormalizedEmail) -> Result<()> {
        self.stats.emails_processed += 1;

        if ledger::is_processed(&mut self.tx, &email.message_id).await? {
            debug!("Skipping already processed message {}", email.id);
            self.stats.orders_skipped += 1;
            return Ok(());
        }

        match mailharvest_extract::parse(email.body_html.as_deref(), email.body_text.as_deref()) {
            Ok(parsed) => self.reconcile(email, &parsed).await,
            Err(err) => self.record_extraction_failure(email, &err).await,
        }
    }

    /// Reconcile one extracted order inside its own savepoint.
    async fn reconcile(&mut self, email: &NormalizedEmail, parsed: &ParsedOrder) -> Result<()> {
        let mut savepoint = self.tx.begin().await?;
        match reconcile_order(&mut savepoint, self.user_id, email, parsed).await {
            Ok(outcome) => {
                savepoint.commit().await?;
                match outcome {
                    Reconciliation::Created => self.stats.orders_created += 1,
                    Reconciliation::Updated => self.stats.orders_updated += 1,
                }
            }
            Err(err) => {
                savepoint.rollback().await?;
                warn!("Failed to store order from message {}: {err}", email.id);
                self.stats.errors.push(format!("message {}: {err}", email.id));
            }
        }
        Ok(())
    }

    /// Record a message the extractor could not make an order out of.
    async fn record_extraction_failure(
        &mut self,
        email: &NormalizedEmail,
        err: &mailharvest_extract::Error,
    ) -> Result<()> {
        warn!("Failed to extract order from message {}: {err}", email.id);
        self.stats.errors.push(format!("message {}: {err}", email.id));

        let entry = log_entry(
            self.user_id,
            email,
            ProcessingStatus::Failed,
            None,
            Some(err.to_string()),
        );
        let mut savepoint = self.tx.begin().await?;
        match ledger::append(&mut savepoint, entry).await {
            Ok(_) => savepoint.commit().await?,
            Err(append_err) => {
                savepoint.rollback().await?;
                self.stats
                    .errors
                    .push(format!("message {}: {append_err}", email.id));
            }
        }
        Ok(())
    }

    /// Commit the run and hand back its statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails; nothing from the run is
    /// persisted in that case.
    pub async fn finish(self) -> Result<RunStats> {
        self.tx.commit().await?;
        Ok(self.stats)
    }

    /// Roll the run back, discarding every order and log entry it wrote.
    pub async fn abort(self) {
        if let Err(err) = self.tx.rollback().await {
            warn!("Rollback failed while aborting sync run: {err}");
        }
    }
}

/// What [`reconcile_order`] did with a message.
enum Reconciliation {
    Created,
    Updated,
}

/// Match an extracted order against the store.
///
/// The order number is the natural key. The first message for a number
/// creates the order; later messages only move its shipment status forward
/// and never rewrite amounts, dates, or items.
async fn reconcile_order(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: UserId,
    email: &NormalizedEmail,
    parsed: &ParsedOrder,
) -> Result<Reconciliation> {
    if let Some(existing) = order::find_by_number(tx, &parsed.order_id).await? {
        if let Some(status) = parsed.shipment_status
            && existing.shipment_status != Some(status)
        {
            debug!(
                "Moving order {} shipment status to {status}",
                existing.order_number
            );
            order::update_shipment_status(tx, existing.id, status).await?;
        }

        let entry = log_entry(user_id, email, ProcessingStatus::Success, Some(existing.id), None);
        ledger::append(tx, entry).await?;
        Ok(Reconciliation::Updated)
    } else {
        let created = order::create(tx, new_order(user_id, email, parsed), &parsed.items).await?;
        info!(
            "Created order {} with {} items",
            created.order_number,
            parsed.items.len()
        );

        let entry = log_entry(user_id, email, ProcessingStatus::Success, Some(created.id), None);
        ledger::append(tx, entry).await?;
        Ok(Reconciliation::Created)
    }
}

fn new_order(user_id: UserId, email: &NormalizedEmail, parsed: &ParsedOrder) -> NewOrder {
    NewOrder {
        user_id,
        order_number: parsed.order_id.clone(),
        order_date: parsed.order_date,
        total_amount: parsed.total_amount,
        currency: parsed.currency.clone(),
        shipment_status: parsed.shipment_status.unwrap_or_default(),
        source_type: SOURCE_EMAIL.to_string(),
        email_message_id: Some(email.message_id.clone()),
        raw_email_html: email
            .body_html
            .as_deref()
            .map(|html| truncate(html, MAX_RAW_HTML_LEN)),
    }
}

fn log_entry(
    user_id: UserId,
    email: &NormalizedEmail,
    status: ProcessingStatus,
    order_id: Option<OrderId>,
    error: Option<String>,
) -> NewLogEntry {
    NewLogEntry {
        user_id,
        email_message_id: email.message_id.clone(),
        email_subject: truncate(&email.subject, MAX_SUBJECT_LEN),
        email_date: email.date.clone(),
        status,
        order_id,
        error_message: error.map(|e| truncate(&e, MAX_ERROR_LEN)),
    }
}

/// Cap oversized header and body text before it is stored.
fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Run order extraction over a raw HTML body without touching the mailbox
/// or the store.
///
/// Intended for checking what the extractor makes of a particular vendor
/// template before letting a real run loose on it.
///
/// # Errors
///
/// Returns the extraction error unchanged when no order can be parsed.
pub fn test_extraction(raw_html: &str) -> mailharvest_extract::Result<ParsedOrder> {
    mailharvest_extract::parse(Some(raw_html), None)
}
