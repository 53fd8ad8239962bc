//! Processing ledger persistence.

use chrono::Utc;
use sqlx::{Row, Sqlite, Transaction};

use super::model::{NewLogEntry, ProcessingLogEntry, ProcessingStatus};
use crate::Result;
use crate::order::OrderId;
use crate::user::UserId;

/// Check whether a message id already has a ledger entry.
///
/// The check is global, not per-user: the `Message-ID` header is
/// provider-assigned and unique across mailboxes.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn is_processed(
    tx: &mut Transaction<'_, Sqlite>,
    email_message_id: &str,
) -> Result<bool> {
    Ok(find_by_message_id(tx, email_message_id).await?.is_some())
}

/// Look up the ledger entry for a message id.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn find_by_message_id(
    tx: &mut Transaction<'_, Sqlite>,
    email_message_id: &str,
) -> Result<Option<ProcessingLogEntry>> {
    let row = sqlx::query(
        r"
        SELECT id, user_id, email_message_id, email_subject, email_date,
               processing_status, order_id, error_message, processed_at
        FROM processing_log
        WHERE email_message_id = ?
        ",
    )
    .bind(email_message_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(row.map(|r| row_to_entry(&r)))
}

/// Append one audit entry.
///
/// # Errors
///
/// Returns an error if the database operation fails, including when an
/// entry for the message id already exists.
pub async fn append(
    tx: &mut Transaction<'_, Sqlite>,
    entry: NewLogEntry,
) -> Result<ProcessingLogEntry> {
    let processed_at = Utc::now().to_rfc3339();

    let result = sqlx::query(
        r"
        INSERT INTO processing_log (user_id, email_message_id, email_subject, email_date,
                                    processing_status, order_id, error_message, processed_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ",
    )
    .bind(entry.user_id.0)
    .bind(&entry.email_message_id)
    .bind(&entry.email_subject)
    .bind(&entry.email_date)
    .bind(entry.status.as_str())
    .bind(entry.order_id.map(|id| id.0))
    .bind(entry.error_message.as_deref())
    .bind(&processed_at)
    .execute(&mut **tx)
    .await?;

    Ok(ProcessingLogEntry {
        id: result.last_insert_rowid(),
        user_id: entry.user_id,
        email_message_id: entry.email_message_id,
        email_subject: Some(entry.email_subject),
        email_date: Some(entry.email_date),
        processing_status: entry.status,
        order_id: entry.order_id,
        error_message: entry.error_message,
        processed_at,
    })
}

/// Convert a database row to a `ProcessingLogEntry`.
fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> ProcessingLogEntry {
    ProcessingLogEntry {
        id: row.get("id"),
        user_id: UserId::new(row.get("user_id")),
        email_message_id: row.get("email_message_id"),
        email_subject: row.get("email_subject"),
        email_date: row.get("email_date"),
        processing_status: ProcessingStatus::parse(row.get("processing_status")),
        order_id: row.get::<Option<i64>, _>("order_id").map(OrderId::new),
        error_message: row.get("error_message"),
        processed_at: row.get("processed_at"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Repository;

    fn sample_entry(message_id: &str, status: ProcessingStatus) -> NewLogEntry {
        NewLogEntry {
            user_id: UserId::new(1),
            email_message_id: message_id.to_string(),
            email_subject: "Your order has been received".to_string(),
            email_date: "Mon, 3 Mar 2025 10:00:00 +0000".to_string(),
            status,
            order_id: None,
            error_message: None,
        }
    }

    #[tokio::test]
    async fn test_append_and_lookup() {
        let repo = Repository::in_memory().await.unwrap();
        let mut tx = repo.begin().await.unwrap();

        let appended = append(
            &mut tx,
            sample_entry("<a1@mail.example.com>", ProcessingStatus::Success),
        )
        .await
        .unwrap();

        let found = find_by_message_id(&mut tx, "<a1@mail.example.com>")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, appended.id);
        assert_eq!(found.processing_status, ProcessingStatus::Success);
        assert_eq!(
            found.email_subject.as_deref(),
            Some("Your order has been received")
        );
    }

    #[tokio::test]
    async fn test_is_processed() {
        let repo = Repository::in_memory().await.unwrap();
        let mut tx = repo.begin().await.unwrap();

        assert!(!is_processed(&mut tx, "<a1@mail.example.com>").await.unwrap());

        append(
            &mut tx,
            sample_entry("<a1@mail.example.com>", ProcessingStatus::Failed),
        )
        .await
        .unwrap();

        assert!(is_processed(&mut tx, "<a1@mail.example.com>").await.unwrap());
        assert!(!is_processed(&mut tx, "<other@mail.example.com>").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_message_id_is_rejected() {
        let repo = Repository::in_memory().await.unwrap();
        let mut tx = repo.begin().await.unwrap();

        append(
            &mut tx,
            sample_entry("<a1@mail.example.com>", ProcessingStatus::Success),
        )
        .await
        .unwrap();
        let second = append(
            &mut tx,
            sample_entry("<a1@mail.example.com>", ProcessingStatus::Success),
        )
        .await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn test_failed_entry_keeps_error_detail() {
        let repo = Repository::in_memory().await.unwrap();
        let mut tx = repo.begin().await.unwrap();

        let mut entry = sample_entry("<bad@mail.example.com>", ProcessingStatus::Failed);
        entry.error_message = Some("no order identifier found in email body".to_string());
        append(&mut tx, entry).await.unwrap();

        let found = find_by_message_id(&mut tx, "<bad@mail.example.com>")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.processing_status, ProcessingStatus::Failed);
        assert_eq!(
            found.error_message.as_deref(),
            Some("no order identifier found in email body")
        );
        assert!(found.order_id.is_none());
    }
}
