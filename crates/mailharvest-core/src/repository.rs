//! SQLite-backed storage for orders and the processing ledger.

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};

use crate::error::{Error, Result};

/// Schema version stamped into the database's `user_version` pragma.
const SCHEMA_VERSION: i64 = 1;

/// Connection pool plus schema management for the order store.
///
/// All reads and writes run on transactions handed out by
/// [`Repository::begin`]; a sync run holds one transaction for its whole
/// lifetime so that its dedup checks observe its own uncommitted writes.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given database path.
    ///
    /// Creates the database and tables if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn new(database_path: &str) -> Result<Self> {
        let url = format!("sqlite:{database_path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let repo = Self { pool };
        repo.initialize().await?;
        Ok(repo)
    }

    /// Create an in-memory repository for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let repo = Self { pool };
        repo.initialize().await?;
        Ok(repo)
    }

    /// Begin a transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if a connection cannot be acquired.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin().await?)
    }

    /// Initialize database schema.
    ///
    /// A database stamped with a newer schema version is refused rather
    /// than probed or migrated downward.
    async fn initialize(&self) -> Result<()> {
        let version: i64 = sqlx::query_scalar("PRAGMA user_version")
            .fetch_one(&self.pool)
            .await?;
        if version > SCHEMA_VERSION {
            return Err(Error::Schema {
                found: version,
                supported: SCHEMA_VERSION,
            });
        }

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS orders (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                order_number TEXT NOT NULL UNIQUE,
                order_date TEXT NOT NULL,
                total_amount REAL NOT NULL,
                currency TEXT NOT NULL DEFAULT 'USD',
                shipment_status TEXT,
                source_type TEXT NOT NULL,
                email_message_id TEXT,
                raw_email_html TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS order_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                order_id INTEGER NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
                item_name TEXT NOT NULL,
                quantity INTEGER NOT NULL DEFAULT 1,
                unit_price REAL NOT NULL,
                total_price REAL NOT NULL,
                asin TEXT
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // Index for item lookups by parent order
        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_order_items_order_id
            ON order_items(order_id)
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS processing_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                email_message_id TEXT NOT NULL UNIQUE,
                email_subject TEXT,
                email_date TEXT,
                processing_status TEXT NOT NULL,
                order_id INTEGER,
                error_message TEXT,
                processed_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // Index for per-user audit listings
        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_processing_log_user_id
            ON processing_log(user_id)
            ",
        )
        .execute(&self.pool)
        .await?;

        if version < SCHEMA_VERSION {
            sqlx::query(&format!("PRAGMA user_version = {SCHEMA_VERSION}"))
                .execute(&self.pool)
                .await?;
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_schema_version_is_stamped() {
        let repo = Repository::in_memory().await.unwrap();

        let version: i64 = sqlx::query_scalar("PRAGMA user_version")
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let repo = Repository::in_memory().await.unwrap();
        repo.initialize().await.unwrap();

        let version: i64 = sqlx::query_scalar("PRAGMA user_version")
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn test_newer_schema_version_is_rejected() {
        let repo = Repository::in_memory().await.unwrap();
        sqlx::query("PRAGMA user_version = 99")
            .execute(&repo.pool)
            .await
            .unwrap();

        let result = repo.initialize().await;
        assert!(matches!(result, Err(Error::Schema { found: 99, .. })));
    }
}
