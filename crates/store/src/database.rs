//! SQLite database backing every bucket.

use std::path::Path;
use std::time::Duration;

use sqlx::{
    sqlite::{
        SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
    },
    Row,
};

use crate::bucket::Bucket;
use crate::error::{Result, StoreError};

/// Name of the database file created inside the storage directory.
pub const DB_FILE_NAME: &str = "kv.sqlite";

/// Longest bucket name accepted by [`validate_bucket_name`].
const MAX_BUCKET_NAME_LEN: usize = 255;

/// How long a connection waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite database connection pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the database inside `storage_dir`.
    ///
    /// The directory is created if it does not exist. Every committed write
    /// is fsynced before the call that made it returns.
    pub async fn open(storage_dir: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(storage_dir).await?;
        let path = storage_dir.join(DB_FILE_NAME);

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Full)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        tracing::info!(path = %path.display(), "opened key-value database");

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Create an in-memory database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(":memory:")
            .busy_timeout(BUSY_TIMEOUT);

        // A single connection that is never recycled: each `:memory:`
        // connection is its own database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Run database migrations.
    async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check that the database accepts queries.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Flush the write-ahead log into the main database file and close every
    /// connection. Operations issued afterwards fail.
    pub async fn close(&self) -> Result<()> {
        sqlx::query("PRAGMA wal_checkpoint(TRUNCATE)")
            .execute(&self.pool)
            .await?;
        self.pool.close().await;
        tracing::info!("closed key-value database");
        Ok(())
    }

    /// Create a new bucket.
    ///
    /// Fails with [`StoreError::BucketExists`] if the name is taken, which
    /// makes this call the arbiter when two callers race to create the
    /// same bucket.
    pub async fn create_bucket(&self, name: &str) -> Result<Bucket> {
        validate_bucket_name(name)?;

        let now = chrono::Utc::now().timestamp();
        sqlx::query(
            r#"
            INSERT INTO buckets (name, revision, created_at)
            VALUES (?, 0, ?)
            "#,
        )
        .bind(name)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                StoreError::BucketExists(name.to_string())
            }
            e => StoreError::Database(e),
        })?;

        tracing::debug!(bucket = name, "created bucket");
        Ok(Bucket::new(name, self.clone()))
    }

    /// Open a bucket that was created earlier.
    pub async fn open_bucket(&self, name: &str) -> Result<Bucket> {
        validate_bucket_name(name)?;

        let row = sqlx::query(
            r#"
            SELECT 1 FROM buckets WHERE name = ?
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(_) => Ok(Bucket::new(name, self.clone())),
            None => Err(StoreError::BucketNotFound(name.to_string())),
        }
    }

    /// List the names of all buckets.
    pub async fn list_buckets(&self) -> Result<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT name FROM buckets
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(|r| r.get("name")).collect())
    }
}

/// Check that `name` can be used as a bucket name.
///
/// Names are non-empty, at most 255 bytes, and made of ASCII alphanumerics,
/// `-` and `_`. Hex digests and `default` always qualify.
pub fn validate_bucket_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.len() <= MAX_BUCKET_NAME_LEN
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidBucketName(name.to_string()))
    }
}
