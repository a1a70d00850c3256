use std::sync::Arc;

use sqlx::Row;

use crate::database::Database;
use crate::error::{Result, StoreError};

/// A stored key-value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: Vec<u8>,
    /// Bucket revision at which this entry was last written
    pub revision: i64,
    /// Unix timestamp (seconds) of the last write
    pub updated_at: i64,
}

/// Handle to a single bucket.
///
/// Cheap to clone; it holds the bucket name and a handle to the shared
/// connection pool, not the data itself.
#[derive(Debug, Clone)]
pub struct Bucket {
    name: Arc<str>,
    database: Database,
}

impl Bucket {
    pub(crate) fn new(name: &str, database: Database) -> Self {
        Self {
            name: Arc::from(name),
            database,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fetch the entry stored under `key`, if any.
    pub async fn get(&self, key: &str) -> Result<Option<Entry>> {
        let row = sqlx::query(
            r#"
            SELECT key, value, revision, updated_at
            FROM entries
            WHERE bucket = ? AND key = ?
            "#,
        )
        .bind(&*self.name)
        .bind(key)
        .fetch_optional(self.database.pool())
        .await?;

        Ok(row.map(|r| Entry {
            key: r.get("key"),
            value: r.get("value"),
            revision: r.get("revision"),
            updated_at: r.get("updated_at"),
        }))
    }

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// Returns the revision assigned to the write. The revision bump and the
    /// upsert commit together, so readers see either the old value or the
    /// new one.
    pub async fn put(&self, key: &str, value: impl AsRef<[u8]>) -> Result<i64> {
        let now = chrono::Utc::now().timestamp();
        let mut tx = self.database.pool().begin().await?;

        let revision: i64 = sqlx::query(
            r#"
            UPDATE buckets SET revision = revision + 1
            WHERE name = ?
            RETURNING revision
            "#,
        )
        .bind(&*self.name)
        .fetch_optional(&mut *tx)
        .await?
        .map(|r| r.get("revision"))
        .ok_or_else(|| StoreError::BucketNotFound(self.name.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO entries (bucket, key, value, revision, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(bucket, key) DO UPDATE SET
                value = excluded.value,
                revision = excluded.revision,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&*self.name)
        .bind(key)
        .bind(value.as_ref())
        .bind(revision)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(revision)
    }

    /// Remove `key`. Returns whether an entry was actually removed; deleting
    /// a missing key is not an error.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM entries WHERE bucket = ? AND key = ?
            "#,
        )
        .bind(&*self.name)
        .bind(key)
        .execute(self.database.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List every key in the bucket, ordered by key.
    pub async fn keys(&self) -> Result<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT key FROM entries
            WHERE bucket = ?
            ORDER BY key
            "#,
        )
        .bind(&*self.name)
        .fetch_all(self.database.pool())
        .await?;

        Ok(rows.iter().map(|r| r.get("key")).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_bucket(name: &str) -> (Database, Bucket) {
        let db = Database::in_memory().await.unwrap();
        let bucket = db.create_bucket(name).await.unwrap();
        (db, bucket)
    }

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let (_db, bucket) = setup_bucket("default").await;

        let revision = bucket.put("foo", "bar").await.unwrap();
        assert_eq!(revision, 1);

        let entry = bucket.get("foo").await.unwrap().unwrap();
        assert_eq!(entry.key, "foo");
        assert_eq!(entry.value, b"bar");
        assert_eq!(entry.revision, 1);
    }

    #[tokio::test]
    async fn test_put_overwrites_and_bumps_revision() {
        let (_db, bucket) = setup_bucket("default").await;

        bucket.put("foo", "one").await.unwrap();
        bucket.put("other", "x").await.unwrap();
        let revision = bucket.put("foo", "two").await.unwrap();
        assert_eq!(revision, 3);

        let entry = bucket.get("foo").await.unwrap().unwrap();
        assert_eq!(entry.value, b"two");
        assert_eq!(entry.revision, 3);
        assert_eq!(bucket.keys().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (_db, bucket) = setup_bucket("default").await;

        assert!(!bucket.delete("never-put").await.unwrap());
        assert!(bucket.get("never-put").await.unwrap().is_none());

        bucket.put("foo", "bar").await.unwrap();
        assert!(bucket.delete("foo").await.unwrap());
        assert!(!bucket.delete("foo").await.unwrap());
        assert!(bucket.get("foo").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_keys_are_scoped_to_bucket() {
        let db = Database::in_memory().await.unwrap();
        let first = db.create_bucket("first").await.unwrap();
        let second = db.create_bucket("second").await.unwrap();

        for key in ["c", "a", "b"] {
            first.put(key, "v").await.unwrap();
        }
        second.put("z", "v").await.unwrap();

        assert_eq!(first.keys().await.unwrap(), vec!["a", "b", "c"]);
        assert_eq!(second.keys().await.unwrap(), vec!["z"]);
        assert!(second.get("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_bucket_lists_nothing() {
        let (_db, bucket) = setup_bucket("default").await;
        assert!(bucket.keys().await.unwrap().is_empty());
    }
}
