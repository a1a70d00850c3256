use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::bucket::Bucket;
use crate::database::Database;
use crate::error::{Result, StoreError};

/// Get-or-create access to buckets, with a cache of opened handles.
///
/// The cache only saves a round trip to the database; correctness comes from
/// [`Database::create_bucket`] refusing duplicate names.
#[derive(Debug, Clone)]
pub struct BucketManager {
    database: Database,
    handles: Arc<RwLock<HashMap<String, Bucket>>>,
}

impl BucketManager {
    pub fn new(database: Database) -> Self {
        Self {
            database,
            handles: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Return the bucket called `name`, creating it on first use.
    ///
    /// If another caller creates the bucket between our lookup and our
    /// insert, the resulting conflict is absorbed by opening the bucket they
    /// created.
    pub async fn ensure(&self, name: &str) -> Result<Bucket> {
        let cached = self.handles.read().get(name).cloned();
        if let Some(bucket) = cached {
            return Ok(bucket);
        }

        let bucket = match self.database.create_bucket(name).await {
            Ok(bucket) => bucket,
            Err(StoreError::BucketExists(_)) => {
                tracing::debug!(bucket = name, "bucket already exists, opening it");
                self.database.open_bucket(name).await?
            }
            Err(e) => return Err(e),
        };

        self.handles
            .write()
            .entry(name.to_string())
            .or_insert_with(|| bucket.clone());
        Ok(bucket)
    }

    /// Number of bucket handles currently cached.
    pub fn cached(&self) -> usize {
        self.handles.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ensure_creates_then_reuses() {
        let db = Database::in_memory().await.unwrap();
        let manager = BucketManager::new(db.clone());

        let first = manager.ensure("default").await.unwrap();
        first.put("foo", "bar").await.unwrap();

        let second = manager.ensure("default").await.unwrap();
        assert_eq!(second.get("foo").await.unwrap().unwrap().value, b"bar");

        assert_eq!(manager.cached(), 1);
        assert_eq!(db.list_buckets().await.unwrap(), vec!["default".to_string()]);
    }

    #[tokio::test]
    async fn test_ensure_opens_bucket_created_elsewhere() {
        let db = Database::in_memory().await.unwrap();
        db.create_bucket("shared").await.unwrap().put("k", "v").await.unwrap();

        // A fresh manager has an empty cache, so it must hit the create
        // conflict and fall back to opening.
        let manager = BucketManager::new(db.clone());
        let bucket = manager.ensure("shared").await.unwrap();
        assert_eq!(bucket.get("k").await.unwrap().unwrap().value, b"v");
    }

    #[tokio::test]
    async fn test_concurrent_first_use_creates_one_bucket() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path()).await.unwrap();
        let manager = BucketManager::new(db.clone());

        let tasks = (0..16).map(|i| {
            let manager = manager.clone();
            tokio::spawn(async move {
                let bucket = manager.ensure("racy").await?;
                bucket.put(&format!("key-{i}"), "v").await?;
                Ok::<_, StoreError>(())
            })
        });

        for result in futures::future::join_all(tasks).await {
            result.unwrap().unwrap();
        }

        assert_eq!(db.list_buckets().await.unwrap(), vec!["racy".to_string()]);
        let bucket = manager.ensure("racy").await.unwrap();
        assert_eq!(bucket.keys().await.unwrap().len(), 16);
    }

    #[tokio::test]
    async fn test_ensure_rejects_invalid_name() {
        let db = Database::in_memory().await.unwrap();
        let manager = BucketManager::new(db);

        let err = manager.ensure("not a bucket").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidBucketName(_)));
        assert_eq!(manager.cached(), 0);
    }
}
