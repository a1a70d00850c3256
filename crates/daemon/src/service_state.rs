use std::path::PathBuf;

use store::{BucketManager, Database, StoreError};

use crate::service_config::Config;

/// Main service state - owns the storage backend and the bucket cache.
///
/// Built once at startup, handed to the HTTP gateway, and closed after the
/// gateway has stopped serving.
#[derive(Clone, Debug)]
pub struct State {
    buckets: BucketManager,
}

impl State {
    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        // 1. Make sure the storage directory exists
        std::fs::create_dir_all(&config.storage_dir).map_err(|source| {
            StateSetupError::StorageDirectory {
                path: config.storage_dir.clone(),
                source,
            }
        })?;
        tracing::info!(path = %config.storage_dir.display(), "Storage directory");

        // 2. Open the database and wait until it answers
        let database = Database::open(&config.storage_dir)
            .await
            .map_err(StateSetupError::Database)?;

        Self::from_database(database).await
    }

    /// Build state around an already opened database.
    pub async fn from_database(database: Database) -> Result<Self, StateSetupError> {
        database.ping().await.map_err(StateSetupError::NotReady)?;
        tracing::debug!("ServiceState::from_database - database ready");

        Ok(Self {
            buckets: BucketManager::new(database),
        })
    }

    pub fn buckets(&self) -> &BucketManager {
        &self.buckets
    }

    pub fn database(&self) -> &Database {
        self.buckets.database()
    }

    /// Flush and close the storage backend.
    pub async fn close(&self) -> Result<(), StoreError> {
        self.database().close().await
    }
}

impl AsRef<Database> for State {
    fn as_ref(&self) -> &Database {
        self.database()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("Unable to create storage directory {path:?}: {source}")]
    StorageDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Database setup error: {0}")]
    Database(StoreError),
    #[error("Database is not accepting queries: {0}")]
    NotReady(StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_from_config_creates_storage_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            storage_dir: dir.path().join("kv-data"),
            ..Config::default()
        };

        let state = State::from_config(&config).await.unwrap();
        assert!(config.storage_dir.join(store::DB_FILE_NAME).exists());
        state.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_from_config_rejects_file_as_storage_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("occupied");
        std::fs::write(&file, "not a directory").unwrap();

        let config = Config {
            storage_dir: file,
            ..Config::default()
        };

        let err = State::from_config(&config).await.unwrap_err();
        assert!(matches!(err, StateSetupError::StorageDirectory { .. }));
    }
}
