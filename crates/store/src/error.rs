//! Error types for the key-value store.

/// Errors that can occur when working with the key-value store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A bucket with this name was already created
    #[error("bucket already exists: {0}")]
    BucketExists(String),

    /// No bucket with this name has been created
    #[error("bucket not found: {0}")]
    BucketNotFound(String),

    /// Bucket names are restricted to ASCII alphanumerics, `-` and `_`
    #[error("invalid bucket name: {0:?}")]
    InvalidBucketName(String),
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
