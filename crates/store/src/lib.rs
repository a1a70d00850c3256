//! Embedded durable key-value backend
//!
//! This crate persists named buckets of key-value entries in a local SQLite
//! database. It is the storage runtime behind the workspace key-value daemon.
//!
//! # Features
//!
//! - One SQLite file per storage directory, WAL journal with full fsync
//! - Buckets as isolated namespaces, created lazily and never dropped
//! - Atomic puts with a per-bucket revision counter (last writer wins)
//! - [`BucketManager`] for race-tolerant get-or-create access
//!
//! # Example
//!
//! ```rust,no_run
//! use store::{BucketManager, Database};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), store::StoreError> {
//! let database = Database::open(Path::new("/tmp/kv")).await?;
//! let buckets = BucketManager::new(database.clone());
//!
//! let bucket = buckets.ensure("default").await?;
//! bucket.put("greeting", b"hello").await?;
//! assert_eq!(bucket.get("greeting").await?.unwrap().value, b"hello");
//!
//! database.close().await?;
//! # Ok(())
//! # }
//! ```

mod bucket;
mod database;
mod error;
mod manager;

pub use bucket::{Bucket, Entry};
pub use database::{validate_bucket_name, Database, DB_FILE_NAME};
pub use error::{Result, StoreError};
pub use manager::BucketManager;
