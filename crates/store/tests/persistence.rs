//! Durability tests: everything written before a close must be readable
//! after reopening the same storage directory.

use store::{BucketManager, Database, DB_FILE_NAME};
use tempfile::TempDir;

#[tokio::test]
async fn test_entries_survive_reopen() {
    let dir = TempDir::new().unwrap();

    {
        let db = Database::open(dir.path()).await.unwrap();
        let manager = BucketManager::new(db.clone());

        let bucket = manager.ensure("workspace").await.unwrap();
        bucket.put("a", "1").await.unwrap();
        bucket.put("b", "2").await.unwrap();
        bucket.put("c", "3").await.unwrap();
        bucket.delete("b").await.unwrap();

        db.close().await.unwrap();
    }

    let db = Database::open(dir.path()).await.unwrap();
    assert_eq!(db.list_buckets().await.unwrap(), vec!["workspace".to_string()]);

    let manager = BucketManager::new(db.clone());
    let bucket = manager.ensure("workspace").await.unwrap();
    assert_eq!(bucket.keys().await.unwrap(), vec!["a", "c"]);
    assert_eq!(bucket.get("c").await.unwrap().unwrap().value, b"3");

    // Revisions keep counting from where they left off
    let revision = bucket.put("d", "4").await.unwrap();
    assert_eq!(revision, 4);

    db.close().await.unwrap();
}

#[tokio::test]
async fn test_open_creates_missing_storage_dir() {
    let dir = TempDir::new().unwrap();
    let storage = dir.path().join("nested").join("data");

    let db = Database::open(&storage).await.unwrap();
    db.ping().await.unwrap();

    assert!(storage.join(DB_FILE_NAME).exists());
    db.close().await.unwrap();
}

#[tokio::test]
async fn test_open_fails_when_storage_path_is_a_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("not-a-dir");
    std::fs::write(&file, "occupied").unwrap();

    assert!(Database::open(&file).await.is_err());
}
