//! Local file helpers
//!
//! Bridges the local filesystem and an ObjectStore. Every filesystem failure
//! surfaces as `Error::LocalIo`.

use std::path::Path;

use crate::error::{Error, Result};
use crate::traits::{ObjectBody, ObjectStore};

/// Upload a local file under `key` and verify the transferred size
///
/// The file is stat'ed after the upload; a byte count that differs from the
/// file size is reported as `Error::SizeMismatch` and not retried.
pub async fn put_file<S>(store: &S, key: &str, path: &Path) -> Result<u64>
where
    S: ObjectStore + ?Sized,
{
    let body = ObjectBody::from_file(path).await?;
    let written = store.put(key, body).await?;

    let expected = local_size(path).await?;
    if written != expected {
        return Err(Error::SizeMismatch {
            key: key.to_string(),
            expected,
            actual: written,
        });
    }

    tracing::debug!(
        bucket = store.bucket(),
        key,
        path = %path.display(),
        written,
        "uploaded local file"
    );
    Ok(written)
}

/// Read a whole local file
pub async fn read_local(path: &Path) -> Result<Vec<u8>> {
    Ok(tokio::fs::read(path).await?)
}

/// Size of a local file in bytes
pub async fn local_size(path: &Path) -> Result<u64> {
    Ok(tokio::fs::metadata(path).await?.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::traits::MockObjectStore;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_file_reports_file_size() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("upload.bin");
        std::fs::write(&path, vec![7u8; 4096]).unwrap();

        let store = MemoryStore::new("bucket");
        let written = put_file(&store, "upload.bin", &path).await.unwrap();
        assert_eq!(written, 4096);
        assert_eq!(store.get_bytes("upload.bin").await.unwrap(), vec![7u8; 4096]);
    }

    #[tokio::test]
    async fn test_put_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty");
        std::fs::write(&path, b"").unwrap();

        let store = MemoryStore::new("bucket");
        assert_eq!(put_file(&store, "empty", &path).await.unwrap(), 0);
        assert!(store.exists("empty").await.unwrap());
    }

    #[tokio::test]
    async fn test_put_missing_file_is_local_io() {
        let temp_dir = TempDir::new().unwrap();
        let store = MemoryStore::new("bucket");

        let err = put_file(&store, "k", &temp_dir.path().join("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::LocalIo(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_put_directory_is_local_io() {
        let temp_dir = TempDir::new().unwrap();
        let store = MemoryStore::new("bucket");

        let err = put_file(&store, "k", temp_dir.path()).await.unwrap_err();
        assert!(matches!(err, Error::LocalIo(_)));
        assert_eq!(err.exit_code(), 1);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_put_file_size_mismatch() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data");
        std::fs::write(&path, b"0123456789").unwrap();

        let mut store = MockObjectStore::new();
        store.expect_put().times(1).returning(|_, _| Ok(4));

        let err = put_file(&store, "data", &path).await.unwrap_err();
        match err {
            Error::SizeMismatch {
                key,
                expected,
                actual,
            } => {
                assert_eq!(key, "data");
                assert_eq!(expected, 10);
                assert_eq!(actual, 4);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_read_local_and_size() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("file.txt");
        std::fs::write(&path, b"hello world").unwrap();

        assert_eq!(read_local(&path).await.unwrap(), b"hello world");
        assert_eq!(local_size(&path).await.unwrap(), 11);

        let missing = temp_dir.path().join("nope");
        assert!(matches!(read_local(&missing).await, Err(Error::LocalIo(_))));
        assert!(matches!(local_size(&missing).await, Err(Error::LocalIo(_))));
    }
}
