//! ObjectStore trait definition
//!
//! This trait defines the put/get/delete contract shared by every tier.
//! It allows application code to be decoupled from the specific S3 SDK
//! implementation, and lets tests substitute an in-memory store.

use std::fmt;
use std::io::Cursor;
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};

use crate::error::{Error, Result};

/// Longest key accepted by S3-compatible stores, in bytes
pub const MAX_KEY_LEN: usize = 1024;

/// Upper bound on buffer space reserved from a declared size
const MAX_INITIAL_CAPACITY: u64 = 8 * 1024 * 1024;

type BoxedReader = Pin<Box<dyn AsyncRead + Send>>;

/// Check a key before any request is made
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::InvalidKey("object key cannot be empty".into()));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(Error::InvalidKey(format!(
            "object key is {} bytes, the limit is {MAX_KEY_LEN}",
            key.len()
        )));
    }
    Ok(())
}

fn initial_capacity(declared: u64) -> usize {
    declared.min(MAX_INITIAL_CAPACITY) as usize
}

/// Content handed to `ObjectStore::put`
///
/// Owns its source stream, so the handle is released when the body is
/// dropped, whether or not the upload succeeded.
pub struct ObjectBody {
    reader: BoxedReader,
    expected_len: Option<u64>,
    local: bool,
}

impl ObjectBody {
    /// Body backed by an in-memory buffer
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        let data = data.into();
        let len = data.len() as u64;
        Self {
            reader: Box::pin(Cursor::new(data)),
            expected_len: Some(len),
            local: false,
        }
    }

    /// Body backed by an arbitrary stream of unknown length
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        Self {
            reader: Box::pin(reader),
            expected_len: None,
            local: false,
        }
    }

    /// Body backed by a local file; the file size becomes the expected length
    pub async fn from_file(path: &Path) -> Result<Self> {
        let file = tokio::fs::File::open(path).await?;
        let len = file.metadata().await?.len();
        Ok(Self {
            reader: Box::pin(file),
            expected_len: Some(len),
            local: true,
        })
    }

    /// Size of the source when it is known up front
    pub fn expected_len(&self) -> Option<u64> {
        self.expected_len
    }

    /// Drain the body into memory
    ///
    /// Read failures on a file body are `Error::LocalIo`; on any other
    /// stream they are `Error::Transport`. `key` names the destination
    /// object in error messages.
    pub async fn read_all(mut self, key: &str) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(initial_capacity(self.expected_len.unwrap_or(0)));
        match self.reader.read_to_end(&mut data).await {
            Ok(_) => Ok(data),
            Err(e) if self.local => Err(Error::LocalIo(e)),
            Err(e) => Err(Error::Transport(format!(
                "Failed to read upload body for '{key}': {e}"
            ))),
        }
    }
}

impl AsyncRead for ObjectBody {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        self.reader.as_mut().poll_read(cx, buf)
    }
}

impl fmt::Debug for ObjectBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectBody")
            .field("expected_len", &self.expected_len)
            .field("local", &self.local)
            .finish_non_exhaustive()
    }
}

/// Content returned by `ObjectStore::get`
///
/// Dropping the reader closes the underlying stream on every exit path.
pub struct ObjectReader {
    key: String,
    size: u64,
    reader: BoxedReader,
}

impl ObjectReader {
    pub fn new<R>(key: impl Into<String>, size: u64, reader: R) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        Self {
            key: key.into(),
            size,
            reader: Box::pin(reader),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Size declared by the store
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Read the whole object, checking it against the declared size
    pub async fn read_to_vec(mut self) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(initial_capacity(self.size));
        self.reader.read_to_end(&mut data).await.map_err(|e| {
            Error::Transport(format!("Failed to read object '{}': {e}", self.key))
        })?;

        if data.len() as u64 != self.size {
            return Err(Error::Transport(format!(
                "Object '{}' declared {} bytes but {} were received",
                self.key,
                self.size,
                data.len()
            )));
        }
        Ok(data)
    }
}

impl AsyncRead for ObjectReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        self.reader.as_mut().poll_read(cx, buf)
    }
}

impl fmt::Debug for ObjectReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectReader")
            .field("key", &self.key)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Metadata for an object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInfo {
    /// Object key
    pub key: String,

    /// Size in bytes
    pub size_bytes: u64,

    /// Human-readable size
    pub size_human: String,

    /// ETag (usually MD5 for single-part uploads)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    /// Last modified timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<jiff::Timestamp>,
}

impl ObjectInfo {
    pub fn new(key: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            size_bytes: size,
            size_human: humansize::format_size(size, humansize::BINARY),
            etag: None,
            last_modified: None,
        }
    }
}

/// Uniform access to one addressed bucket
///
/// Every call is independent: no session, no transaction, no ordering
/// between concurrent calls on the same key beyond what the store provides.
/// Implementations never retry internally.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Bucket this store addresses
    fn bucket(&self) -> &str;

    /// Upload the whole body under `key`, returning the bytes transferred
    ///
    /// A failed put is not rolled back; the remote object may be partial.
    async fn put(&self, key: &str, body: ObjectBody) -> Result<u64>;

    /// Open `key` for reading
    ///
    /// Fails with `Error::NotFound` when the key does not exist.
    async fn get(&self, key: &str) -> Result<ObjectReader>;

    /// Get object metadata
    async fn head(&self, key: &str) -> Result<ObjectInfo>;

    /// Ensure `key` is absent; deleting a missing key succeeds
    async fn delete(&self, key: &str) -> Result<()>;

    /// Upload an in-memory buffer
    async fn put_bytes(&self, key: &str, data: &[u8]) -> Result<u64> {
        self.put(key, ObjectBody::from_bytes(data.to_vec())).await
    }

    /// Get object content as bytes
    async fn get_bytes(&self, key: &str) -> Result<Vec<u8>> {
        self.get(key).await?.read_to_vec().await
    }

    /// Check whether `key` exists
    async fn exists(&self, key: &str) -> Result<bool> {
        match self.head(key).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("alpha").is_ok());
        assert!(validate_key("path/to/object.bin").is_ok());
        assert!(matches!(validate_key(""), Err(Error::InvalidKey(_))));

        let long = "k".repeat(MAX_KEY_LEN + 1);
        assert!(matches!(validate_key(&long), Err(Error::InvalidKey(_))));
    }

    #[test]
    fn test_object_info_new() {
        let info = ObjectInfo::new("test.txt", 1024);
        assert_eq!(info.key, "test.txt");
        assert_eq!(info.size_bytes, 1024);
        assert_eq!(info.size_human, "1 KiB");
        assert!(info.etag.is_none());
    }

    #[tokio::test]
    async fn test_body_from_bytes() {
        let body = ObjectBody::from_bytes(b"hello".to_vec());
        assert_eq!(body.expected_len(), Some(5));
        assert_eq!(body.read_all("k").await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_body_from_reader_has_no_expected_len() {
        let body = ObjectBody::from_reader(Cursor::new(vec![1u8, 2, 3]));
        assert_eq!(body.expected_len(), None);
        assert_eq!(body.read_all("k").await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_body_from_missing_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let err = ObjectBody::from_file(&temp_dir.path().join("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::LocalIo(_)));
    }

    #[tokio::test]
    async fn test_body_from_directory_is_local_io() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let body = ObjectBody::from_file(temp_dir.path()).await.unwrap();
        let err = body.read_all("k").await.unwrap_err();
        assert!(matches!(err, Error::LocalIo(_)));
    }

    #[tokio::test]
    async fn test_reader_huge_declared_size_does_not_preallocate() {
        let reader = ObjectReader::new("bogus", u64::MAX, Cursor::new(vec![0u8; 4]));
        let err = reader.read_to_vec().await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }

    #[test]
    fn test_initial_capacity_is_capped() {
        assert_eq!(initial_capacity(0), 0);
        assert_eq!(initial_capacity(1024), 1024);
        assert_eq!(initial_capacity(u64::MAX), MAX_INITIAL_CAPACITY as usize);
    }

    #[tokio::test]
    async fn test_reader_detects_short_stream() {
        let reader = ObjectReader::new("short", 10, Cursor::new(vec![0u8; 4]));
        assert_eq!(reader.size(), 10);
        let err = reader.read_to_vec().await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }
}
