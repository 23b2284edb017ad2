//! In-memory ObjectStore
//!
//! Same contract as the S3 adapter, held in a process-local map. Clones share
//! the same objects, so one store can be handed to many tasks.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::traits::{ObjectBody, ObjectInfo, ObjectReader, ObjectStore, validate_key};

#[derive(Debug, Clone)]
struct StoredObject {
    data: Arc<Vec<u8>>,
    last_modified: jiff::Timestamp,
}

/// Process-local bucket
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    bucket: String,
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
}

impl MemoryStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: Arc::default(),
        }
    }

    /// Number of stored objects
    pub fn len(&self) -> usize {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored keys in lexical order
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    fn lookup(&self, key: &str) -> Result<StoredObject> {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("{}/{key}", self.bucket)))
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put(&self, key: &str, body: ObjectBody) -> Result<u64> {
        validate_key(key)?;
        let data = body.read_all(key).await?;
        let written = data.len() as u64;

        let object = StoredObject {
            data: Arc::new(data),
            last_modified: jiff::Timestamp::now(),
        };
        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), object);

        tracing::debug!(bucket = %self.bucket, key, written, "put object");
        Ok(written)
    }

    async fn get(&self, key: &str) -> Result<ObjectReader> {
        validate_key(key)?;
        let object = self.lookup(key)?;
        let size = object.data.len() as u64;
        // Cursor over a shared buffer avoids copying on every read.
        let reader = Cursor::new(SharedBytes(object.data));
        Ok(ObjectReader::new(key, size, reader))
    }

    async fn head(&self, key: &str) -> Result<ObjectInfo> {
        validate_key(key)?;
        let object = self.lookup(key)?;
        let mut info = ObjectInfo::new(key, object.data.len() as u64);
        info.last_modified = Some(object.last_modified);
        Ok(info)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        let removed = self
            .objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some();

        tracing::debug!(bucket = %self.bucket, key, removed, "delete object");
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct SharedBytes(Arc<Vec<u8>>);

impl AsRef<[u8]> for SharedBytes {
    fn as_ref(&self) -> &[u8] {
        self.0.as_slice()
    }
}
