//! ss33-core: Core library for ss33 dual-tier object storage
//!
//! This crate provides:
//! - Storage / StorageSet configuration and loading
//! - The ObjectStore trait shared by every backend
//! - An in-memory ObjectStore for tests and embedding
//! - Local file helpers with size verification
//! - Caller-level policies spanning both tiers (purge, write-through)
//!
//! This crate is designed to be independent of any specific S3 SDK;
//! the S3 implementation lives in ss33-s3.

pub mod config;
pub mod error;
pub mod local;
pub mod memory;
pub mod tiers;
pub mod traits;

pub use config::{BucketLookup, ConfigLoader, Storage, StorageSet, Tier, TimeoutConfig};
pub use error::{Error, Result};
pub use local::{local_size, put_file, read_local};
pub use memory::MemoryStore;
pub use tiers::{PurgeReport, TierClients, WriteThroughReport};
pub use traits::{ObjectBody, ObjectInfo, ObjectReader, ObjectStore, validate_key};
