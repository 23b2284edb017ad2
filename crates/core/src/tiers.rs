//! Two-tier policies
//!
//! The permanent and cache stores are independent clients; nothing in the
//! ObjectStore contract couples them. The policies here are caller-level
//! orchestration over a pair of stores and report each tier's outcome
//! separately instead of collapsing a partial failure into success.

use crate::config::Tier;
use crate::error::Result;
use crate::traits::{ObjectBody, ObjectStore};

/// Independently addressable permanent and cache stores
#[derive(Debug, Clone)]
pub struct TierClients<S> {
    permanent: S,
    cache: S,
}

impl<S: ObjectStore> TierClients<S> {
    pub fn new(permanent: S, cache: S) -> Self {
        Self { permanent, cache }
    }

    pub fn permanent(&self) -> &S {
        &self.permanent
    }

    pub fn cache(&self) -> &S {
        &self.cache
    }

    /// Store for a tier
    pub fn tier(&self, tier: Tier) -> &S {
        match tier {
            Tier::Permanent => &self.permanent,
            Tier::Cache => &self.cache,
        }
    }

    /// Delete `key` from both tiers
    ///
    /// Both deletes are always attempted, concurrently; a failure on one
    /// tier does not skip the other.
    pub async fn purge(&self, key: &str) -> PurgeReport {
        let (permanent, cache) =
            futures::join!(self.permanent.delete(key), self.cache.delete(key));

        let report = PurgeReport {
            key: key.to_string(),
            permanent,
            cache,
        };
        if !report.is_complete() {
            tracing::warn!(key, failed = ?report.failed_tiers(), "purge incomplete");
        }
        report
    }

    /// Write the same content to the permanent tier, then the cache tier
    ///
    /// The cache write is attempted even if the permanent write failed.
    pub async fn write_through(&self, key: &str, data: &[u8]) -> WriteThroughReport {
        let permanent = self
            .permanent
            .put(key, ObjectBody::from_bytes(data.to_vec()))
            .await;
        let cache = self
            .cache
            .put(key, ObjectBody::from_bytes(data.to_vec()))
            .await;

        let report = WriteThroughReport {
            key: key.to_string(),
            permanent,
            cache,
        };
        if !report.is_complete() {
            tracing::warn!(key, failed = ?report.failed_tiers(), "write-through incomplete");
        }
        report
    }
}

/// Per-tier outcome of `TierClients::purge`
#[derive(Debug)]
pub struct PurgeReport {
    pub key: String,
    pub permanent: Result<()>,
    pub cache: Result<()>,
}

impl PurgeReport {
    /// Whether both tiers confirmed the delete
    pub fn is_complete(&self) -> bool {
        self.permanent.is_ok() && self.cache.is_ok()
    }

    pub fn tier(&self, tier: Tier) -> &Result<()> {
        match tier {
            Tier::Permanent => &self.permanent,
            Tier::Cache => &self.cache,
        }
    }

    /// Tiers whose delete failed
    pub fn failed_tiers(&self) -> Vec<Tier> {
        Tier::ALL
            .into_iter()
            .filter(|tier| self.tier(*tier).is_err())
            .collect()
    }

    /// Strict view: the first error, permanent before cache
    pub fn into_result(self) -> Result<()> {
        self.permanent?;
        self.cache
    }
}

/// Per-tier outcome of `TierClients::write_through`
#[derive(Debug)]
pub struct WriteThroughReport {
    pub key: String,
    pub permanent: Result<u64>,
    pub cache: Result<u64>,
}

impl WriteThroughReport {
    pub fn is_complete(&self) -> bool {
        self.permanent.is_ok() && self.cache.is_ok()
    }

    pub fn tier(&self, tier: Tier) -> &Result<u64> {
        match tier {
            Tier::Permanent => &self.permanent,
            Tier::Cache => &self.cache,
        }
    }

    /// Tiers whose write failed
    pub fn failed_tiers(&self) -> Vec<Tier> {
        Tier::ALL
            .into_iter()
            .filter(|tier| self.tier(*tier).is_err())
            .collect()
    }

    /// Strict view: bytes written to the permanent tier, or the first error
    pub fn into_result(self) -> Result<u64> {
        let written = self.permanent?;
        self.cache?;
        Ok(written)
    }
}
