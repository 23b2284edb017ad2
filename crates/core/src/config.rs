//! Storage configuration
//!
//! A `Storage` addresses exactly one bucket; a `StorageSet` pairs the
//! permanent and cache buckets. Both are validated when constructed and are
//! read-only afterwards.
//!
//! Configuration files are TOML by default, or JSON when the file name ends
//! in `.json`. Field names are accepted in snake_case and in the PascalCase
//! spelling used by older ss33 configuration files:
//!
//! ```toml
//! [permanent]
//! endpoint = "https://s3.example.com"
//! access_key_id = "AKIA..."
//! secret_access_key = "..."
//! bucket_name = "artifacts"
//!
//! [cache]
//! endpoint = "https://s3.example.com"
//! access_key_id = "AKIA..."
//! secret_access_key = "..."
//! bucket_name = "artifacts-cache"
//! bucket_lookup = "path"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default region for S3-compatible endpoints that ignore it
const DEFAULT_REGION: &str = "us-east-1";

/// Default configuration file name under the user config directory
const DEFAULT_FILE_NAME: &str = "storage.toml";

/// One of the two buckets in a `StorageSet`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Authoritative bucket
    Permanent,
    /// Transient bucket
    Cache,
}

impl Tier {
    /// Both tiers, permanent first
    pub const ALL: [Tier; 2] = [Tier::Permanent, Tier::Cache];

    pub const fn as_str(self) -> &'static str {
        match self {
            Tier::Permanent => "permanent",
            Tier::Cache => "cache",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "permanent" => Ok(Tier::Permanent),
            "cache" => Ok(Tier::Cache),
            other => Err(Error::Config(format!(
                "Unknown tier '{other}'. Expected 'permanent' or 'cache'"
            ))),
        }
    }
}

/// Bucket addressing style
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketLookup {
    /// Path-style, which every S3-compatible server accepts
    #[default]
    Auto,
    /// `https://endpoint/bucket/key`
    Path,
    /// `https://bucket.endpoint/key`
    Dns,
}

impl BucketLookup {
    /// Whether requests should use path-style addressing
    pub const fn force_path_style(self) -> bool {
        matches!(self, BucketLookup::Auto | BucketLookup::Path)
    }
}

/// Timeout configuration for a storage endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimeoutConfig {
    /// Connection timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_ms: u64,

    /// Per-operation timeout in milliseconds
    #[serde(default = "default_operation_timeout")]
    pub operation_ms: u64,
}

fn default_connect_timeout() -> u64 {
    5000
}

fn default_operation_timeout() -> u64 {
    30000
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: default_connect_timeout(),
            operation_ms: default_operation_timeout(),
        }
    }
}

/// Address and credentials for exactly one bucket
#[derive(Clone, PartialEq, Eq)]
pub struct Storage {
    endpoint: String,
    access_key_id: String,
    secret_access_key: String,
    bucket_name: String,
    region: String,
    bucket_lookup: BucketLookup,
    timeout: Option<TimeoutConfig>,
}

impl Storage {
    /// Create a validated storage descriptor
    pub fn new(
        endpoint: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        bucket_name: impl Into<String>,
    ) -> Result<Self> {
        let storage = Self {
            endpoint: endpoint.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            bucket_name: bucket_name.into(),
            region: DEFAULT_REGION.to_string(),
            bucket_lookup: BucketLookup::default(),
            timeout: None,
        };
        storage.validate()?;
        Ok(storage)
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_bucket_lookup(mut self, lookup: BucketLookup) -> Self {
        self.bucket_lookup = lookup;
        self
    }

    pub fn with_timeout(mut self, timeout: TimeoutConfig) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn bucket_lookup(&self) -> BucketLookup {
        self.bucket_lookup
    }

    pub fn timeout(&self) -> Option<&TimeoutConfig> {
        self.timeout.as_ref()
    }

    fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.endpoint)
            .map_err(|e| Error::Config(format!("Invalid endpoint '{}': {e}", self.endpoint)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(Error::Config(format!(
                "Endpoint '{}' must use http or https",
                self.endpoint
            )));
        }
        if self.bucket_name.trim().is_empty() {
            return Err(Error::Config("Bucket name cannot be empty".into()));
        }
        if self.access_key_id.is_empty() || self.secret_access_key.is_empty() {
            return Err(Error::Config(format!(
                "Credentials for bucket '{}' are incomplete",
                self.bucket_name
            )));
        }
        Ok(())
    }
}

// Keeps the secret out of logs and panic messages.
impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("bucket_name", &self.bucket_name)
            .field("region", &self.region)
            .field("bucket_lookup", &self.bucket_lookup)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// On-disk shape of a `Storage`
#[derive(Deserialize)]
struct RawStorage {
    #[serde(alias = "Endpoint")]
    endpoint: String,
    #[serde(alias = "AccessKeyId")]
    access_key_id: String,
    #[serde(alias = "SecretAccessKey")]
    secret_access_key: String,
    #[serde(alias = "BucketName")]
    bucket_name: String,
    #[serde(default, alias = "Region")]
    region: Option<String>,
    #[serde(default, alias = "BucketLookup")]
    bucket_lookup: BucketLookup,
    #[serde(default, alias = "Timeout")]
    timeout: Option<TimeoutConfig>,
}

impl RawStorage {
    fn into_storage(self, tier: Tier) -> Result<Storage> {
        let mut storage = Storage::new(
            self.endpoint,
            self.access_key_id,
            self.secret_access_key,
            self.bucket_name,
        )
        .map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{tier} storage: {msg}")),
            other => other,
        })?
        .with_bucket_lookup(self.bucket_lookup);

        if let Some(region) = self.region {
            storage = storage.with_region(region);
        }
        if let Some(timeout) = self.timeout {
            storage = storage.with_timeout(timeout);
        }
        Ok(storage)
    }
}

/// On-disk shape of a `StorageSet`; tiers are optional here so a missing
/// one can be reported by name.
#[derive(Deserialize)]
struct RawStorageSet {
    #[serde(default, alias = "Permanent")]
    permanent: Option<RawStorage>,
    #[serde(default, alias = "Cache")]
    cache: Option<RawStorage>,
}

/// The permanent and cache buckets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSet {
    permanent: Storage,
    cache: Storage,
}

impl StorageSet {
    pub fn new(permanent: Storage, cache: Storage) -> Self {
        Self { permanent, cache }
    }

    pub fn permanent(&self) -> &Storage {
        &self.permanent
    }

    pub fn cache(&self) -> &Storage {
        &self.cache
    }

    /// Storage descriptor for a tier
    pub fn tier(&self, tier: Tier) -> &Storage {
        match tier {
            Tier::Permanent => &self.permanent,
            Tier::Cache => &self.cache,
        }
    }

    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: RawStorageSet = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid TOML storage configuration: {e}")))?;
        Self::from_raw(raw)
    }

    /// Parse a JSON document
    pub fn from_json_str(content: &str) -> Result<Self> {
        let raw: RawStorageSet = serde_json::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid JSON storage configuration: {e}")))?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawStorageSet) -> Result<Self> {
        let permanent = raw
            .permanent
            .ok_or_else(|| Error::Config("Missing 'permanent' storage".into()))?
            .into_storage(Tier::Permanent)?;
        let cache = raw
            .cache
            .ok_or_else(|| Error::Config("Missing 'cache' storage".into()))?
            .into_storage(Tier::Cache)?;
        Ok(Self { permanent, cache })
    }
}

/// Loads a `StorageSet` from an explicit location
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    path: PathBuf,
}

impl ConfigLoader {
    /// Create a loader for `<config dir>/ss33/storage.toml`
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not determine config directory".into()))?;
        Ok(Self {
            path: config_dir.join("ss33").join(DEFAULT_FILE_NAME),
        })
    }

    /// Create a loader for a specific file
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a loader whose path is taken from an environment variable
    ///
    /// An unset or empty variable is a configuration error rather than a
    /// panic so that callers can recover.
    pub fn from_env(var: &str) -> Result<Self> {
        match std::env::var_os(var) {
            Some(value) if !value.is_empty() => Ok(Self::with_path(PathBuf::from(value))),
            _ => Err(Error::Config(format!(
                "Environment variable {var} is not set; it must name a storage configuration file"
            ))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and validate the storage set
    pub fn load(&self) -> Result<StorageSet> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            Error::Config(format!(
                "Cannot read storage configuration {}: {e}",
                self.path.display()
            ))
        })?;

        let set = if self.is_json() {
            StorageSet::from_json_str(&content)?
        } else {
            StorageSet::from_toml_str(&content)?
        };

        tracing::debug!(
            path = %self.path.display(),
            permanent = set.permanent.bucket_name(),
            cache = set.cache.bucket_name(),
            "Loaded storage configuration"
        );
        Ok(set)
    }

    fn is_json(&self) -> bool {
        self.path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    }
}
