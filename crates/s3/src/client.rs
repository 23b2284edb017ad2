//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from ss33-core.
//! One `S3Store` addresses one bucket; build one per tier.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;

use ss33_core::{
    Error, ObjectBody, ObjectInfo, ObjectReader, ObjectStore, Result, Storage, StorageSet, Tier,
    TierClients, validate_key,
};

/// S3 client bound to one bucket
#[derive(Debug, Clone)]
pub struct S3Store {
    inner: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Store {
    /// Create a new S3 client from a storage descriptor
    ///
    /// SDK retries are disabled; failures are returned to the caller as-is.
    pub async fn new(storage: &Storage) -> Result<Self> {
        let credentials = aws_credential_types::Credentials::new(
            storage.access_key_id(),
            storage.secret_access_key(),
            None, // session token
            None, // expiry
            "ss33-static-credentials",
        );

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(aws_config::Region::new(storage.region().to_string()))
            .endpoint_url(storage.endpoint())
            .retry_config(aws_config::retry::RetryConfig::disabled());

        if let Some(timeout) = storage.timeout() {
            loader = loader.timeout_config(
                aws_config::timeout::TimeoutConfig::builder()
                    .connect_timeout(Duration::from_millis(timeout.connect_ms))
                    .operation_timeout(Duration::from_millis(timeout.operation_ms))
                    .build(),
            );
        }

        let config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(storage.bucket_lookup().force_path_style())
            .build();

        tracing::debug!(
            endpoint = storage.endpoint(),
            bucket = storage.bucket_name(),
            "created S3 client"
        );

        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: storage.bucket_name().to_string(),
        })
    }

    /// Create a client for one tier of a storage set
    pub async fn for_tier(set: &StorageSet, tier: Tier) -> Result<Self> {
        Self::new(set.tier(tier)).await
    }

    /// Get the underlying aws-sdk-s3 client
    pub fn inner(&self) -> &aws_sdk_s3::Client {
        &self.inner
    }

    fn location(&self, key: &str) -> String {
        format!("{}/{key}", self.bucket)
    }
}

/// Create independent clients for both tiers of a storage set
pub async fn connect(set: &StorageSet) -> Result<TierClients<S3Store>> {
    let permanent = S3Store::for_tier(set, Tier::Permanent).await?;
    let cache = S3Store::for_tier(set, Tier::Cache).await?;
    Ok(TierClients::new(permanent, cache))
}

#[async_trait]
impl ObjectStore for S3Store {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put(&self, key: &str, body: ObjectBody) -> Result<u64> {
        validate_key(key)?;

        let data = body.read_all(key).await?;
        let size = data.len() as u64;

        let response = self
            .inner
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_length(size as i64)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(transport_error)?;

        tracing::debug!(
            bucket = %self.bucket,
            key,
            size,
            etag = response.e_tag().unwrap_or_default(),
            "put object"
        );
        Ok(size)
    }

    async fn get(&self, key: &str) -> Result<ObjectReader> {
        validate_key(key)?;

        let response = self
            .inner
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if is_missing_key(&e) {
                    Error::NotFound(self.location(key))
                } else {
                    transport_error(e)
                }
            })?;

        let size = response.content_length().unwrap_or(0).max(0) as u64;
        tracing::debug!(bucket = %self.bucket, key, size, "get object");

        Ok(ObjectReader::new(key, size, response.body.into_async_read()))
    }

    async fn head(&self, key: &str) -> Result<ObjectInfo> {
        validate_key(key)?;

        let response = self
            .inner
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if is_missing_key(&e) {
                    Error::NotFound(self.location(key))
                } else {
                    transport_error(e)
                }
            })?;

        let size = response.content_length().unwrap_or(0).max(0) as u64;
        let mut info = ObjectInfo::new(key, size);

        if let Some(etag) = response.e_tag() {
            info.etag = Some(etag.trim_matches('"').to_string());
        }

        if let Some(modified) = response.last_modified() {
            info.last_modified = jiff::Timestamp::from_second(modified.secs()).ok();
        }

        Ok(info)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        validate_key(key)?;

        match self
            .inner
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => {}
            // Ensure-absent semantics: a key that is already gone is success.
            Err(e) if is_missing_key(&e) => {}
            Err(e) => return Err(transport_error(e)),
        }

        tracing::debug!(bucket = %self.bucket, key, "delete object");
        Ok(())
    }
}

/// Whether an SDK error means the key does not exist
///
/// An explicit error code wins; without one (HEAD responses carry no body)
/// a 404 status is taken as a missing key.
fn is_missing_key<E: ProvideErrorMetadata>(err: &SdkError<E, HttpResponse>) -> bool {
    if let Some(code) = err.as_service_error().and_then(|e| e.code()) {
        return matches!(code, "NoSuchKey" | "NotFound");
    }
    err.raw_response()
        .is_some_and(|response| response.status().as_u16() == 404)
}

fn transport_error(err: impl std::error::Error) -> Error {
    Error::Transport(DisplayErrorContext(err).to_string())
}
