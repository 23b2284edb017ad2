//! ss33-testkit: Test-support helpers for ss33
//!
//! Bootstraps a `StorageSet` for integration suites, generates unique
//! fixture keys, and checks object and file content. Every helper returns
//! `Result`, so a test aborts with the underlying error verbatim via `?`;
//! content mismatches fail through `assert_eq!`.

use std::path::Path;

use rand::Rng;
use ss33_core::{ConfigLoader, ObjectStore, PurgeReport, Result, StorageSet, TierClients};

pub use ss33_core::{put_file, read_local};

/// Environment variable naming the storage configuration for test suites
pub const TEST_CONFIG_ENV: &str = "SS33_TEST_CONFIG";

/// RFC 4648 base32 alphabet
const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Length of 35 random bytes rendered in base32
pub const RANDOM_STRING_LEN: usize = 56;

/// Load the storage set named by `SS33_TEST_CONFIG`
///
/// An unset variable is reported as `Error::Config`; suites decide whether
/// that means skip or fail.
pub fn load_test_storage_set() -> Result<StorageSet> {
    let loader = ConfigLoader::from_env(TEST_CONFIG_ENV)?;
    tracing::debug!(path = %loader.path().display(), "loading test storage set");
    loader.load()
}

/// Unique, key-safe random string
pub fn random_string() -> String {
    let mut rng = rand::thread_rng();
    (0..RANDOM_STRING_LEN)
        .map(|_| BASE32_ALPHABET[rng.gen_range(0..BASE32_ALPHABET.len())] as char)
        .collect()
}

/// Delete `key` from both tiers
///
/// The report keeps each tier's outcome; call `into_result()` for the
/// strict view.
pub async fn purge_file<S: ObjectStore>(tiers: &TierClients<S>, key: &str) -> PurgeReport {
    tiers.purge(key).await
}

/// Assert that `key` exists in `store` with exactly `expected` as content
pub async fn assert_object_content<S>(store: &S, key: &str, expected: &[u8]) -> Result<()>
where
    S: ObjectStore + ?Sized,
{
    let content = store.get_bytes(key).await?;
    assert_eq!(
        content,
        expected,
        "content of {}/{key} differs from expected",
        store.bucket()
    );
    Ok(())
}

/// Assert that a local file exists with exactly `expected` as content
pub async fn assert_file_content(path: &Path, expected: &[u8]) -> Result<()> {
    let content = read_local(path).await?;
    assert_eq!(
        content,
        expected,
        "content of {} differs from expected",
        path.display()
    );
    Ok(())
}
