//! Integration tests for ss33-s3
//!
//! These tests require a running S3-compatible server and a storage set
//! whose permanent and cache buckets already exist.
//!
//! Run with:
//! ```bash
//! # Start a local server
//! docker run -d --name rustfs -p 9000:9000 \
//!     -e RUSTFS_ACCESS_KEY=accesskey \
//!     -e RUSTFS_SECRET_KEY=secretkey \
//!     rustfs/rustfs:1.0.0-alpha.81
//!
//! # Point the suite at a storage set file
//! export SS33_TEST_CONFIG=/path/to/storage.toml
//! cargo test -p ss33-s3 --features integration
//! ```

#![cfg(feature = "integration")]

use ss33_core::{Error, ObjectBody, ObjectStore, Tier, TierClients};
use ss33_s3::{S3Store, connect};
use ss33_testkit::{
    assert_file_content, assert_object_content, load_test_storage_set, purge_file, put_file,
    random_string,
};

const MIB: usize = 1024 * 1024;

async fn setup() -> TierClients<S3Store> {
    let set = load_test_storage_set().expect("SS33_TEST_CONFIG must name a storage set");
    connect(&set).await.expect("Failed to create S3 clients")
}

mod object_operations {
    use super::*;

    #[tokio::test]
    async fn test_put_then_get_round_trip() {
        let tiers = setup().await;
        let key = random_string();
        let content = b"opaque \x00\x01\xfe\xff content".to_vec();

        let written = tiers.cache().put_bytes(&key, &content).await.unwrap();
        assert_eq!(written, content.len() as u64);

        let reader = tiers.cache().get(&key).await.unwrap();
        assert_eq!(reader.size(), content.len() as u64);
        assert_eq!(reader.read_to_vec().await.unwrap(), content);

        purge_file(&tiers, &key).await.into_result().unwrap();
    }

    #[tokio::test]
    async fn test_bytes_written_for_edge_sizes() {
        let tiers = setup().await;

        for size in [0, 1, 10 * MIB] {
            let key = random_string();
            let content = vec![0x5Au8; size];
            let written = tiers.permanent().put_bytes(&key, &content).await.unwrap();
            assert_eq!(written, size as u64);
            assert_eq!(tiers.permanent().head(&key).await.unwrap().size_bytes, size as u64);
            purge_file(&tiers, &key).await.into_result().unwrap();
        }
    }

    #[tokio::test]
    async fn test_put_from_stream() {
        let tiers = setup().await;
        let key = random_string();

        let body = ObjectBody::from_reader(std::io::Cursor::new(b"streamed body".to_vec()));
        assert_eq!(tiers.cache().put(&key, body).await.unwrap(), 13);
        assert_object_content(tiers.cache(), &key, b"streamed body")
            .await
            .unwrap();

        purge_file(&tiers, &key).await.into_result().unwrap();
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let tiers = setup().await;
        let key = random_string();

        tiers.permanent().put_bytes(&key, b"short-lived").await.unwrap();
        tiers.permanent().delete(&key).await.unwrap();

        let err = tiers.permanent().get(&key).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let tiers = setup().await;
        let key = format!("missing-key-{}", random_string());

        tiers.cache().delete(&key).await.unwrap();
        tiers.cache().delete(&key).await.unwrap();
    }
}

mod tier_isolation {
    use super::*;

    #[tokio::test]
    async fn test_cache_write_is_not_visible_in_permanent() {
        let tiers = setup().await;
        let key = random_string();

        tiers
            .tier(Tier::Cache)
            .put_bytes(&key, b"hello world")
            .await
            .unwrap();

        let reader = tiers.cache().get(&key).await.unwrap();
        assert_eq!(reader.size(), 11);
        assert_eq!(reader.read_to_vec().await.unwrap(), b"hello world");

        let err = tiers.permanent().get(&key).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)), "unexpected error: {err}");

        purge_file(&tiers, &key).await.into_result().unwrap();
    }

    #[tokio::test]
    async fn test_write_through_then_purge() {
        let tiers = setup().await;
        let key = random_string();

        tiers
            .write_through(&key, b"both tiers")
            .await
            .into_result()
            .unwrap();
        for tier in Tier::ALL {
            assert_object_content(tiers.tier(tier), &key, b"both tiers")
                .await
                .unwrap();
        }

        let report = purge_file(&tiers, &key).await;
        assert!(report.is_complete());
        for tier in Tier::ALL {
            assert!(!tiers.tier(tier).exists(&key).await.unwrap());
        }
    }
}

mod concurrent_operations {
    use super::*;

    #[tokio::test]
    async fn test_concurrent_puts_distinct_keys() {
        let tiers = setup().await;
        let keys: Vec<String> = (0..8).map(|_| random_string()).collect();

        let puts = keys
            .iter()
            .map(|key| tiers.cache().put_bytes(key, key.as_bytes()));
        for result in futures::future::join_all(puts).await {
            result.unwrap();
        }

        for key in &keys {
            assert_object_content(tiers.cache(), key, key.as_bytes())
                .await
                .unwrap();
            purge_file(&tiers, key).await.into_result().unwrap();
        }
    }
}

mod local_files {
    use super::*;

    #[tokio::test]
    async fn test_put_file_and_download() {
        let tiers = setup().await;
        let key = random_string();
        let temp_dir = tempfile::tempdir().unwrap();

        let upload = temp_dir.path().join("upload.bin");
        let content: Vec<u8> = (0..=255u8).cycle().take(MIB + 17).collect();
        std::fs::write(&upload, &content).unwrap();

        let written = put_file(tiers.permanent(), &key, &upload).await.unwrap();
        assert_eq!(written, content.len() as u64);

        let download = temp_dir.path().join("download.bin");
        let data = tiers.permanent().get_bytes(&key).await.unwrap();
        std::fs::write(&download, data).unwrap();
        assert_file_content(&download, &content).await.unwrap();

        purge_file(&tiers, &key).await.into_result().unwrap();
    }
}
