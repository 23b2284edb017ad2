//! Command-level tests that need no S3 server
//!
//! Configuration and argument failures are reported before any client is
//! created, so these run against `commands::execute` directly.

use clap::Parser;
use ss33_cli::commands::{self, Cli};
use ss33_cli::exit_code::ExitCode;
use tempfile::TempDir;

fn cli(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("ss33").chain(args.iter().copied())).unwrap()
}

#[tokio::test]
async fn test_missing_config_file_is_usage_error() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("absent.toml");
    let config = config.to_str().unwrap();

    let code = commands::execute(cli(&["--quiet", "--config", config, "rm", "cache", "k"])).await;
    assert_eq!(code, ExitCode::UsageError);
}

#[tokio::test]
async fn test_config_missing_tier_is_usage_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("storage.toml");
    std::fs::write(
        &path,
        r#"
        [permanent]
        endpoint = "http://127.0.0.1:9000"
        access_key_id = "a"
        secret_access_key = "b"
        bucket_name = "artifacts"
        "#,
    )
    .unwrap();

    let code = commands::execute(cli(&[
        "--config",
        path.to_str().unwrap(),
        "--json",
        "purge",
        "alpha",
    ]))
    .await;
    assert_eq!(code, ExitCode::UsageError);
}

#[tokio::test]
async fn test_empty_key_is_usage_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("storage.json");
    std::fs::write(
        &path,
        r#"{
            "Permanent": {
                "Endpoint": "http://127.0.0.1:1",
                "AccessKeyId": "a",
                "SecretAccessKey": "b",
                "BucketName": "artifacts"
            },
            "Cache": {
                "Endpoint": "http://127.0.0.1:1",
                "AccessKeyId": "a",
                "SecretAccessKey": "b",
                "BucketName": "artifacts-cache"
            }
        }"#,
    )
    .unwrap();

    let code = commands::execute(cli(&[
        "--quiet",
        "--config",
        path.to_str().unwrap(),
        "stat",
        "permanent",
        "",
    ]))
    .await;
    assert_eq!(code, ExitCode::UsageError);
}

#[test]
fn test_unknown_tier_rejected_by_parser() {
    assert!(Cli::try_parse_from(["ss33", "get", "warm", "alpha"]).is_err());
}
