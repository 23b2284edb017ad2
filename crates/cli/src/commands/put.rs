//! put command - Upload to one tier
//!
//! Uploads a local file (size-verified) or stdin under a key.

use std::path::Path;

use clap::Args;
use serde::Serialize;
use ss33_core::{ObjectBody, ObjectStore as _, StorageSet, Tier, put_file};

use super::{location, open_tier};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Upload a local file or stdin
#[derive(Args, Debug)]
pub struct PutArgs {
    /// Target tier: permanent or cache
    pub tier: Tier,

    /// Object key
    pub key: String,

    /// Local file to upload, or '-' for stdin
    pub source: String,
}

#[derive(Debug, Serialize)]
struct PutOutput {
    status: &'static str,
    tier: Tier,
    bucket: String,
    key: String,
    size_bytes: u64,
    size_human: String,
}

/// Execute the put command
pub async fn execute(
    args: PutArgs,
    storage_set: &StorageSet,
    output_config: OutputConfig,
) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let store = match open_tier(storage_set, args.tier, &formatter).await {
        Ok(s) => s,
        Err(code) => return code,
    };

    let result = if args.source == "-" {
        store
            .put(&args.key, ObjectBody::from_reader(tokio::io::stdin()))
            .await
    } else {
        put_file(&store, &args.key, Path::new(&args.source)).await
    };

    let target = location(args.tier, store.bucket(), &args.key);
    match result {
        Ok(size) => {
            let size_human = humansize::format_size(size, humansize::BINARY);
            if formatter.is_json() {
                formatter.json(&PutOutput {
                    status: "success",
                    tier: args.tier,
                    bucket: store.bucket().to_string(),
                    key: args.key,
                    size_bytes: size,
                    size_human,
                });
            } else {
                formatter.success(&format!("Uploaded {} -> {target} ({size_human})", args.source));
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Failed to upload {target}: {e}"));
            ExitCode::from_error(&e)
        }
    }
}
