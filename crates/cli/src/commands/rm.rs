//! rm command - Remove an object from one tier
//!
//! Removing a key that does not exist succeeds.

use clap::Args;
use serde::Serialize;
use ss33_core::{ObjectStore as _, StorageSet, Tier};

use super::{location, open_tier};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Remove an object
#[derive(Args, Debug)]
pub struct RmArgs {
    /// Tier: permanent or cache
    pub tier: Tier,

    /// Object key
    pub key: String,
}

#[derive(Debug, Serialize)]
struct RmOutput {
    status: &'static str,
    tier: Tier,
    bucket: String,
    key: String,
}

/// Execute the rm command
pub async fn execute(
    args: RmArgs,
    storage_set: &StorageSet,
    output_config: OutputConfig,
) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let store = match open_tier(storage_set, args.tier, &formatter).await {
        Ok(s) => s,
        Err(code) => return code,
    };
    let target = location(args.tier, store.bucket(), &args.key);

    match store.delete(&args.key).await {
        Ok(()) => {
            if formatter.is_json() {
                formatter.json(&RmOutput {
                    status: "success",
                    tier: args.tier,
                    bucket: store.bucket().to_string(),
                    key: args.key,
                });
            } else {
                formatter.success(&format!("Removed {target}"));
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Failed to remove {target}: {e}"));
            ExitCode::from_error(&e)
        }
    }
}
