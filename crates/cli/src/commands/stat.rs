//! stat command - Show object metadata

use std::fmt;

use clap::Args;
use serde::Serialize;
use ss33_core::{ObjectInfo, ObjectStore as _, StorageSet, Tier};

use super::{location, open_tier};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Show object metadata
#[derive(Args, Debug)]
pub struct StatArgs {
    /// Tier: permanent or cache
    pub tier: Tier,

    /// Object key
    pub key: String,
}

#[derive(Debug, Serialize)]
struct StatOutput {
    tier: Tier,
    bucket: String,
    #[serde(flatten)]
    info: ObjectInfo,
}

impl fmt::Display for StatOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name      : {}", location(self.tier, &self.bucket, &self.info.key))?;
        write!(
            f,
            "Size      : {} ({} bytes)",
            self.info.size_human, self.info.size_bytes
        )?;
        if let Some(etag) = &self.info.etag {
            write!(f, "\nETag      : {etag}")?;
        }
        if let Some(modified) = &self.info.last_modified {
            write!(f, "\nModified  : {modified}")?;
        }
        Ok(())
    }
}

/// Execute the stat command
pub async fn execute(
    args: StatArgs,
    storage_set: &StorageSet,
    output_config: OutputConfig,
) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let store = match open_tier(storage_set, args.tier, &formatter).await {
        Ok(s) => s,
        Err(code) => return code,
    };

    match store.head(&args.key).await {
        Ok(info) => {
            formatter.output(&StatOutput {
                tier: args.tier,
                bucket: store.bucket().to_string(),
                info,
            });
            ExitCode::Success
        }
        Err(e) => {
            let target = location(args.tier, store.bucket(), &args.key);
            formatter.error(&format!("Failed to stat {target}: {e}"));
            ExitCode::from_error(&e)
        }
    }
}
