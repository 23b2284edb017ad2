//! purge command - Remove an object from both tiers
//!
//! Both deletes are always attempted. The command fails when either tier
//! could not confirm the delete, and reports which.

use clap::Args;
use serde::Serialize;
use ss33_core::{PurgeReport, StorageSet, Tier};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Remove an object from both tiers
#[derive(Args, Debug)]
pub struct PurgeArgs {
    /// Object key
    pub key: String,
}

#[derive(Debug, Serialize)]
struct TierOutcome {
    tier: Tier,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct PurgeOutput {
    status: &'static str,
    key: String,
    tiers: Vec<TierOutcome>,
}

impl PurgeOutput {
    fn from_report(report: &PurgeReport) -> Self {
        let tiers = Tier::ALL
            .into_iter()
            .map(|tier| match report.tier(tier) {
                Ok(()) => TierOutcome {
                    tier,
                    status: "removed",
                    error: None,
                },
                Err(e) => TierOutcome {
                    tier,
                    status: "failed",
                    error: Some(e.to_string()),
                },
            })
            .collect();

        Self {
            status: if report.is_complete() { "success" } else { "partial" },
            key: report.key.clone(),
            tiers,
        }
    }
}

/// Execute the purge command
pub async fn execute(
    args: PurgeArgs,
    storage_set: &StorageSet,
    output_config: OutputConfig,
) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let tiers = match ss33_s3::connect(storage_set).await {
        Ok(t) => t,
        Err(e) => {
            formatter.error(&format!("Failed to create S3 clients: {e}"));
            return ExitCode::from_error(&e);
        }
    };

    let report = tiers.purge(&args.key).await;
    let output = PurgeOutput::from_report(&report);

    if formatter.is_json() {
        formatter.json(&output);
    } else {
        for outcome in &output.tiers {
            match &outcome.error {
                None => formatter.success(&format!("Removed {} from {}", args.key, outcome.tier)),
                Some(e) => formatter.error(&format!(
                    "Failed to remove {} from {}: {e}",
                    args.key, outcome.tier
                )),
            }
        }
    }

    exit_code_for(report)
}

/// Success only when both tiers confirmed; a single failed tier is partial
fn exit_code_for(report: PurgeReport) -> ExitCode {
    let failed = report.failed_tiers().len();
    match report.into_result() {
        Ok(()) => ExitCode::Success,
        Err(_) if failed < Tier::ALL.len() => ExitCode::PartialFailure,
        Err(e) => ExitCode::from_error(&e),
    }
}
