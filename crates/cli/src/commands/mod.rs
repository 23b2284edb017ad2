//! CLI command definitions and execution
//!
//! Every command loads the storage set once, opens the S3 client(s) it
//! needs, and maps library errors to exit codes.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ss33_core::{ConfigLoader, Result, StorageSet, Tier};
use ss33_s3::S3Store;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

mod get;
mod purge;
mod put;
mod rm;
mod stat;

/// ss33 - dual-tier object storage CLI
///
/// Operates on the permanent and cache buckets described by a storage set
/// configuration file.
#[derive(Parser, Debug)]
#[command(name = "ss33")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Storage set configuration file (TOML, or JSON with a .json extension)
    #[arg(long, global = true, env = "SS33_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload a local file or stdin to one tier
    Put(put::PutArgs),

    /// Download an object from one tier
    Get(get::GetArgs),

    /// Remove an object from one tier (succeeds if already absent)
    Rm(rm::RmArgs),

    /// Show object metadata
    Stat(stat::StatArgs),

    /// Remove an object from both tiers
    Purge(purge::PurgeArgs),
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let output_config = OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        quiet: cli.quiet,
    };
    let formatter = Formatter::new(output_config.clone());

    let storage_set = match load_storage_set(cli.config) {
        Ok(set) => set,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from_error(&e);
        }
    };

    match cli.command {
        Commands::Put(args) => put::execute(args, &storage_set, output_config).await,
        Commands::Get(args) => get::execute(args, &storage_set, output_config).await,
        Commands::Rm(args) => rm::execute(args, &storage_set, output_config).await,
        Commands::Stat(args) => stat::execute(args, &storage_set, output_config).await,
        Commands::Purge(args) => purge::execute(args, &storage_set, output_config).await,
    }
}

fn load_storage_set(path: Option<PathBuf>) -> Result<StorageSet> {
    let loader = match path {
        Some(path) => ConfigLoader::with_path(path),
        None => ConfigLoader::new()?,
    };
    loader.load()
}

/// Open the client for one tier, reporting failures through the formatter
async fn open_tier(
    storage_set: &StorageSet,
    tier: Tier,
    formatter: &Formatter,
) -> std::result::Result<S3Store, ExitCode> {
    tracing::debug!(%tier, bucket = storage_set.tier(tier).bucket_name(), "opening tier");
    S3Store::for_tier(storage_set, tier).await.map_err(|e| {
        formatter.error(&format!("Failed to create {tier} client: {e}"));
        ExitCode::from_error(&e)
    })
}

/// Display form of an object location: tier/bucket/key
fn location(tier: Tier, bucket: &str, key: &str) -> String {
    format!("{tier}/{bucket}/{key}")
}
