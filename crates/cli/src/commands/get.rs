//! get command - Download from one tier
//!
//! Streams an object to a local file or stdout. A failed or short download
//! to a file leaves no file behind.

use std::path::{Path, PathBuf};

use clap::Args;
use ss33_core::{Error, ObjectStore as _, StorageSet, Tier};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::{location, open_tier};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

const COPY_BUF_SIZE: usize = 64 * 1024;

/// Download an object
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Source tier: permanent or cache
    pub tier: Tier,

    /// Object key
    pub key: String,

    /// Destination file; stdout when omitted or '-'
    pub target: Option<PathBuf>,
}

/// Execute the get command
pub async fn execute(
    args: GetArgs,
    storage_set: &StorageSet,
    output_config: OutputConfig,
) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let store = match open_tier(storage_set, args.tier, &formatter).await {
        Ok(s) => s,
        Err(code) => return code,
    };
    let source = location(args.tier, store.bucket(), &args.key);

    let mut reader = match store.get(&args.key).await {
        Ok(r) => r,
        Err(e) => {
            formatter.error(&format!("Failed to get {source}: {e}"));
            return ExitCode::from_error(&e);
        }
    };
    let declared = reader.size();

    let target = args.target.filter(|path| path.as_os_str() != "-");
    let result = match &target {
        Some(path) => download_to_file(&mut reader, path, declared).await,
        None => copy_to(&mut reader, &mut tokio::io::stdout())
            .await
            .and_then(|copied| check_size(declared, copied)),
    };

    let copied = match result {
        Ok(n) => n,
        Err(e) => {
            formatter.error(&format!("Failed to download {source}: {e}"));
            return ExitCode::from_error(&e);
        }
    };

    if let Some(path) = target {
        formatter.success(&format!(
            "Downloaded {source} -> {} ({})",
            path.display(),
            humansize::format_size(copied, humansize::BINARY)
        ));
    }
    ExitCode::Success
}

/// Write the object to `path`, removing the file again if the download
/// fails or comes back short
async fn download_to_file<R>(reader: &mut R, path: &Path, declared: u64) -> Result<u64, Error>
where
    R: AsyncRead + Unpin,
{
    let mut file = tokio::fs::File::create(path).await?;
    let result = copy_to(reader, &mut file)
        .await
        .and_then(|copied| check_size(declared, copied));
    drop(file);

    if result.is_err()
        && let Err(e) = tokio::fs::remove_file(path).await
    {
        tracing::warn!(path = %path.display(), error = %e, "failed to remove partial download");
    }
    result
}

fn check_size(declared: u64, copied: u64) -> Result<u64, Error> {
    if copied != declared {
        return Err(Error::Transport(format!(
            "download truncated: expected {declared} bytes, received {copied}"
        )));
    }
    Ok(copied)
}

/// Stream `reader` into `writer`
///
/// Read failures come from the store and are `Error::Transport`; write
/// failures are local and surface as `Error::LocalIo`.
async fn copy_to<R, W>(reader: &mut R, writer: &mut W) -> Result<u64, Error>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; COPY_BUF_SIZE];
    let mut copied = 0u64;
    loop {
        let n = reader
            .read(&mut buf)
            .await
            .map_err(|e| Error::Transport(format!("Failed to read object stream: {e}")))?;
        if n == 0 {
            break;
        }
        writer.write_all(&buf[..n]).await?;
        copied += n as u64;
    }
    writer.flush().await?;
    Ok(copied)
}
