pub(super) mod spotdl;
pub(super) mod ytdlp;

use std::{
    path::{Path, PathBuf},
    process::{Output, Stdio},
};

use tokio::process::Command;
use tracing::{trace, warn};

#[async_trait::async_trait]
pub trait MediaFetcher: std::fmt::Debug + Send + Sync {
    /// Fetch the audio named by `source` (a link or provider reference) and
    /// store it at `output_path`. Returns where the file actually ended up,
    /// which may differ in extension from what was asked for.
    async fn fetch_to_file(&self, source: &str, output_path: &Path) -> anyhow::Result<PathBuf>;
}

/// Run an external tool to completion, turning a non-zero exit into an error
/// that carries the tool's stderr.
async fn run_tool(tool: &str, cmd: &mut Command) -> anyhow::Result<Output> {
    let output = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run {tool}: {e}"))?;

    trace!(tool, status = ?output.status, "Command finished");

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!(tool, %stderr, "Command failed");
        anyhow::bail!(
            "{tool} exited with code {:?}: {}",
            output.status.code(),
            stderr.trim()
        );
    }

    Ok(output)
}
