use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::debug;

use super::{run_tool, MediaFetcher};

const EXTENSION: &str = "webm";

/// Downloads the best available audio stream with `yt-dlp`, stored as-is
/// in a `.webm` file.
#[derive(Debug)]
pub struct YtDlpFetcher {
    binary: PathBuf,
}

#[async_trait::async_trait]
impl MediaFetcher for YtDlpFetcher {
    #[tracing::instrument(skip(self))]
    async fn fetch_to_file(&self, source: &str, output_path: &Path) -> anyhow::Result<PathBuf> {
        let output_path = webm_path(output_path);
        debug!(?output_path, "Downloading audio");

        run_tool(
            "yt-dlp",
            Command::new(&self.binary)
                .args(["--format", "bestaudio/best"])
                .arg("--output")
                .arg(&output_path)
                .args(["--quiet", "--no-warnings"])
                .arg("--")
                .arg(source),
        )
        .await?;

        if !tokio::fs::try_exists(&output_path).await.unwrap_or(false) {
            anyhow::bail!("yt-dlp did not produce {}", output_path.display());
        }

        debug!("Audio downloaded");

        Ok(output_path)
    }
}

impl YtDlpFetcher {
    pub fn new<P: AsRef<Path>>(binary: P) -> Self {
        Self {
            binary: binary.as_ref().to_path_buf(),
        }
    }
}

/// `.webm` on its own is a file stem to `Path`, so only swap the extension
/// when the name does not already end in it.
fn webm_path(output_path: &Path) -> PathBuf {
    let already_webm = output_path
        .file_name()
        .is_some_and(|x| x.to_string_lossy().ends_with(&format!(".{EXTENSION}")));

    if already_webm {
        output_path.to_path_buf()
    } else {
        output_path.with_extension(EXTENSION)
    }
}
