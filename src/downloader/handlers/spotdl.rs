use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, trace};

use super::{run_tool, MediaFetcher};
use crate::{config::SpotifyCredentials, helpers::temp_dir::TempDir};

const FORMAT: &str = "ogg";
const BITRATE: &str = "320k";

/// Downloads Spotify tracks with the `spotdl` command line tool.
///
/// `spotdl` picks its own file names, so every call gets a private scratch
/// directory next to the output file and the single produced file is moved
/// into place.
#[derive(Debug)]
pub struct SpotdlFetcher {
    binary: PathBuf,
    credentials: SpotifyCredentials,
}

#[async_trait::async_trait]
impl MediaFetcher for SpotdlFetcher {
    #[tracing::instrument(skip(self))]
    async fn fetch_to_file(&self, source: &str, output_path: &Path) -> anyhow::Result<PathBuf> {
        debug!("Downloading track");

        let parent = output_path.parent().unwrap_or_else(|| Path::new("."));
        let temp_dir = TempDir::with_prefix_in(parent, "temp-")?;

        run_tool(
            "spotdl",
            Command::new(&self.binary)
                .arg("--client-id")
                .arg(&self.credentials.client_id)
                .arg("--client-secret")
                .arg(&self.credentials.client_secret)
                .arg("--output")
                .arg(temp_dir.path())
                .args(["--format", FORMAT])
                .args(["--bitrate", BITRATE])
                .arg(source),
        )
        .await?;

        let downloaded = first_file_in(temp_dir.path()).await?;
        trace!(from = ?downloaded, to = ?output_path, "Moving downloaded track into place");
        tokio::fs::rename(&downloaded, output_path).await?;

        debug!(?output_path, "Track downloaded");

        Ok(output_path.to_path_buf())
    }
}

impl SpotdlFetcher {
    pub fn new<P: AsRef<Path>>(binary: P, credentials: SpotifyCredentials) -> Self {
        Self {
            binary: binary.as_ref().to_path_buf(),
            credentials,
        }
    }
}

async fn first_file_in(dir: &Path) -> anyhow::Result<PathBuf> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            files.push(entry.path());
        }
    }

    files.sort();
    files
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("No file was downloaded"))
}
