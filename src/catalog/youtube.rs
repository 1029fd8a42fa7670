use std::{
    path::{Path, PathBuf},
    process::Stdio,
};

use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, trace, warn};

use super::{CatalogClient, CollectionInfo, ItemInfo, MemberInfo, SearchHit};

const SEARCH_LIMIT: usize = 5;

/// Subset of `yt-dlp --dump-single-json` we care about.
#[derive(Debug, Deserialize)]
struct YtDlpInfo {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    entries: Option<Vec<YtDlpEntry>>,
}

#[derive(Debug, Deserialize)]
struct YtDlpEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    uploader: Option<String>,
}

/// Video and playlist metadata resolved by running `yt-dlp` without
/// downloading anything.
#[derive(Debug)]
pub struct YtDlpCatalog {
    binary: PathBuf,
}

#[async_trait::async_trait]
impl CatalogClient for YtDlpCatalog {
    #[tracing::instrument(skip(self))]
    async fn lookup_item(&self, reference: &str) -> anyhow::Result<ItemInfo> {
        debug!("Looking up video");
        let info = self.dump_json(&["--no-playlist"], reference).await?;

        Ok(ItemInfo {
            title: info.title.unwrap_or_default(),
            artist: None,
        })
    }

    #[tracing::instrument(skip(self))]
    async fn lookup_collection(&self, reference: &str) -> anyhow::Result<CollectionInfo> {
        debug!("Looking up playlist");
        let info = self.dump_json(&["--flat-playlist"], reference).await?;

        collection_from_info(info)
    }

    #[tracing::instrument(skip(self))]
    async fn search(&self, query: &str) -> anyhow::Result<Vec<SearchHit>> {
        debug!("Searching videos");
        let target = format!("ytsearch{SEARCH_LIMIT}:{query}");
        let info = self.dump_json(&["--flat-playlist"], &target).await?;

        Ok(info
            .entries
            .unwrap_or_default()
            .into_iter()
            .filter_map(search_hit)
            .collect())
    }
}

impl YtDlpCatalog {
    pub fn new<P: AsRef<Path>>(binary: P) -> Self {
        Self {
            binary: binary.as_ref().to_path_buf(),
        }
    }

    async fn dump_json(&self, extra_args: &[&str], target: &str) -> anyhow::Result<YtDlpInfo> {
        let output = Command::new(&self.binary)
            .args(["--dump-single-json", "--quiet", "--no-warnings"])
            .args(extra_args)
            .arg("--")
            .arg(target)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        trace!(status = ?output.status, "yt-dlp finished");

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(%stderr, "yt-dlp metadata lookup failed");
            anyhow::bail!("Failed to get video info: {}", stderr.trim());
        }

        serde_json::from_slice::<YtDlpInfo>(&output.stdout).map_err(std::convert::Into::into)
    }
}

fn collection_from_info(info: YtDlpInfo) -> anyhow::Result<CollectionInfo> {
    let Some(entries) = info.entries else {
        anyhow::bail!("Link does not point to a playlist");
    };

    let members = entries
        .into_iter()
        .map(|entry| MemberInfo {
            title: entry.title.unwrap_or_default(),
            artist: None,
            native_id: entry.id,
        })
        .collect();

    Ok(CollectionInfo {
        title: info.title.unwrap_or_default(),
        members,
    })
}

fn search_hit(entry: YtDlpEntry) -> Option<SearchHit> {
    let id = entry.id?;
    let url = entry
        .url
        .unwrap_or_else(|| format!("https://www.youtube.com/watch?v={id}"));

    Some(SearchHit {
        title: entry.title.unwrap_or_default(),
        artist: entry.channel.or(entry.uploader).unwrap_or_default(),
        id,
        url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playlist_entries_keep_order() {
        let info: YtDlpInfo = serde_json::from_str(
            r#"{
                "_type": "playlist",
                "id": "PL123",
                "title": "Chill Mix",
                "entries": [
                    {"_type": "url", "id": "v1", "title": "First", "url": "https://www.youtube.com/watch?v=v1"},
                    {"_type": "url", "id": "v2"},
                    {"_type": "url", "id": "v3", "title": "Third"}
                ]
            }"#,
        )
        .expect("parse");

        let collection = collection_from_info(info).expect("collection");

        assert_eq!(collection.title, "Chill Mix");
        let titles = collection
            .members
            .iter()
            .map(|x| x.title.as_str())
            .collect::<Vec<_>>();
        assert_eq!(titles, ["First", "", "Third"]);
        assert!(collection.members.iter().all(|x| x.artist.is_none()));
    }

    #[test]
    fn single_video_is_not_a_collection() {
        let info: YtDlpInfo =
            serde_json::from_str(r#"{"id": "v1", "title": "Only one", "duration": 212}"#)
                .expect("parse");

        assert!(collection_from_info(info).is_err());
    }

    #[test]
    fn search_entries_become_hits() {
        let entry: YtDlpEntry = serde_json::from_str(
            r#"{"id": "v1", "title": "Song", "uploader": "Uploader", "channel": "Channel"}"#,
        )
        .expect("parse");

        let hit = search_hit(entry).expect("hit");
        assert_eq!(hit.artist, "Channel");
        assert_eq!(hit.url, "https://www.youtube.com/watch?v=v1");
    }

    #[tokio::test]
    async fn missing_binary_is_an_error() {
        let catalog = YtDlpCatalog::new("/nonexistent/yt-dlp");

        assert!(catalog
            .lookup_item("https://youtu.be/abc123")
            .await
            .is_err());
    }
}
