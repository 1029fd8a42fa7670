//! Turns a classified link into a file in the downloads directory.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::{debug, info, trace};

use crate::{
    catalog::{CatalogClient, CollectionInfo},
    downloader::MediaFetcher,
    error::ConvertError,
    helpers::{archive::zip_dir, sanitize::sanitize, temp_dir::TempDir},
    link::{Kind, ParsedUrl, Provider},
};

const SPOTIFY_EXTENSION: &str = "ogg";
const YOUTUBE_EXTENSION: &str = "webm";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    /// File name relative to the downloads directory.
    pub output_filename: String,
    pub display_title: String,
}

#[derive(Debug, Clone)]
struct ProviderServices {
    catalog: Arc<dyn CatalogClient>,
    fetcher: Arc<dyn MediaFetcher>,
}

/// One collection member to fetch into the staging directory.
#[derive(Debug)]
struct MemberJob {
    source: String,
    file_name: String,
}

#[derive(Debug, Clone)]
pub struct Converter {
    downloads_dir: PathBuf,
    youtube: ProviderServices,
    spotify: Option<ProviderServices>,
}

impl Converter {
    pub fn new<P: AsRef<Path>>(
        downloads_dir: P,
        youtube_catalog: Arc<dyn CatalogClient>,
        youtube_fetcher: Arc<dyn MediaFetcher>,
    ) -> Self {
        Self {
            downloads_dir: downloads_dir.as_ref().to_path_buf(),
            youtube: ProviderServices {
                catalog: youtube_catalog,
                fetcher: youtube_fetcher,
            },
            spotify: None,
        }
    }

    #[must_use]
    pub fn with_spotify(
        mut self,
        catalog: Arc<dyn CatalogClient>,
        fetcher: Arc<dyn MediaFetcher>,
    ) -> Self {
        self.spotify = Some(ProviderServices { catalog, fetcher });
        self
    }

    pub fn downloads_dir(&self) -> &Path {
        &self.downloads_dir
    }

    /// Catalog used for searches against `provider`, if that provider is
    /// available.
    pub fn catalog(&self, provider: Provider) -> Option<&Arc<dyn CatalogClient>> {
        match provider {
            Provider::YouTube => Some(&self.youtube.catalog),
            Provider::Spotify => self.spotify.as_ref().map(|x| &x.catalog),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn convert(
        &self,
        parsed: &ParsedUrl,
        original_url: &str,
    ) -> Result<DownloadResult, ConvertError> {
        let ParsedUrl::Recognized {
            provider,
            kind,
            native_id,
        } = parsed
        else {
            return Err(ConvertError::unsupported_url());
        };

        let res = match (provider, kind) {
            (Provider::Spotify, Kind::Item) => self.spotify_item(native_id, original_url).await,
            (Provider::Spotify, Kind::Collection) => self.spotify_collection(native_id).await,
            (Provider::YouTube, Kind::Item) => self.youtube_item(original_url).await,
            (Provider::YouTube, Kind::Collection) => self.youtube_collection(original_url).await,
        }?;

        info!(file = %res.output_filename, "Conversion finished");

        Ok(res)
    }

    fn spotify(&self) -> Result<&ProviderServices, ConvertError> {
        self.spotify
            .as_ref()
            .ok_or(ConvertError::ProviderUnconfigured)
    }

    async fn spotify_item(
        &self,
        track_id: &str,
        original_url: &str,
    ) -> Result<DownloadResult, ConvertError> {
        let spotify = self.spotify()?;

        let track = spotify
            .catalog
            .lookup_item(track_id)
            .await
            .map_err(ConvertError::CatalogUnavailable)?;

        let title = artist_and_title(track.artist.as_deref(), &track.title);
        let file_name = format!("{}.{SPOTIFY_EXTENSION}", sanitize(&title));

        self.fetch_single(spotify.fetcher.as_ref(), original_url, file_name, title)
            .await
    }

    async fn spotify_collection(&self, playlist_id: &str) -> Result<DownloadResult, ConvertError> {
        let spotify = self.spotify()?;

        let playlist = spotify
            .catalog
            .lookup_collection(playlist_id)
            .await
            .map_err(ConvertError::CatalogUnavailable)?;

        let jobs = playlist
            .members
            .iter()
            .map(|member| {
                let Some(id) = member.native_id.as_deref() else {
                    return Err(ConvertError::CatalogUnavailable(anyhow::anyhow!(
                        "Playlist entry {:?} has no track id",
                        member.title
                    )));
                };

                let title = artist_and_title(member.artist.as_deref(), &member.title);

                Ok(MemberJob {
                    source: format!("spotify:track:{id}"),
                    file_name: format!("{}.{SPOTIFY_EXTENSION}", sanitize(&title)),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.archive_collection(&playlist, jobs, spotify.fetcher.as_ref())
            .await
    }

    async fn youtube_item(&self, original_url: &str) -> Result<DownloadResult, ConvertError> {
        let video = self
            .youtube
            .catalog
            .lookup_item(original_url)
            .await
            .map_err(ConvertError::CatalogUnavailable)?;

        let file_name = format!("{}.{YOUTUBE_EXTENSION}", sanitize(&video.title));

        self.fetch_single(
            self.youtube.fetcher.as_ref(),
            original_url,
            file_name,
            video.title,
        )
        .await
    }

    async fn youtube_collection(&self, original_url: &str) -> Result<DownloadResult, ConvertError> {
        let playlist = self
            .youtube
            .catalog
            .lookup_collection(original_url)
            .await
            .map_err(ConvertError::CatalogUnavailable)?;

        // Every entry is fetched from the playlist link itself; entries carry
        // no per-video link of their own here.
        let jobs = playlist
            .members
            .iter()
            .map(|member| MemberJob {
                source: original_url.to_owned(),
                file_name: format!("{}.{YOUTUBE_EXTENSION}", sanitize(&member.title)),
            })
            .collect();

        self.archive_collection(&playlist, jobs, self.youtube.fetcher.as_ref())
            .await
    }

    async fn fetch_single(
        &self,
        fetcher: &dyn MediaFetcher,
        source: &str,
        file_name: String,
        display_title: String,
    ) -> Result<DownloadResult, ConvertError> {
        let output_path = self.downloads_dir.join(&file_name);
        debug!(?output_path, "Fetching single item");

        let written = fetcher
            .fetch_to_file(source, &output_path)
            .await
            .map_err(ConvertError::FetchFailed)?;

        // Fetchers may settle on a different extension than asked for.
        let output_filename = written
            .file_name()
            .map_or(file_name, |x| x.to_string_lossy().into_owned());

        Ok(DownloadResult {
            output_filename,
            display_title,
        })
    }

    /// Fetch every member into a private staging directory, then zip it into
    /// the downloads directory. The staging directory is gone once this
    /// returns, whether or not it succeeded.
    async fn archive_collection(
        &self,
        collection: &CollectionInfo,
        jobs: Vec<MemberJob>,
        fetcher: &dyn MediaFetcher,
    ) -> Result<DownloadResult, ConvertError> {
        let base_name = sanitize(&collection.title);
        let staging = TempDir::with_prefix_in(&self.downloads_dir, format!("{base_name}-"))?;
        debug!(staging = ?staging.path(), members = jobs.len(), "Fetching collection");

        for (i, job) in jobs.iter().enumerate() {
            trace!(i, file = %job.file_name, "Fetching collection member");

            fetcher
                .fetch_to_file(&job.source, &staging.path().join(&job.file_name))
                .await
                .map_err(ConvertError::FetchFailed)?;
        }

        let archive_name = format!("{base_name}.zip");
        zip_dir(
            staging.path().to_path_buf(),
            self.downloads_dir.join(&archive_name),
        )
        .await?;

        drop(staging);

        Ok(DownloadResult {
            output_filename: archive_name,
            display_title: collection.title.clone(),
        })
    }
}

fn artist_and_title(artist: Option<&str>, title: &str) -> String {
    format!("{} - {title}", artist.unwrap_or_default())
}
