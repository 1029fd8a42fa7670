use std::time::{Duration, Instant};

use serde::{de::DeserializeOwned, Deserialize};
use tokio::sync::Mutex;
use tracing::{debug, trace};
use url::Url;

use super::{CatalogClient, CollectionInfo, ItemInfo, MemberInfo, SearchHit};
use crate::config::SpotifyCredentials;

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const API_BASE: &str = "https://api.spotify.com/v1";
const SEARCH_LIMIT: &str = "5";
/// Tokens are refreshed this long before Spotify says they expire.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug)]
struct AccessToken {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct Artist {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct ExternalUrls {
    spotify: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Track {
    id: Option<String>,
    name: String,
    #[serde(default)]
    artists: Vec<Artist>,
    #[serde(default)]
    external_urls: ExternalUrls,
}
impl Track {
    fn first_artist(&self) -> String {
        self.artists
            .first()
            .map(|x| x.name.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct Paging<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    track: Option<Track>,
}

#[derive(Debug, Deserialize)]
struct Playlist {
    name: String,
    tracks: Paging<PlaylistItem>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: Paging<Track>,
}

/// Spotify Web API client authenticated with the client credentials flow.
#[derive(Debug)]
pub struct SpotifyCatalog {
    client: reqwest::Client,
    credentials: SpotifyCredentials,
    token: Mutex<Option<AccessToken>>,
}

#[async_trait::async_trait]
impl CatalogClient for SpotifyCatalog {
    #[tracing::instrument(skip(self))]
    async fn lookup_item(&self, reference: &str) -> anyhow::Result<ItemInfo> {
        debug!("Looking up track");
        let track = self
            .get_json::<Track>(api_url(&["tracks", reference])?, &[])
            .await?;

        Ok(item_from_track(&track))
    }

    #[tracing::instrument(skip(self))]
    async fn lookup_collection(&self, reference: &str) -> anyhow::Result<CollectionInfo> {
        debug!("Looking up playlist");
        let playlist = self
            .get_json::<Playlist>(api_url(&["playlists", reference])?, &[])
            .await?;

        let mut members = members_from_items(playlist.tracks.items);
        let mut next = playlist.tracks.next;

        while let Some(page_url) = next {
            trace!(?page_url, "Fetching next playlist page");
            let page = self
                .get_json::<Paging<PlaylistItem>>(Url::parse(&page_url)?, &[])
                .await?;

            members.extend(members_from_items(page.items));
            next = page.next;
        }

        debug!(members = members.len(), "Playlist resolved");

        Ok(CollectionInfo {
            title: playlist.name,
            members,
        })
    }

    #[tracing::instrument(skip(self))]
    async fn search(&self, query: &str) -> anyhow::Result<Vec<SearchHit>> {
        debug!("Searching tracks");
        let resp = self
            .get_json::<SearchResponse>(
                api_url(&["search"])?,
                &[("q", query), ("type", "track"), ("limit", SEARCH_LIMIT)],
            )
            .await?;

        Ok(resp.tracks.items.into_iter().filter_map(search_hit).collect())
    }
}

impl SpotifyCatalog {
    pub fn new(credentials: SpotifyCredentials) -> Self {
        Self {
            client: reqwest::Client::new(),
            credentials,
            token: Mutex::new(None),
        }
    }

    async fn access_token(&self) -> anyhow::Result<String> {
        let mut token = self.token.lock().await;

        if let Some(t) = token.as_ref().filter(|t| t.expires_at > Instant::now()) {
            return Ok(t.value.clone());
        }

        debug!("Requesting Spotify access token");
        let resp = self
            .client
            .post(TOKEN_URL)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?
            .error_for_status()?
            .json::<TokenResponse>()
            .await?;

        let lifetime = Duration::from_secs(resp.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        *token = Some(AccessToken {
            value: resp.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });

        Ok(resp.access_token)
    }

    async fn get_json<T>(&self, url: Url, query: &[(&str, &str)]) -> anyhow::Result<T>
    where
        T: DeserializeOwned,
    {
        let token = self.access_token().await?;

        trace!(url = url.as_str(), "Sending Spotify API request");
        self.client
            .get(url)
            .query(query)
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?
            .json::<T>()
            .await
            .map_err(std::convert::Into::into)
    }
}

fn api_url(segments: &[&str]) -> anyhow::Result<Url> {
    let mut url = Url::parse(API_BASE)?;
    url.path_segments_mut()
        .map_err(|()| anyhow::anyhow!("Invalid API URL"))?
        .extend(segments);

    Ok(url)
}

fn item_from_track(track: &Track) -> ItemInfo {
    ItemInfo {
        title: track.name.clone(),
        artist: Some(track.first_artist()),
    }
}

fn members_from_items(items: Vec<PlaylistItem>) -> Vec<MemberInfo> {
    items
        .into_iter()
        .filter_map(|x| x.track)
        .map(|track| MemberInfo {
            artist: Some(track.first_artist()),
            title: track.name,
            native_id: track.id,
        })
        .collect()
}

fn search_hit(track: Track) -> Option<SearchHit> {
    let artist = track.first_artist();
    let id = track.id?;
    let url = track
        .external_urls
        .spotify
        .unwrap_or_else(|| format!("https://open.spotify.com/track/{id}"));

    Some(SearchHit {
        id,
        title: track.name,
        artist,
        url,
    })
}
