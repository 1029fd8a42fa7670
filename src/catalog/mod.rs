//! Metadata lookups against the remote catalogs.

mod spotify;
mod youtube;

use serde::Serialize;

pub use spotify::SpotifyCatalog;
pub use youtube::YtDlpCatalog;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemInfo {
    pub title: String,
    pub artist: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    pub title: String,
    /// Only Spotify reports an artist.
    pub artist: Option<String>,
    pub native_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionInfo {
    pub title: String,
    /// In catalog order.
    pub members: Vec<MemberInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub url: String,
}

#[async_trait::async_trait]
pub trait CatalogClient: std::fmt::Debug + Send + Sync {
    /// `reference` is whatever the provider resolves: a Spotify track id, or
    /// the original link for yt-dlp.
    async fn lookup_item(&self, reference: &str) -> anyhow::Result<ItemInfo>;

    async fn lookup_collection(&self, reference: &str) -> anyhow::Result<CollectionInfo>;

    async fn search(&self, query: &str) -> anyhow::Result<Vec<SearchHit>>;
}
