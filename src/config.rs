use std::{
    env,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};

use anyhow::Context;
use tracing::info;

const DEFAULT_PORT: u16 = 8000;

#[derive(Clone, PartialEq, Eq)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}
impl std::fmt::Debug for SpotifyCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Runtime settings, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    /// Application root. Downloads and static assets live below it.
    pub root: PathBuf,
    /// Show raw error messages to users.
    pub debug: bool,
    pub ytdlp_bin: PathBuf,
    pub spotdl_bin: PathBuf,
    /// `None` when either credential is missing; Spotify links are then
    /// refused.
    pub spotify: Option<SpotifyCredentials>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|x| !x.trim().is_empty());

        let host = match var("AUDIOGRAB_HOST") {
            Some(x) => x
                .trim()
                .parse::<IpAddr>()
                .context("AUDIOGRAB_HOST must be a valid IPv4 or IPv6 address")?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        let port = match var("AUDIOGRAB_PORT") {
            Some(x) => x
                .trim()
                .parse::<u16>()
                .context("AUDIOGRAB_PORT must be a number between 0 and 65535")?,
            None => DEFAULT_PORT,
        };

        let root = match var("AUDIOGRAB_ROOT") {
            Some(x) => PathBuf::from(x),
            None => env::current_dir().context("Failed to determine working directory")?,
        };

        let debug = var("AUDIOGRAB_DEBUG").is_some_and(|x| {
            matches!(x.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
        });

        let spotify = match (var("SPOTIFY_CLIENT_ID"), var("SPOTIFY_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Some(SpotifyCredentials {
                client_id,
                client_secret,
            }),
            _ => None,
        };

        Ok(Self {
            host,
            port,
            root,
            debug,
            ytdlp_bin: var("YTDLP_BIN").unwrap_or_else(|| "yt-dlp".into()).into(),
            spotdl_bin: var("SPOTDL_BIN").unwrap_or_else(|| "spotdl".into()).into(),
            spotify,
        })
    }

    pub const fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.root.join("downloads")
    }

    pub fn static_dir(&self) -> PathBuf {
        self.root.join("static")
    }

    /// Create the downloads directory if needed and return its path.
    pub fn ensure_downloads_dir(&self) -> anyhow::Result<PathBuf> {
        let dir = self.downloads_dir();

        if !dir.is_dir() {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create downloads directory {dir:?}"))?;
            info!(?dir, "Created downloads directory");
        }

        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect::<HashMap<_, _>>();

        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config_from(&[("AUDIOGRAB_ROOT", "/srv/audiograb")]).expect("config");

        assert_eq!(config.bind_addr(), "0.0.0.0:8000".parse().expect("addr"));
        assert_eq!(config.downloads_dir(), PathBuf::from("/srv/audiograb/downloads"));
        assert_eq!(config.ytdlp_bin, PathBuf::from("yt-dlp"));
        assert_eq!(config.spotdl_bin, PathBuf::from("spotdl"));
        assert!(!config.debug);
        assert!(config.spotify.is_none());
    }

    #[test]
    fn spotify_needs_both_credentials() {
        let config = config_from(&[("AUDIOGRAB_ROOT", "/tmp"), ("SPOTIFY_CLIENT_ID", "id")])
            .expect("config");
        assert!(config.spotify.is_none());

        let config = config_from(&[
            ("AUDIOGRAB_ROOT", "/tmp"),
            ("SPOTIFY_CLIENT_ID", "id"),
            ("SPOTIFY_CLIENT_SECRET", ""),
        ])
        .expect("config");
        assert!(config.spotify.is_none());

        let config = config_from(&[
            ("AUDIOGRAB_ROOT", "/tmp"),
            ("SPOTIFY_CLIENT_ID", "id"),
            ("SPOTIFY_CLIENT_SECRET", "secret"),
        ])
        .expect("config");
        let credentials = config.spotify.expect("credentials");
        assert_eq!(credentials.client_id, "id");
        assert!(!format!("{credentials:?}").contains("secret\""));
    }

    #[test]
    fn overrides() {
        let config = config_from(&[
            ("AUDIOGRAB_ROOT", "/tmp"),
            ("AUDIOGRAB_HOST", "127.0.0.1"),
            ("AUDIOGRAB_PORT", "9001"),
            ("AUDIOGRAB_DEBUG", "TRUE"),
            ("YTDLP_BIN", "/opt/yt-dlp"),
        ])
        .expect("config");

        assert_eq!(config.bind_addr(), "127.0.0.1:9001".parse().expect("addr"));
        assert!(config.debug);
        assert_eq!(config.ytdlp_bin, PathBuf::from("/opt/yt-dlp"));
    }

    #[test]
    fn bad_port_is_rejected() {
        assert!(config_from(&[("AUDIOGRAB_ROOT", "/tmp"), ("AUDIOGRAB_PORT", "http")]).is_err());
        assert!(config_from(&[("AUDIOGRAB_ROOT", "/tmp"), ("AUDIOGRAB_HOST", "localhost")]).is_err());
    }

    #[test]
    fn downloads_dir_is_created() {
        let root = tempfile::tempdir().expect("tempdir");
        let config = config_from(&[("AUDIOGRAB_ROOT", root.path().to_str().expect("utf-8 path"))])
            .expect("config");

        let dir = config.ensure_downloads_dir().expect("create");

        assert!(dir.is_dir());
        assert_eq!(dir, root.path().join("downloads"));
        config.ensure_downloads_dir().expect("idempotent");
    }
}
