//! Decide which provider and what kind of entity a submitted link names.

use std::fmt::Display;

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static SPOTIFY_PLAYLIST_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/playlist/(?<id>[^/?#]+)").expect("Invalid regex"));
static SPOTIFY_TRACK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/track/(?<id>[^/?#]+)").expect("Invalid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    YouTube,
    Spotify,
}
impl Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::YouTube => f.write_str("youtube"),
            Self::Spotify => f.write_str("spotify"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Item,
    Collection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedUrl {
    Unrecognized,
    Recognized {
        provider: Provider,
        kind: Kind,
        /// Never empty.
        native_id: String,
    },
}
impl ParsedUrl {
    fn recognized(provider: Provider, kind: Kind, native_id: &str) -> Self {
        if native_id.is_empty() {
            return Self::Unrecognized;
        }

        Self::Recognized {
            provider,
            kind,
            native_id: native_id.to_owned(),
        }
    }

    pub const fn provider(&self) -> Option<Provider> {
        match self {
            Self::Unrecognized => None,
            Self::Recognized { provider, .. } => Some(*provider),
        }
    }

    pub const fn kind(&self) -> Option<Kind> {
        match self {
            Self::Unrecognized => None,
            Self::Recognized { kind, .. } => Some(*kind),
        }
    }

    pub fn native_id(&self) -> Option<&str> {
        match self {
            Self::Unrecognized => None,
            Self::Recognized { native_id, .. } => Some(native_id),
        }
    }
}

/// Classify a raw, possibly malformed, link. Never fails; anything that is
/// not understood comes back as [`ParsedUrl::Unrecognized`].
pub fn classify(raw: &str) -> ParsedUrl {
    let Ok(url) = Url::parse(raw.trim()) else {
        return ParsedUrl::Unrecognized;
    };

    let host = url.host_str().unwrap_or_default();

    if host.contains("spotify.com") {
        return classify_spotify(&url);
    }

    if let Some(list) = first_query_value(&url, "list") {
        return ParsedUrl::recognized(Provider::YouTube, Kind::Collection, &list);
    }

    if host.contains("youtu.be") {
        let id = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default();

        return ParsedUrl::recognized(Provider::YouTube, Kind::Item, id);
    }

    if host.contains("youtube.com") {
        if let Some(v) = first_query_value(&url, "v") {
            return ParsedUrl::recognized(Provider::YouTube, Kind::Item, &v);
        }
    }

    ParsedUrl::Unrecognized
}

fn classify_spotify(url: &Url) -> ParsedUrl {
    let path = url.path();

    let captured = |re: &Regex| {
        re.captures(path)
            .and_then(|x| x.name("id"))
            .map(|x| x.as_str().to_owned())
    };

    if let Some(id) = captured(&SPOTIFY_PLAYLIST_REGEX) {
        return ParsedUrl::recognized(Provider::Spotify, Kind::Collection, &id);
    }

    if let Some(id) = captured(&SPOTIFY_TRACK_REGEX) {
        return ParsedUrl::recognized(Provider::Spotify, Kind::Item, &id);
    }

    ParsedUrl::Unrecognized
}

fn first_query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, v)| k == key && !v.is_empty())
        .map(|(_, v)| v.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recognized(provider: Provider, kind: Kind, id: &str) -> ParsedUrl {
        ParsedUrl::Recognized {
            provider,
            kind,
            native_id: id.to_owned(),
        }
    }

    #[test]
    fn youtube_short_link() {
        assert_eq!(
            classify("https://youtu.be/abc123"),
            recognized(Provider::YouTube, Kind::Item, "abc123")
        );
        assert_eq!(
            classify("https://youtu.be/abc123?si=share"),
            recognized(Provider::YouTube, Kind::Item, "abc123")
        );
    }

    #[test]
    fn youtube_long_link() {
        assert_eq!(
            classify("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42"),
            recognized(Provider::YouTube, Kind::Item, "dQw4w9WgXcQ")
        );
        assert_eq!(
            classify("https://music.youtube.com/watch?v=abc"),
            recognized(Provider::YouTube, Kind::Item, "abc")
        );
    }

    #[test]
    fn list_parameter_wins_over_v() {
        let links = [
            "https://www.youtube.com/playlist?list=PL123",
            "https://www.youtube.com/watch?v=abc&list=PL123",
            "https://www.youtube.com/watch?list=PL123&v=abc",
            "https://youtu.be/abc?list=PL123",
            "https://example.com/anything?list=PL123",
        ];

        for link in links {
            assert_eq!(
                classify(link),
                recognized(Provider::YouTube, Kind::Collection, "PL123"),
                "link: {link}"
            );
        }
    }

    #[test]
    fn first_list_value_is_used() {
        assert_eq!(
            classify("https://www.youtube.com/playlist?list=first&list=second"),
            recognized(Provider::YouTube, Kind::Collection, "first")
        );
    }

    #[test]
    fn spotify_track() {
        assert_eq!(
            classify("https://open.spotify.com/track/XYZ?si=foo"),
            recognized(Provider::Spotify, Kind::Item, "XYZ")
        );
        assert_eq!(
            classify("https://open.spotify.com/intl-de/track/XYZ/"),
            recognized(Provider::Spotify, Kind::Item, "XYZ")
        );
    }

    #[test]
    fn spotify_playlist() {
        assert_eq!(
            classify("https://open.spotify.com/playlist/ABC"),
            recognized(Provider::Spotify, Kind::Collection, "ABC")
        );
        assert_eq!(
            classify("https://open.spotify.com/playlist/ABC?si=1&list=PL9"),
            recognized(Provider::Spotify, Kind::Collection, "ABC")
        );
    }

    #[test]
    fn spotify_without_known_path_is_unrecognized() {
        assert_eq!(
            classify("https://open.spotify.com/album/ABC"),
            ParsedUrl::Unrecognized
        );
        assert_eq!(
            classify("https://open.spotify.com/album/ABC?list=PL1"),
            ParsedUrl::Unrecognized
        );
        assert_eq!(
            classify("https://open.spotify.com/track/"),
            ParsedUrl::Unrecognized
        );
    }

    #[test]
    fn garbage_is_unrecognized() {
        for raw in [
            "",
            "   ",
            "not a url",
            "youtube.com/watch?v=abc",
            "https://",
            "https://www.youtube.com/watch",
            "https://www.youtube.com/watch?v=",
            "https://youtu.be/",
            "https://example.com/watch?v=abc",
            "mailto:someone@example.com",
        ] {
            assert_eq!(classify(raw), ParsedUrl::Unrecognized, "raw: {raw:?}");
        }
    }

    #[test]
    fn accessors() {
        let parsed = classify("https://youtu.be/abc123");
        assert_eq!(parsed.provider(), Some(Provider::YouTube));
        assert_eq!(parsed.kind(), Some(Kind::Item));
        assert_eq!(parsed.native_id(), Some("abc123"));

        let parsed = classify("nope");
        assert_eq!(parsed.provider(), None);
        assert_eq!(parsed.kind(), None);
        assert_eq!(parsed.native_id(), None);
    }
}
