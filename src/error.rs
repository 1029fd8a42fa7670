use thiserror::Error;

const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

/// Why a conversion did not produce a file.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The link is missing or not one we know how to handle.
    #[error("{0}")]
    InvalidInput(&'static str),

    #[error("Spotify downloads are not configured")]
    ProviderUnconfigured,

    #[error("Failed to get media information: {0:#}")]
    CatalogUnavailable(anyhow::Error),

    #[error("Download failed: {0:#}")]
    FetchFailed(anyhow::Error),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl ConvertError {
    pub const fn missing_url() -> Self {
        Self::InvalidInput("Please provide a valid URL")
    }

    pub const fn unsupported_url() -> Self {
        Self::InvalidInput("Invalid URL. Please provide a YouTube or Spotify link")
    }

    /// Text shown on the page. Unexpected failures stay generic unless the
    /// server runs in debug mode.
    pub fn user_message(&self, debug: bool) -> String {
        match self {
            Self::Unexpected(e) if debug => format!("{e:#}"),
            Self::Unexpected(_) => UNEXPECTED_MESSAGE.to_owned(),
            _ => self.to_string(),
        }
    }
}

impl From<std::io::Error> for ConvertError {
    fn from(e: std::io::Error) -> Self {
        Self::Unexpected(e.into())
    }
}
