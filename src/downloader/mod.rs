mod handlers;

pub use handlers::{spotdl::SpotdlFetcher, ytdlp::YtDlpFetcher, MediaFetcher};
