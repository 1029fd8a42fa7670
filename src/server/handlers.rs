use std::path::{Component, Path as FsPath, PathBuf};

use axum::{
    body::Body,
    extract::{rejection::FormRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use tracing::{error, info, trace, warn};

use super::{mime::content_type_for, pages, AppState};
use crate::{
    catalog::SearchHit,
    error::ConvertError,
    link::{classify, Provider},
};

#[derive(Debug, Deserialize)]
pub struct ConvertForm {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    q: Option<String>,
    provider: Option<String>,
}

pub async fn index() -> Html<String> {
    Html(pages::landing())
}

/// Always answers 200; failures are shown on the page itself.
#[tracing::instrument(skip_all)]
pub async fn convert(
    State(state): State<AppState>,
    form: Result<Form<ConvertForm>, FormRejection>,
) -> Html<String> {
    let url = match form {
        Ok(Form(f)) => f.url,
        Err(e) => {
            trace!(?e, "Could not read form");
            None
        }
    };
    let url = url
        .as_deref()
        .map(str::trim)
        .filter(|x| !x.is_empty())
        .map(str::to_owned);

    let res = match url {
        None => Err(ConvertError::missing_url()),
        Some(url) => {
            info!(%url, "Converting");
            let parsed = classify(&url);
            state.converter.convert(&parsed, &url).await
        }
    };

    match res {
        Ok(done) => Html(pages::success(&done.output_filename, &done.display_title)),
        Err(e) => {
            match &e {
                ConvertError::Unexpected(inner) => error!(?inner, "Unexpected error"),
                _ => warn!(%e, "Error processing request"),
            }
            Html(pages::error(&e.user_message(state.debug)))
        }
    }
}

#[tracing::instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> (StatusCode, Json<Vec<SearchHit>>) {
    let Some(query) = params.q.as_deref().map(str::trim).filter(|x| !x.is_empty()) else {
        return (StatusCode::OK, Json(Vec::new()));
    };

    let provider = match params.provider.as_deref() {
        Some(x) if x.eq_ignore_ascii_case("youtube") => Provider::YouTube,
        _ => Provider::Spotify,
    };

    let Some(catalog) = state.converter.catalog(provider) else {
        error!(%provider, "Search error: provider is not configured");
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(Vec::new()));
    };

    match catalog.search(query).await {
        Ok(hits) => (StatusCode::OK, Json(hits)),
        Err(e) => {
            error!(?e, "Search error");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(Vec::new()))
        }
    }
}

#[tracing::instrument(skip(state))]
pub async fn download(State(state): State<AppState>, Path(filename): Path<String>) -> Response {
    let Some(path) = resolve_download(state.converter.downloads_dir(), &filename) else {
        warn!("Rejected download path");
        return not_found();
    };

    let file = match tokio::fs::File::open(&path).await {
        Ok(f) => f,
        Err(e) => {
            error!(?path, ?e, "File not found");
            return not_found();
        }
    };

    match file.metadata().await {
        Ok(m) if m.is_file() => {}
        _ => {
            error!(?path, "Not a regular file");
            return not_found();
        }
    }

    trace!(?path, "Streaming download");

    let headers = [
        (header::CONTENT_TYPE, content_type_for(&filename).to_owned()),
        (header::CONTENT_DISPOSITION, content_disposition(&filename)),
    ];

    (headers, Body::from_stream(ReaderStream::new(file))).into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "File not found").into_response()
}

/// Only bare file names directly inside the downloads directory are served.
fn resolve_download(dir: &FsPath, filename: &str) -> Option<PathBuf> {
    if filename.contains(['/', '\\']) {
        return None;
    }

    let mut components = FsPath::new(filename).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) => Some(dir.join(name)),
        _ => None,
    }
}

fn content_disposition(filename: &str) -> String {
    let fallback = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect::<String>();

    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        utf8_percent_encode(filename, NON_ALPHANUMERIC)
    )
}
