mod handlers;
mod mime;
mod pages;

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use axum::{routing::get, Router};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;

use crate::converter::Converter;

#[derive(Debug, Clone)]
pub struct AppState {
    pub converter: Arc<Converter>,
    /// Show raw messages for unexpected failures.
    pub debug: bool,
    /// Served at the site root for anything no route matches.
    pub static_dir: PathBuf,
}

pub fn router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.static_dir);

    Router::new()
        .route("/", get(handlers::index).post(handlers::convert))
        .route("/search", get(handlers::search))
        .route("/download/{filename}", get(handlers::download))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(%addr, "Listening");

    axum::serve(listener, router(state))
        .await
        .context("HTTP server stopped")
}
