//! Local HTTP server hosting the sandboxed preview.
//!
//! Routes:
//! - `/`         host page with the current frame in a sandboxed iframe
//! - `/revision` `{"revision": n}`, polled by the host page
//! - `/frame`    the raw generated document

use std::net::SocketAddr;

use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::error::Result;
use crate::preview::PreviewFrame;

type Frames = watch::Receiver<PreviewFrame>;

/// Every response is the state of the moment; the host page polls.
const NO_STORE: [(header::HeaderName, &str); 1] = [(header::CACHE_CONTROL, "no-store")];

#[derive(Serialize)]
struct RevisionBody {
    revision: u64,
}

pub struct PreviewServer {
    listener: TcpListener,
}

impl PreviewServer {
    /// Bind on loopback. Port 0 picks a free port.
    pub async fn bind(port: u16) -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", port)).await?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn url(&self) -> Result<String> {
        Ok(format!("http://{}/", self.local_addr()?))
    }

    /// Serve until the renderer owning `frames` is dropped.
    pub async fn serve(self, frames: Frames) -> Result<()> {
        tracing::info!("Preview server listening on {}", self.url()?);

        let mut watcher = frames.clone();
        let app = router(frames);
        axum::serve(self.listener, app)
            .with_graceful_shutdown(async move {
                while watcher.changed().await.is_ok() {}
                tracing::info!("Preview renderer dropped, stopping preview server");
            })
            .await?;
        Ok(())
    }
}

fn router(frames: Frames) -> Router {
    Router::new()
        .route("/", get(host_page))
        .route("/revision", get(revision))
        .route("/frame", get(raw_frame))
        .with_state(frames)
}

async fn host_page(State(frames): State<Frames>) -> impl IntoResponse {
    let page = frames.borrow().host_document();
    (NO_STORE, Html(page))
}

async fn revision(State(frames): State<Frames>) -> impl IntoResponse {
    let revision = frames.borrow().revision;
    tracing::trace!(revision, "Revision polled");
    (NO_STORE, Json(RevisionBody { revision }))
}

async fn raw_frame(State(frames): State<Frames>) -> impl IntoResponse {
    let html = frames.borrow().html.to_string();
    (NO_STORE, Html(html))
}

/// Best-effort launch of the system browser
pub fn open_in_browser(url: &str) {
    if let Err(e) = open::that(url) {
        tracing::warn!("Failed to open browser for {}: {}", url, e);
    }
}
