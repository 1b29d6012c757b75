//! Browser UI: an axum router serving server-rendered pages.
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `GET /` | empty page: style selector, upload form, template viewer |
//! | `POST /upload` | multipart `document` + `style`; extract and preview |
//! | `POST /generate` | form `style`, `file_name`, `encoded_text`; one inference call |
//! | `GET /template` | raw template as `text/plain` (404 when missing) |
//! | `GET /health` | liveness and configured model |
//!
//! The preview page posts the extracted text back to `/generate` as base64,
//! so no session state lives on the server and the text arrives unchanged.

pub mod handlers;
pub mod render;
pub mod state;
pub mod upload;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

pub use state::AppState;

/// Request body cap, matching the upload widget's 200 MB default.
pub const MAX_BODY_BYTES: usize = 200 * 1024 * 1024;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/upload", post(handlers::upload))
        .route("/generate", post(handlers::generate))
        .route("/template", get(handlers::template))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> std::io::Result<()> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await
}
