use crate::routing_utils::ClientErrorResponse;
use axum::response::IntoResponse;
use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};

/// Serves the built frontend out of `assets_dir`. Paths which don't name a file fall back to
/// `index.html` so client-side routes resolve when the page is loaded directly.
pub fn spa_service(assets_dir: impl AsRef<Path>) -> ServeDir<ServeFile> {
    let assets_dir = assets_dir.as_ref();

    ServeDir::new(assets_dir).fallback(ServeFile::new(assets_dir.join("index.html")))
}

/// Fallback for paths under /api which don't match an endpoint. Keeps unknown API calls from
/// being answered with the frontend's index page.
pub async fn api_not_found() -> impl IntoResponse {
    ClientErrorResponse::NotFound {
        message: "No such endpoint.",
    }
}
