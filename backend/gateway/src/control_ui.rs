//! Frontend static asset hosting.
//!
//! Serves the built single-page app: `index.html` at `/`, `favicon.ico`, and
//! everything under `static/`.

use std::path::Path;

use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
    Json, Router,
};
use serde_json::json;
use tower_http::services::{ServeDir, ServeFile};
use tracing::debug;

use crate::server::GatewayState;

pub const WELCOME_MESSAGE: &str = "Welcome to the PDF Analyzer API";

/// Handler for `GET /`.
pub async fn index(State(state): State<GatewayState>) -> Response {
    if let Some(dir) = &state.frontend_dir {
        let index = dir.join("index.html");
        match tokio::fs::read_to_string(&index).await {
            Ok(html) => return Html(html).into_response(),
            Err(e) => debug!(path = %index.display(), error = %e, "No frontend index"),
        }
    }
    Json(json!({ "message": WELCOME_MESSAGE })).into_response()
}

/// Routes for `/favicon.ico` out of `frontend_dir` and `/static/*` out of
/// `frontend_dir/static`, the layout a React production build emits.
pub fn asset_router(frontend_dir: &Path) -> Router<GatewayState> {
    Router::new()
        .route_service("/favicon.ico", ServeFile::new(frontend_dir.join("favicon.ico")))
        .nest_service("/static", ServeDir::new(frontend_dir.join("static")))
}
