//! Landing page handler

use axum::extract::State;
use axum::response::Html;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /
/// Serve the landing document from the static asset directory.
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let path = state.static_dir.join("index.html");

    let body = tokio::fs::read_to_string(&path)
        .await
        .map_err(|_| ApiError::NotFound("landing page not available".to_string()))?;

    Ok(Html(body))
}
