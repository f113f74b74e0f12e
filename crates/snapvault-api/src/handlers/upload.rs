//! Image upload handler

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for an image upload
#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    /// Directory name the image is filed under; otherwise opaque
    pub user_id: String,
    /// Capture angle label, becomes part of the filename
    pub angle: String,
    /// Base64 data URL (`data:image/...;base64,<payload>`)
    pub image: String,
}

/// Response body for a successful upload
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    /// Path of the stored JPEG, relative to the server working directory
    /// unless the upload root was configured absolute
    pub filepath: String,
}

/// POST /upload
/// Decode the payload and persist it under the per-user directory.
pub async fn upload_image(
    State(state): State<AppState>,
    Json(request): Json<UploadRequest>,
) -> Result<Json<UploadResponse>, ApiError> {
    let path = state
        .store
        .save(&request.user_id, &request.angle, &request.image)?;

    tracing::info!(
        user_id = %request.user_id,
        angle = %request.angle,
        path = %path.display(),
        "Upload complete"
    );

    Ok(Json(UploadResponse {
        success: true,
        message: "image stored".to_string(),
        filepath: path.display().to_string(),
    }))
}
