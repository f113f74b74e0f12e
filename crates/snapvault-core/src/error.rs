//! Common error types for image storage

use std::io;

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while decoding and persisting an upload
#[derive(Debug, Error)]
pub enum StoreError {
    /// Payload is not a base64 data URL (missing separator or bad base64)
    #[error("Invalid image encoding: {0}")]
    InvalidEncoding(String),

    /// Decoded bytes are not an image we can read or re-encode
    #[error("Unsupported image data: {0}")]
    UnsupportedImage(String),

    /// A user id or angle label that cannot be used as a path segment
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// Filesystem failure (directory creation, temp file, rename)
    #[error("Storage error: {0}")]
    Storage(#[from] io::Error),
}
