//! Application state for the snapvault API

use std::path::PathBuf;
use std::sync::Arc;

use snapvault_core::ImageStore;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Image persistence backend
    pub store: Arc<ImageStore>,
    /// Directory the landing page and static assets are served from
    pub static_dir: PathBuf,
}

impl AppState {
    /// Create a new AppState with the given store and static asset directory
    pub fn new(store: ImageStore, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            store: Arc::new(store),
            static_dir: static_dir.into(),
        }
    }
}
