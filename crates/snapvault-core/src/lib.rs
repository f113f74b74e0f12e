//! snapvault-core - image decode and per-user disk storage
//!
//! This crate owns the storage side of snapvault: it turns a base64 data-URL
//! payload into a JPEG file under a per-user directory. It has no HTTP
//! surface; the API layer lives in snapvault-api.

pub mod error;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::ImageStore;
