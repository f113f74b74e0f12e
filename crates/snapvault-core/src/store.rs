//! Decoded-image persistence under a per-user directory tree

use std::io::{Cursor, Write};
use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::{DynamicImage, ImageFormat};
use tempfile::NamedTempFile;

use crate::error::{StoreError, StoreResult};

/// Stores uploaded images as JPEG files under `<root>/<user_id>/`.
///
/// The upload root is injected at construction; directories below it are
/// created lazily on first save.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    /// Create a store writing under the given upload root
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Decode a base64 data-URL payload and persist it as
    /// `<root>/<user_id>/<user_id>_<angle>.jpg`.
    ///
    /// The stored file is always a JPEG, whatever container the client sent.
    /// An existing file for the same user and angle is replaced; replacement
    /// happens by rename, so readers never observe a partially written file.
    pub fn save(&self, user_id: &str, angle: &str, payload: &str) -> StoreResult<PathBuf> {
        validate_segment("user_id", user_id)?;
        validate_segment("angle", angle)?;

        let encoded = strip_data_url_prefix(payload)?;
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| StoreError::InvalidEncoding(format!("base64 decode failed: {}", e)))?;

        // Format is sniffed from the bytes, not taken from the data-URL scheme.
        let img = image::load_from_memory(&bytes)
            .map_err(|e| StoreError::UnsupportedImage(format!("image decode failed: {}", e)))?;

        // JPEG carries no alpha channel; flatten to 8-bit RGB before encoding.
        let mut jpeg = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img.to_rgb8())
            .write_to(&mut jpeg, ImageFormat::Jpeg)
            .map_err(|e| StoreError::UnsupportedImage(format!("jpeg encode failed: {}", e)))?;

        let user_dir = self.root.join(user_id);
        std::fs::create_dir_all(&user_dir)?;

        let path = user_dir.join(format!("{}_{}.jpg", user_id, angle));

        // Stage in the destination directory so the final rename stays on one
        // filesystem; the temp file is removed on drop if any step fails.
        let mut tmp = NamedTempFile::new_in(&user_dir)?;
        tmp.write_all(jpeg.get_ref())?;
        tmp.persist(&path).map_err(|e| StoreError::Storage(e.error))?;

        tracing::info!(
            user_id = %user_id,
            angle = %angle,
            path = %path.display(),
            size = jpeg.get_ref().len(),
            "Image stored"
        );

        Ok(path)
    }
}

/// Everything before and including the first comma is the data-URL scheme
/// prefix (e.g. `data:image/png;base64,`) and is discarded.
fn strip_data_url_prefix(payload: &str) -> StoreResult<&str> {
    payload
        .split_once(',')
        .map(|(_, data)| data)
        .ok_or_else(|| StoreError::InvalidEncoding("missing data URL separator ','".to_string()))
}

/// `user_id` and `angle` become path components; only plain single-segment
/// names are allowed.
fn validate_segment(field: &str, value: &str) -> StoreResult<()> {
    let unsafe_segment = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains('/')
        || value.contains('\\')
        || value.contains('\0');

    if unsafe_segment {
        return Err(StoreError::InvalidName(format!(
            "{} is not a valid path segment: {:?}",
            field, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    /// Encode a solid-color 8x8 PNG as a data URL
    fn png_data_url(color: Rgb<u8>) -> String {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, color))
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        format!("data:image/png;base64,{}", BASE64.encode(buf.get_ref()))
    }

    #[test]
    fn test_save_writes_jpeg_at_deterministic_path() {
        let dir = tempdir().unwrap();
        let store = ImageStore::new(dir.path().join("uploads"));

        let path = store
            .save("u1", "front", &png_data_url(Rgb([200, 30, 30])))
            .unwrap();

        assert_eq!(path, dir.path().join("uploads/u1/u1_front.jpg"));
        let stored = std::fs::read(&path).unwrap();
        assert_eq!(image::guess_format(&stored).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_save_overwrites_previous_upload() {
        let dir = tempdir().unwrap();
        let store = ImageStore::new(dir.path().join("uploads"));

        store
            .save("u1", "front", &png_data_url(Rgb([255, 0, 0])))
            .unwrap();
        let path = store
            .save("u1", "front", &png_data_url(Rgb([0, 0, 255])))
            .unwrap();

        // Exactly one file, reflecting the second upload
        let entries: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(entries.len(), 1);

        let pixel = *image::open(&path).unwrap().to_rgb8().get_pixel(0, 0);
        assert!(pixel[2] > 150, "expected blue content, got {:?}", pixel);
        assert!(pixel[0] < 100, "expected blue content, got {:?}", pixel);
    }

    #[test]
    fn test_save_creates_one_directory_per_user() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("uploads");
        let store = ImageStore::new(&root);

        store
            .save("u1", "front", &png_data_url(Rgb([10, 10, 10])))
            .unwrap();
        store
            .save("u1", "left", &png_data_url(Rgb([10, 10, 10])))
            .unwrap();
        store
            .save("u2", "front", &png_data_url(Rgb([10, 10, 10])))
            .unwrap();

        let dirs: Vec<_> = std::fs::read_dir(&root)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(dirs.len(), 2);
    }

    #[test]
    fn test_missing_separator_is_rejected() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("uploads");
        let store = ImageStore::new(&root);

        let err = store.save("u1", "front", "not-a-data-url").unwrap_err();

        match err {
            StoreError::InvalidEncoding(msg) => assert!(msg.contains(',')),
            other => panic!("Expected InvalidEncoding, got {:?}", other),
        }
        assert!(!root.exists(), "failed save must not create directories");
    }

    #[test]
    fn test_invalid_base64_is_rejected() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("uploads");
        let store = ImageStore::new(&root);

        let err = store
            .save("u1", "front", "data:image/png;base64,not-valid-base64!!")
            .unwrap_err();

        match err {
            StoreError::InvalidEncoding(_) => {}
            other => panic!("Expected InvalidEncoding, got {:?}", other),
        }
        assert!(!root.exists());
    }

    #[test]
    fn test_non_image_payload_is_rejected() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("uploads");
        let store = ImageStore::new(&root);

        let payload = format!(
            "data:application/octet-stream;base64,{}",
            BASE64.encode(b"definitely not an image")
        );
        let err = store.save("u1", "front", &payload).unwrap_err();

        match err {
            StoreError::UnsupportedImage(_) => {}
            other => panic!("Expected UnsupportedImage, got {:?}", other),
        }
        assert!(!root.exists());
    }

    #[test]
    fn test_path_traversal_is_rejected() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("uploads");
        let store = ImageStore::new(&root);
        let payload = png_data_url(Rgb([10, 10, 10]));

        for bad in ["../../etc", "a/b", "..", ".", "", "a\\b"] {
            let err = store.save(bad, "front", &payload).unwrap_err();
            match err {
                StoreError::InvalidName(_) => {}
                other => panic!("Expected InvalidName for {:?}, got {:?}", bad, other),
            }

            let err = store.save("u1", bad, &payload).unwrap_err();
            match err {
                StoreError::InvalidName(_) => {}
                other => panic!("Expected InvalidName for {:?}, got {:?}", bad, other),
            }
        }

        assert!(!root.exists(), "rejected names must not touch the filesystem");
    }
}
