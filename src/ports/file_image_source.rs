use std::io::Cursor;

use anyhow::{Context, Result};
use async_trait::async_trait;
use image::ImageFormat;

use crate::core::interfaces::ports::ImageSource;
use crate::core::models::CaptureBuffer;
use crate::global_constants;

/// Image source backed by files on disk. JPEG files pass through untouched;
/// anything else the `image` crate can decode is re-encoded to JPEG so the
/// capture always carries the wire format the analysis request declares.
pub struct FileImageSource;

impl FileImageSource {
    pub fn new() -> Self {
        Self
    }

    fn to_jpeg_bytes(raw: Vec<u8>) -> Result<Vec<u8>> {
        if matches!(image::guess_format(&raw), Ok(ImageFormat::Jpeg)) {
            return Ok(raw);
        }

        let decoded = image::load_from_memory(&raw).context("Unsupported or corrupt image file")?;

        log::debug!(
            "[CAPTURE] Re-encoding {}x{} image to JPEG",
            decoded.width(),
            decoded.height()
        );

        let mut encoded = Vec::new();
        decoded
            .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Jpeg)
            .context("Failed to encode capture as JPEG")?;
        Ok(encoded)
    }
}

impl Default for FileImageSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageSource for FileImageSource {
    async fn acquire(&self, location: &str) -> Result<CaptureBuffer> {
        log::info!("[CAPTURE] Reading image from {}", location);

        let raw = tokio::fs::read(location)
            .await
            .with_context(|| format!("Failed to read image file '{}'", location))?;
        let jpeg = Self::to_jpeg_bytes(raw)?;

        Ok(CaptureBuffer::build_from_encoded_bytes(
            global_constants::CAPTURE_MIME_TYPE,
            jpeg,
        ))
    }
}
