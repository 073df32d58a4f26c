use anyhow::Result;
use async_trait::async_trait;

use crate::core::models::CaptureBuffer;

/// Produces a still image as an encoded byte buffer with a declared MIME
/// type. The desktop build reads files; a camera source fits the same seam.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn acquire(&self, location: &str) -> Result<CaptureBuffer>;
}
