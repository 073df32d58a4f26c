use async_trait::async_trait;

use crate::core::errors::AnalysisError;
use crate::core::models::{AnalysisResult, CaptureBuffer, Credential};

/// Remote vision model behind a credential gate. `analyze` must never reach
/// the network before a credential has been installed.
#[async_trait]
pub trait VisionAnalyzer: Send + Sync {
    /// Installs or replaces the active credential.
    fn install_credential(&self, credential: Credential);

    fn is_initialized(&self) -> bool;

    /// One request, no retry. Transport and provider failures come back as
    /// `AnalysisError::AnalysisFailed` with the underlying message.
    async fn analyze(&self, capture: &CaptureBuffer) -> Result<AnalysisResult, AnalysisError>;
}
