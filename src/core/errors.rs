use thiserror::Error;

/// Failures the analysis client can surface. Neither variant is retried
/// internally; the caller decides whether to re-prompt or re-trigger.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Vision service not initialized. Please provide an API key.")]
    NotInitialized,

    #[error("Failed to analyze image: {message}")]
    AnalysisFailed { message: String },
}

impl AnalysisError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::AnalysisFailed {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_initialized_message_asks_for_a_key() {
        let message = AnalysisError::NotInitialized.to_string();
        assert!(message.contains("API key"));
    }

    #[test]
    fn test_analysis_failed_carries_the_underlying_message() {
        let error = AnalysisError::failed("connection reset");
        assert_eq!(
            error.to_string(),
            "Failed to analyze image: connection reset"
        );
    }
}
