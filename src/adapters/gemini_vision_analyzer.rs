use std::sync::RwLock;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::core::errors::AnalysisError;
use crate::core::interfaces::adapters::VisionAnalyzer;
use crate::core::models::{AnalysisResult, CaptureBuffer, Credential};
use crate::core::response_parser;
use crate::global_constants;

/// Vision analyzer over the Gemini `generateContent` REST endpoint. One
/// request per capture, transport-default timeout, no retry.
pub struct GeminiVisionAnalyzer {
    client: reqwest::Client,
    credential: RwLock<Option<Credential>>,
    base_url: String,
    model: String,
}

impl GeminiVisionAnalyzer {
    pub fn new() -> Self {
        Self::with_endpoint(
            global_constants::GEMINI_API_BASE_URL,
            global_constants::GEMINI_VISION_MODEL,
        )
    }

    pub fn with_endpoint(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            credential: RwLock::new(None),
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    fn request_url(&self, credential: &Credential) -> String {
        format!(
            "{}/{}:generateContent?key={}",
            self.base_url,
            self.model,
            credential.as_str()
        )
    }

    fn build_request_body(capture: &CaptureBuffer) -> serde_json::Value {
        serde_json::json!({
            "contents": [{ "parts": [
                { "text": global_constants::ANALYSIS_PROMPT },
                { "inlineData": {
                    "mimeType": capture.mime_type,
                    "data": STANDARD.encode(&capture.data)
                } }
            ]}]
        })
    }

    fn extract_reply_text(response: &serde_json::Value) -> Option<String> {
        response["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::to_string)
    }

    /// Providers can hide failures inside a 2xx body: an `error` object, or a
    /// candidate with no text because the content was blocked.
    fn extract_failure_detail(response: &serde_json::Value) -> String {
        if let Some(message) = response["error"]["message"].as_str() {
            return message.to_string();
        }
        if let Some(reason) = response["promptFeedback"]["blockReason"].as_str() {
            return format!("content blocked ({})", reason);
        }
        if let Some(reason) = response["candidates"][0]["finishReason"]
            .as_str()
            .filter(|reason| *reason != "STOP")
        {
            return format!("generation stopped ({})", reason);
        }
        "provider reply contained no text".to_string()
    }

    fn active_credential(&self) -> Option<Credential> {
        self.credential.read().unwrap().clone()
    }
}

impl Default for GeminiVisionAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VisionAnalyzer for GeminiVisionAnalyzer {
    fn install_credential(&self, credential: Credential) {
        log::info!("[GEMINI] Credential installed");
        *self.credential.write().unwrap() = Some(credential);
    }

    fn is_initialized(&self) -> bool {
        self.credential.read().unwrap().is_some()
    }

    async fn analyze(&self, capture: &CaptureBuffer) -> Result<AnalysisResult, AnalysisError> {
        let credential = self
            .active_credential()
            .ok_or(AnalysisError::NotInitialized)?;

        log::info!(
            "[GEMINI] Analyzing {} byte {} capture via {}",
            capture.data.len(),
            capture.mime_type,
            self.model
        );

        let body = Self::build_request_body(capture);
        let response = self
            .client
            .post(self.request_url(&credential))
            .json(&body)
            .send()
            .await
            .map_err(|error| AnalysisError::failed(error.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            log::error!("[GEMINI] Provider returned {}: {}", status, detail);
            return Err(AnalysisError::failed(format!(
                "provider returned {}: {}",
                status, detail
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|error| AnalysisError::failed(error.to_string()))?;

        let Some(reply_text) = Self::extract_reply_text(&json) else {
            let detail = Self::extract_failure_detail(&json);
            log::error!("[GEMINI] Provider reply carried no text: {}", detail);
            return Err(AnalysisError::failed(detail));
        };
        log::debug!("[GEMINI] Reply: {} chars", reply_text.len());

        Ok(response_parser::parse_analysis_reply(&reply_text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_capture() -> CaptureBuffer {
        CaptureBuffer::build_from_encoded_bytes("image/jpeg", vec![0xff, 0xd8, 0xff, 0xe0])
    }

    #[test]
    fn test_request_body_carries_prompt_and_inline_image() {
        let body = GeminiVisionAnalyzer::build_request_body(&test_capture());

        let parts = &body["contents"][0]["parts"];
        assert!(parts[0]["text"]
            .as_str()
            .unwrap()
            .starts_with("You are WhisperLens"));
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[1]["inlineData"]["data"], "/9j/4A==");
    }

    #[test]
    fn test_request_url_embeds_model_and_key() {
        let analyzer = GeminiVisionAnalyzer::with_endpoint("https://example.test/models", "m");
        let credential = Credential::new("k-123").unwrap();

        assert_eq!(
            analyzer.request_url(&credential),
            "https://example.test/models/m:generateContent?key=k-123"
        );
    }

    #[test]
    fn test_extract_reply_text_reads_first_candidate() {
        let response = serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "**Object Name:** Mug" }] } }]
        });

        assert_eq!(
            GeminiVisionAnalyzer::extract_reply_text(&response),
            Some("**Object Name:** Mug".to_string())
        );
    }

    #[test]
    fn test_extract_reply_text_is_absent_when_the_body_has_no_candidate_text() {
        let response = serde_json::json!({ "error": { "message": "quota" } });
        assert_eq!(GeminiVisionAnalyzer::extract_reply_text(&response), None);
    }

    #[test]
    fn test_failure_detail_prefers_the_error_message() {
        let response = serde_json::json!({ "error": { "message": "quota exceeded" } });
        assert_eq!(
            GeminiVisionAnalyzer::extract_failure_detail(&response),
            "quota exceeded"
        );
    }

    #[test]
    fn test_failure_detail_reports_blocked_content() {
        let response = serde_json::json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        assert_eq!(
            GeminiVisionAnalyzer::extract_failure_detail(&response),
            "content blocked (SAFETY)"
        );
    }

    #[test]
    fn test_failure_detail_reports_non_stop_finish_reason() {
        let response = serde_json::json!({ "candidates": [{ "finishReason": "SAFETY" }] });
        assert_eq!(
            GeminiVisionAnalyzer::extract_failure_detail(&response),
            "generation stopped (SAFETY)"
        );
    }

    #[test]
    fn test_failure_detail_falls_back_to_a_generic_message() {
        let response = serde_json::json!({ "candidates": [] });
        assert_eq!(
            GeminiVisionAnalyzer::extract_failure_detail(&response),
            "provider reply contained no text"
        );
    }

    /// Serves exactly one request with a 200 JSON reply, echoing nothing of
    /// the request beyond draining it, and returns the base URL to hit.
    async fn serve_json_once(body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            let mut header_end = None;
            let mut content_length = 0usize;
            loop {
                let read = socket.read(&mut chunk).await.unwrap();
                if read == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..read]);
                if header_end.is_none() {
                    if let Some(position) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                        header_end = Some(position + 4);
                        let headers = String::from_utf8_lossy(&request[..position]).to_string();
                        content_length = headers
                            .lines()
                            .find_map(|line| {
                                let (name, value) = line.split_once(':')?;
                                if name.eq_ignore_ascii_case("content-length") {
                                    value.trim().parse().ok()
                                } else {
                                    None
                                }
                            })
                            .unwrap_or(0);
                    }
                }
                if let Some(end) = header_end {
                    if request.len() >= end + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });

        format!("http://{}", address)
    }

    #[tokio::test]
    async fn test_analyze_parses_the_candidate_text_from_a_successful_reply() {
        let base_url = serve_json_once(
            r#"{"candidates":[{"content":{"parts":[{"text":"**Object Name:** Mug"}]}}]}"#,
        )
        .await;
        let analyzer = GeminiVisionAnalyzer::with_endpoint(base_url, "m");
        analyzer.install_credential(Credential::new("k").unwrap());

        let result = analyzer.analyze(&test_capture()).await.unwrap();

        assert_eq!(result.name, "Mug");
        assert_eq!(result.full_text, "**Object Name:** Mug");
    }

    #[tokio::test]
    async fn test_analyze_surfaces_a_provider_failure_hidden_in_a_2xx_body() {
        let base_url = serve_json_once(r#"{"error":{"message":"quota exceeded"}}"#).await;
        let analyzer = GeminiVisionAnalyzer::with_endpoint(base_url, "m");
        analyzer.install_credential(Credential::new("k").unwrap());

        let outcome = analyzer.analyze(&test_capture()).await;

        let error = outcome.unwrap_err();
        assert!(matches!(error, AnalysisError::AnalysisFailed { .. }));
        assert!(error.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_analyze_surfaces_blocked_content_as_a_failure() {
        let base_url =
            serve_json_once(r#"{"promptFeedback":{"blockReason":"SAFETY"},"candidates":[]}"#)
                .await;
        let analyzer = GeminiVisionAnalyzer::with_endpoint(base_url, "m");
        analyzer.install_credential(Credential::new("k").unwrap());

        let outcome = analyzer.analyze(&test_capture()).await;

        let error = outcome.unwrap_err();
        assert!(error.to_string().contains("content blocked (SAFETY)"));
    }

    #[tokio::test]
    async fn test_analyze_without_credential_fails_before_any_network_call() {
        // Unroutable endpoint: reaching the network would error differently.
        let analyzer = GeminiVisionAnalyzer::with_endpoint("http://127.0.0.1:0", "m");

        let outcome = analyzer.analyze(&test_capture()).await;

        assert!(matches!(outcome, Err(AnalysisError::NotInitialized)));
    }

    #[test]
    fn test_install_credential_replaces_the_previous_one() {
        let analyzer = GeminiVisionAnalyzer::new();
        assert!(!analyzer.is_initialized());

        analyzer.install_credential(Credential::new("first").unwrap());
        analyzer.install_credential(Credential::new("second").unwrap());

        assert!(analyzer.is_initialized());
        assert_eq!(analyzer.active_credential().unwrap().as_str(), "second");
    }
}
