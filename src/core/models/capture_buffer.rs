use serde::{Deserialize, Serialize};

/// One captured still image: encoded bytes plus their declared MIME type.
/// Immutable once built; the encoded payload goes to the vision model as-is.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct CaptureBuffer {
    pub mime_type: String,
    #[serde(with = "encoded_bytes")]
    pub data: Vec<u8>,
}

impl std::fmt::Debug for CaptureBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureBuffer")
            .field("mime_type", &self.mime_type)
            .field("byte_len", &self.data.len())
            .finish()
    }
}

impl CaptureBuffer {
    pub fn build_from_encoded_bytes(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        let mime_type = mime_type.into();

        log::debug!(
            "[CAPTURE_BUFFER] building buffer: {} bytes, mime={}",
            data.len(),
            mime_type
        );

        Self { mime_type, data }
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Persisted history stores image payloads as base64 strings, matching the
/// data-URL payloads the browser build of WhisperLens kept in local storage.
mod encoded_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_from_encoded_bytes_keeps_payload_and_mime() {
        let buffer = CaptureBuffer::build_from_encoded_bytes("image/jpeg", vec![0xff, 0xd8, 0xff]);

        assert_eq!(buffer.mime_type, "image/jpeg");
        assert_eq!(buffer.data, vec![0xff, 0xd8, 0xff]);
        assert!(!buffer.is_empty());
    }

    #[test]
    fn test_debug_output_omits_raw_bytes() {
        let buffer = CaptureBuffer::build_from_encoded_bytes("image/jpeg", vec![1, 2, 3, 4]);
        let rendered = format!("{:?}", buffer);

        assert!(rendered.contains("byte_len"));
        assert!(rendered.contains("4"));
        assert!(!rendered.contains("[1, 2, 3, 4]"));
    }

    #[test]
    fn test_serialization_roundtrip_through_base64() {
        let buffer = CaptureBuffer::build_from_encoded_bytes("image/jpeg", vec![0, 1, 254, 255]);

        let serialized = serde_json::to_string(&buffer).unwrap();
        assert!(serialized.contains("\"data\":\"AAH+/w==\""));

        let deserialized: CaptureBuffer = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, buffer);
    }

    #[test]
    fn test_malformed_base64_fails_deserialization() {
        let json = r#"{"mime_type":"image/jpeg","data":"not base64!!"}"#;
        let result: Result<CaptureBuffer, _> = serde_json::from_str(json);

        assert!(result.is_err());
    }
}
