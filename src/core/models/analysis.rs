use serde::{Deserialize, Serialize};

/// Structured form of one model reply. Any section the parser could not
/// locate is an empty string; `full_text` always carries the reply verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisResult {
    pub name: String,
    pub description: String,
    pub usage: String,
    pub fun_fact: String,
    pub full_text: String,
}

impl AnalysisResult {
    /// The narration read aloud for this result: name first, then the three
    /// body sections run together.
    pub fn narration_text(&self) -> String {
        format!(
            "{}. {} {} {}",
            self.name, self.description, self.usage, self.fun_fact
        )
        .trim()
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narration_text_joins_sections_in_spoken_order() {
        let result = AnalysisResult {
            name: "Mug".to_string(),
            description: "A ceramic cup.".to_string(),
            usage: "For drinking.".to_string(),
            fun_fact: "Mugs are old.".to_string(),
            full_text: String::new(),
        };

        assert_eq!(
            result.narration_text(),
            "Mug. A ceramic cup. For drinking. Mugs are old."
        );
    }

    #[test]
    fn test_serde_uses_camel_case_field_names() {
        let result = AnalysisResult {
            name: "Pen".to_string(),
            fun_fact: "Ink flows.".to_string(),
            ..Default::default()
        };

        let serialized = serde_json::to_string(&result).unwrap();
        assert!(serialized.contains("\"funFact\":\"Ink flows.\""));
        assert!(serialized.contains("\"fullText\":\"\""));
    }

    #[test]
    fn test_missing_fields_deserialize_as_empty_strings() {
        let json = r#"{"name":"Pen"}"#;
        let result: AnalysisResult = serde_json::from_str(json).unwrap();

        assert_eq!(result.name, "Pen");
        assert_eq!(result.description, "");
        assert_eq!(result.fun_fact, "");
    }
}
