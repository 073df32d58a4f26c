use regex::Regex;
use std::sync::LazyLock;

use crate::core::models::AnalysisResult;

/// Parser for the four-section markdown reply the vision prompt asks for.
///
/// Each section label is located independently and case-insensitively, so
/// missing or reordered sections degrade to empty fields instead of failing
/// the whole reply. Bodies run from the end of their marker to the next
/// occurrence of any of the four markers, or to the end of the text.
static NAME_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\*\*Object Name:\*\*").unwrap());
static DESCRIPTION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\*\*What It Is:\*\*").unwrap());
static USAGE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\*\*How It's Used:\*\*").unwrap());
static FUN_FACT_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\*\*Fun Fact:\*\*").unwrap());

fn section_markers() -> [&'static Regex; 4] {
    [
        &NAME_MARKER,
        &DESCRIPTION_MARKER,
        &USAGE_MARKER,
        &FUN_FACT_MARKER,
    ]
}

pub fn parse_analysis_reply(text: &str) -> AnalysisResult {
    // Byte offsets where any known marker begins; these bound every capture.
    let mut boundaries: Vec<usize> = section_markers()
        .iter()
        .flat_map(|marker| marker.find_iter(text).map(|found| found.start()))
        .collect();
    boundaries.sort_unstable();

    let result = AnalysisResult {
        name: capture_section(text, &NAME_MARKER, &boundaries, true),
        description: capture_section(text, &DESCRIPTION_MARKER, &boundaries, false),
        usage: capture_section(text, &USAGE_MARKER, &boundaries, false),
        fun_fact: capture_section(text, &FUN_FACT_MARKER, &boundaries, false),
        full_text: text.to_string(),
    };

    log::debug!(
        "[PARSER] parsed reply: name={:?}, sections present: description={}, usage={}, fun_fact={}",
        result.name,
        !result.description.is_empty(),
        !result.usage.is_empty(),
        !result.fun_fact.is_empty()
    );

    result
}

/// Slice out one section body. A name never spans lines, so `single_line`
/// additionally cuts the capture at the first newline.
fn capture_section(text: &str, marker: &Regex, boundaries: &[usize], single_line: bool) -> String {
    let Some(found) = marker.find(text) else {
        return String::new();
    };

    let body_start = found.end();
    let body_end = boundaries
        .iter()
        .copied()
        .find(|&boundary| boundary >= body_start)
        .unwrap_or(text.len());

    let mut body = &text[body_start..body_end];
    if single_line {
        if let Some(newline) = body.find('\n') {
            body = &body[..newline];
        }
    }

    body.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_reply_parses_all_four_sections() {
        let reply = "**Object Name:** Mug\n**What It Is:** A ceramic cup.\n**How It's Used:** For drinking hot beverages.\n**Fun Fact:** Mugs date back centuries.";
        let result = parse_analysis_reply(reply);

        assert_eq!(result.name, "Mug");
        assert_eq!(result.description, "A ceramic cup.");
        assert_eq!(result.usage, "For drinking hot beverages.");
        assert_eq!(result.fun_fact, "Mugs date back centuries.");
        assert_eq!(result.full_text, reply);
    }

    #[test]
    fn test_single_section_reply_leaves_others_empty() {
        let result = parse_analysis_reply("**Object Name:** Pen");

        assert_eq!(result.name, "Pen");
        assert_eq!(result.description, "");
        assert_eq!(result.usage, "");
        assert_eq!(result.fun_fact, "");
        assert_eq!(result.full_text, "**Object Name:** Pen");
    }

    #[test]
    fn test_empty_input_yields_empty_fields_without_error() {
        let result = parse_analysis_reply("");

        assert_eq!(result.name, "");
        assert_eq!(result.description, "");
        assert_eq!(result.usage, "");
        assert_eq!(result.fun_fact, "");
        assert_eq!(result.full_text, "");
    }

    #[test]
    fn test_multiline_bodies_are_captured_up_to_the_next_label() {
        let reply = "**What It Is:** A tool.\nIt has many parts.\nPeople like it.\n\n**Fun Fact:** It is old.";
        let result = parse_analysis_reply(reply);

        assert_eq!(
            result.description,
            "A tool.\nIt has many parts.\nPeople like it."
        );
        assert_eq!(result.fun_fact, "It is old.");
    }

    #[test]
    fn test_name_is_bounded_by_end_of_line() {
        let reply = "**Object Name:** Teapot\nextra prose that is not part of the name";
        let result = parse_analysis_reply(reply);

        assert_eq!(result.name, "Teapot");
    }

    #[test]
    fn test_labels_are_matched_case_insensitively() {
        let reply = "**object name:** Lamp\n**WHAT IT IS:** A light source.";
        let result = parse_analysis_reply(reply);

        assert_eq!(result.name, "Lamp");
        assert_eq!(result.description, "A light source.");
    }

    #[test]
    fn test_out_of_order_labels_still_parse_independently() {
        let reply = "**Fun Fact:** Very fun.\n**Object Name:** Dice\n**How It's Used:** Rolled.";
        let result = parse_analysis_reply(reply);

        assert_eq!(result.name, "Dice");
        assert_eq!(result.usage, "Rolled.");
        assert_eq!(result.fun_fact, "Very fun.");
        assert_eq!(result.description, "");
    }

    #[test]
    fn test_body_containing_another_label_marker_stops_the_capture_there() {
        let reply = "**What It Is:** Something that mentions **Fun Fact:** inside its body.";
        let result = parse_analysis_reply(reply);

        assert_eq!(result.description, "Something that mentions");
        assert_eq!(result.fun_fact, "inside its body.");
    }

    #[test]
    fn test_labels_with_empty_bodies_produce_empty_fields() {
        let reply = "**Object Name:**\n**What It Is:**\n**How It's Used:**\n**Fun Fact:**";
        let result = parse_analysis_reply(reply);

        assert_eq!(result.name, "");
        assert_eq!(result.description, "");
        assert_eq!(result.usage, "");
        assert_eq!(result.fun_fact, "");
        assert_eq!(result.full_text, reply);
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed_from_captures() {
        let reply = "  **Object Name:**   Kettle   \n\n**Fun Fact:**   \n  Steams well.  \n";
        let result = parse_analysis_reply(reply);

        assert_eq!(result.name, "Kettle");
        assert_eq!(result.fun_fact, "Steams well.");
    }

    #[test]
    fn test_unknown_bold_text_does_not_terminate_a_body() {
        let reply = "**What It Is:** A **very** shiny thing.\n**Fun Fact:** Shines.";
        let result = parse_analysis_reply(reply);

        assert_eq!(result.description, "A **very** shiny thing.");
        assert_eq!(result.fun_fact, "Shines.");
    }

    #[test]
    fn test_full_text_is_always_the_verbatim_input() {
        let reply = "no labels anywhere, just prose about a bicycle";
        let result = parse_analysis_reply(reply);

        assert_eq!(result.full_text, reply);
        assert_eq!(result.name, "");
    }
}
