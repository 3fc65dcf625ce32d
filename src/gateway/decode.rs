use log::warn;

use crate::profile::types::{AnalysisResult, WebSource};
use crate::providers::traits::GroundingChunk;

/// Longest raw-text excerpt used when the model refuses structured output.
const SUMMARY_EXCERPT_CHARS: usize = 300;

const FALLBACK_NOTE: &str = "Could not parse structured analysis. Please read the summary.";

/// Returns the inner text of the first fenced code block (```json or plain
/// ```), or the whole text when no fence is present. Grounded responses are
/// prompted for fenced JSON but the model does not always comply.
pub fn extract_fenced_json(text: &str) -> &str {
    for opener in ["```json\n", "```\n"] {
        if let Some(start) = text.find(opener) {
            let body = &text[start + opener.len()..];
            if let Some(end) = body.find("\n```") {
                return &body[..end];
            }
        }
    }
    text
}

/// Decodes the food-safety response text. A response that is not valid JSON
/// is a business rule here, not an error: the caller gets a degraded
/// mid-range result carrying an excerpt of the raw text.
pub fn parse_analysis(text: &str) -> AnalysisResult {
    let candidate = extract_fenced_json(text);
    match serde_json::from_str::<AnalysisResult>(candidate) {
        Ok(result) => result,
        Err(e) => {
            warn!("JSON parse failed, falling back to raw text handling: {}", e);
            degraded_result(text)
        }
    }
}

fn degraded_result(raw: &str) -> AnalysisResult {
    let excerpt: String = raw.chars().take(SUMMARY_EXCERPT_CHARS).collect();
    AnalysisResult {
        safety_score: 5.0,
        summary: format!("{}...", excerpt),
        found_allergens: Vec::new(),
        health_note: Some(FALLBACK_NOTE.to_string()),
        ..AnalysisResult::default()
    }
}

/// Reduces grounding chunks to citations: missing titles default to
/// "Source", empty uris are dropped, and each uri appears once (first
/// occurrence wins, chunk order preserved).
pub fn collect_web_sources(chunks: &[GroundingChunk]) -> Vec<WebSource> {
    let mut seen: Vec<&str> = Vec::new();
    let mut sources = Vec::new();
    for chunk in chunks {
        let uri = chunk.uri.as_deref().unwrap_or("");
        if uri.is_empty() || seen.contains(&uri) {
            continue;
        }
        seen.push(uri);
        sources.push(WebSource {
            title: chunk
                .title
                .clone()
                .unwrap_or_else(|| "Source".to_string()),
            uri: uri.to_string(),
        });
    }
    sources
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_json_fence() {
        let text = "Here you go:\n```json\n{\"safetyScore\": 8}\n```\nStay safe!";
        assert_eq!(extract_fenced_json(text), "{\"safetyScore\": 8}");
    }

    #[test]
    fn extracts_plain_fence() {
        let text = "```\n{\"safetyScore\": 3}\n```";
        assert_eq!(extract_fenced_json(text), "{\"safetyScore\": 3}");
    }

    #[test]
    fn unfenced_text_passes_through() {
        assert_eq!(extract_fenced_json("{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn parses_fenced_analysis() {
        let text = "```json\n{\"safetyScore\":8,\"summary\":\"ok\",\"foundAllergens\":[]}\n```";
        let result = parse_analysis(text);
        assert_eq!(result.safety_score, 8.0);
        assert_eq!(result.summary, "ok");
        assert!(result.found_allergens.is_empty());
    }

    #[test]
    fn refusal_text_degrades_instead_of_failing() {
        let result = parse_analysis("I cannot comply");
        assert_eq!(result.safety_score, 5.0);
        assert!(result.found_allergens.is_empty());
        assert_eq!(result.summary, "I cannot comply...");
        assert_eq!(result.health_note.as_deref(), Some(FALLBACK_NOTE));
    }

    #[test]
    fn degraded_summary_is_excerpted_to_300_chars() {
        let raw = "x".repeat(500);
        let result = parse_analysis(&raw);
        assert_eq!(result.summary.len(), 303);
        assert!(result.summary.ends_with("..."));
    }

    fn chunk(title: Option<&str>, uri: Option<&str>) -> GroundingChunk {
        GroundingChunk {
            title: title.map(str::to_string),
            uri: uri.map(str::to_string),
        }
    }

    #[test]
    fn sources_deduplicate_by_uri_first_wins() {
        let chunks = vec![
            chunk(Some("FDA"), Some("https://fda.gov")),
            chunk(Some("FDA mirror"), Some("https://fda.gov")),
            chunk(Some("NIH"), Some("https://nih.gov")),
        ];
        let sources = collect_web_sources(&chunks);
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].title, "FDA");
        assert_eq!(sources[1].uri, "https://nih.gov");
    }

    #[test]
    fn sources_drop_empty_uris_and_default_titles() {
        let chunks = vec![
            chunk(Some("orphan"), None),
            chunk(None, Some("https://example.com")),
        ];
        let sources = collect_web_sources(&chunks);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].title, "Source");
    }
}
