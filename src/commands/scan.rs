use std::fs;

use colored::Colorize;
use log::error;

use crate::commands::spinner;
use crate::gateway::AiGateway;
use crate::profile::manager::ProfileManager;
use crate::profile::types::{AnalysisResult, HistoryKind};

/// History entries from the scanner all carry this query label; the scanned
/// image itself is not kept.
const SCAN_QUERY_LABEL: &str = "Label Scan";

/// The image panel: label photo in, allergen verdict out.
pub struct ScannerPanel {
    result: Option<AnalysisResult>,
}

impl ScannerPanel {
    pub fn new() -> Self {
        Self { result: None }
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub async fn scan(
        &mut self,
        path: &str,
        gateway: &AiGateway,
        profiles: &mut ProfileManager,
    ) -> Result<(), String> {
        self.result = None;

        let image = fs::read(path).map_err(|e| format!("Could not read image {path}: {e}"))?;

        let pb = spinner("Analyzing label...");
        let outcome = gateway
            .scan_product_label(image, &profiles.profile().intolerances)
            .await;
        pb.finish_and_clear();

        let result = outcome.map_err(|e| {
            error!("Label scan failed for {}: {}", path, e);
            e.to_string()
        })?;

        profiles.record_analysis(
            HistoryKind::Scan,
            SCAN_QUERY_LABEL,
            result.safety_score,
            &result.summary,
        );

        render_scan(&result);
        self.result = Some(result);
        Ok(())
    }
}

fn render_scan(result: &AnalysisResult) {
    let score = result.safety_score;
    let label = if score >= 8.0 {
        format!("{score}/10 Safe").green().bold()
    } else if score >= 5.0 {
        format!("{score}/10 Caution").yellow().bold()
    } else {
        format!("{score}/10 Unsafe").red().bold()
    };
    println!("\n📷 Scan result: {}", label);
    println!("\n{}", result.summary);

    if !result.found_allergens.is_empty() {
        println!("\n⚠️  Matched on the label:");
        for allergen in &result.found_allergens {
            println!("  • {}", allergen.red().bold());
        }
    }

    if let Some(text) = &result.ingredients_text {
        println!("\n📄 Ingredients (triggers highlighted):");
        println!("{}", highlight_allergens(text, &result.found_allergens));
    }

    if let Some(bbox) = &result.bounding_box {
        if bbox.len() == 4 {
            // [ymin, xmin, ymax, xmax] in percentages, as the model reports it.
            println!(
                "\n🔲 Ingredients region: y {:.0}%-{:.0}%, x {:.0}%-{:.0}%",
                bbox[0], bbox[2], bbox[1], bbox[3]
            );
        }
    }
    println!();
}

/// Byte ranges of every case-insensitive occurrence of any allergen within
/// the ingredients text, sorted and merged.
pub fn allergen_spans(text: &str, allergens: &[String]) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    for allergen in allergens {
        let needle = allergen.trim();
        if needle.is_empty() {
            continue;
        }
        let mut i = 0;
        while i + needle.len() <= text.len() {
            match text.get(i..i + needle.len()) {
                Some(window) if window.eq_ignore_ascii_case(needle) => {
                    spans.push((i, i + needle.len()));
                    i += needle.len();
                }
                _ => i += 1,
            }
        }
    }
    spans.sort_unstable();

    let mut merged: Vec<(usize, usize)> = Vec::new();
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.0 < last.1 => last.1 = last.1.max(span.1),
            _ => merged.push(span),
        }
    }
    merged
}

fn highlight_allergens(text: &str, allergens: &[String]) -> String {
    let mut out = String::new();
    let mut cursor = 0;
    for (start, end) in allergen_spans(text, allergens) {
        out.push_str(&text[cursor..start]);
        out.push_str(&text[start..end].red().bold().underline().to_string());
        cursor = end;
    }
    out.push_str(&text[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allergens(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn spans_match_case_insensitively() {
        let text = "Water, MILK powder, salt, milk protein";
        let spans = allergen_spans(text, &allergens(&["milk"]));
        assert_eq!(spans, vec![(7, 11), (26, 30)]);
        assert_eq!(&text[7..11], "MILK");
    }

    #[test]
    fn spans_merge_overlaps_and_sort() {
        let text = "soy lecithin and soya flour";
        let spans = allergen_spans(text, &allergens(&["soya", "soy"]));
        assert_eq!(spans, vec![(0, 3), (17, 21)]);
    }

    #[test]
    fn no_allergens_means_no_spans() {
        assert!(allergen_spans("water, salt", &[]).is_empty());
        assert!(allergen_spans("water, salt", &allergens(&["", "  "])).is_empty());
    }

    #[test]
    fn highlight_keeps_the_full_text() {
        colored::control::set_override(false);
        let text = "water, milk, salt";
        let highlighted = highlight_allergens(text, &allergens(&["milk"]));
        assert_eq!(highlighted, text);
        colored::control::unset_override();
    }
}
