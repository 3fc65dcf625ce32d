use std::path::Path;

use log::warn;
use uuid::Uuid;

use crate::gateway::AiGateway;
use crate::profile::types::{HealthProfile, IntoleranceItem, IntoleranceLevel};

/// Uploaded reports above this size are rejected before the gateway is
/// involved.
pub const MAX_REPORT_BYTES: usize = 20 * 1024 * 1024;

pub const COMMON_ALLERGENS: [&str; 8] = [
    "Gluten",
    "Dairy",
    "Peanuts",
    "Tree Nuts",
    "Shellfish",
    "Soy",
    "Eggs",
    "Fish",
];

pub const CONDITIONS: [&str; 6] = [
    "none",
    "type1-diabetes",
    "type2-diabetes",
    "celiac",
    "hypertension",
    "ibs",
];

pub const PREFERENCES: [&str; 6] = [
    "balanced",
    "vegan",
    "vegetarian",
    "keto",
    "paleo",
    "mediterranean",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Health,
    Triggers,
    Review,
}

/// The 3-step onboarding wizard. Transitions are user-driven; a failed
/// document parse keeps the wizard on its current step so the user can fall
/// back to manual selection.
pub struct OnboardingFlow {
    step: Step,
    health: HealthProfile,
    manual_selections: Vec<String>,
    parsed_foods: Vec<IntoleranceItem>,
    error: Option<String>,
}

impl Default for OnboardingFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl OnboardingFlow {
    pub fn new() -> Self {
        Self {
            step: Step::Health,
            health: HealthProfile::default(),
            manual_selections: Vec::new(),
            parsed_foods: Vec::new(),
            error: None,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn health(&self) -> &HealthProfile {
        &self.health
    }

    pub fn parsed_foods(&self) -> &[IntoleranceItem] {
        &self.parsed_foods
    }

    pub fn manual_selections(&self) -> &[String] {
        &self.manual_selections
    }

    /// The last user-visible error, cleared on read.
    pub fn take_error(&mut self) -> Option<String> {
        self.error.take()
    }

    pub fn set_condition(&mut self, condition: &str) {
        self.health.condition = condition.to_string();
    }

    pub fn set_preference(&mut self, preference: &str) {
        self.health.preference = preference.to_string();
    }

    pub fn toggle_trigger(&mut self, label: &str) {
        if let Some(pos) = self.manual_selections.iter().position(|s| s == label) {
            self.manual_selections.remove(pos);
        } else {
            self.manual_selections.push(label.to_string());
        }
    }

    pub fn advance(&mut self) -> Result<(), String> {
        match self.step {
            Step::Health => {
                self.step = Step::Triggers;
                Ok(())
            }
            Step::Triggers => {
                if self.manual_selections.is_empty() && self.parsed_foods.is_empty() {
                    return Err("Select at least one trigger or upload a report first.".to_string());
                }
                self.step = Step::Review;
                Ok(())
            }
            Step::Review => Ok(()),
        }
    }

    pub fn back(&mut self) {
        self.step = match self.step {
            Step::Health | Step::Triggers => Step::Health,
            Step::Review => Step::Triggers,
        };
    }

    /// Runs the AI document parse. Oversize input never reaches the gateway
    /// and a failed parse leaves the step unchanged; both only record a
    /// visible error. Success stores the items and jumps to review.
    pub async fn upload_report(&mut self, gateway: &AiGateway, data: Vec<u8>, mime_type: &str) {
        if data.len() > MAX_REPORT_BYTES {
            self.error =
                Some("File is too large. Please upload a document smaller than 20MB.".to_string());
            return;
        }

        match gateway.parse_report_document(data, mime_type).await {
            Ok(items) => {
                self.parsed_foods = items;
                self.error = None;
                self.step = Step::Review;
            }
            Err(e) => {
                warn!("Report upload failed: {}", e);
                self.error = Some(
                    "Could not parse document. Please try again or skip to manual entry."
                        .to_string(),
                );
            }
        }
    }

    /// Terminal action: parsed items merged with manual toggles, manual
    /// picks defaulting to `elevated`.
    pub fn finish(self) -> (HealthProfile, Vec<IntoleranceItem>) {
        let mut intolerances = self.parsed_foods;
        intolerances.extend(self.manual_selections.into_iter().map(|food| {
            IntoleranceItem {
                id: Uuid::new_v4().to_string(),
                food,
                level: IntoleranceLevel::Elevated,
            }
        }));
        (self.health, intolerances)
    }
}

/// Media type for an uploaded report, from the file extension. The model
/// accepts images and PDFs; anything else is sent as JPEG and left for the
/// model to reject.
pub fn report_mime_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::traits::{GenerateRequest, GenerativeProvider, ModelResponse};
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingProvider {
        text: String,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl GenerativeProvider for CountingProvider {
        async fn generate(&self, _request: GenerateRequest) -> Result<ModelResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ModelResponse {
                text: self.text.clone(),
                grounding: Vec::new(),
            })
        }

        async fn get_model_info(&self) -> Result<String> {
            Ok("stub".to_string())
        }
    }

    fn gateway_with(text: &str) -> (AiGateway, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let gateway = AiGateway::new(Box::new(CountingProvider {
            text: text.to_string(),
            calls: calls.clone(),
        }));
        (gateway, calls)
    }

    #[test]
    fn wizard_walks_forward_and_back() {
        let mut flow = OnboardingFlow::new();
        assert_eq!(flow.step(), Step::Health);
        flow.advance().unwrap();
        assert_eq!(flow.step(), Step::Triggers);
        flow.back();
        assert_eq!(flow.step(), Step::Health);
    }

    #[test]
    fn triggers_step_requires_a_selection() {
        let mut flow = OnboardingFlow::new();
        flow.advance().unwrap();
        assert!(flow.advance().is_err());
        assert_eq!(flow.step(), Step::Triggers);

        flow.toggle_trigger("Soy");
        flow.advance().unwrap();
        assert_eq!(flow.step(), Step::Review);
    }

    #[test]
    fn toggling_twice_deselects() {
        let mut flow = OnboardingFlow::new();
        flow.toggle_trigger("Dairy");
        flow.toggle_trigger("Peanuts");
        flow.toggle_trigger("Dairy");
        assert_eq!(flow.manual_selections(), ["Peanuts"]);
    }

    #[test]
    fn finish_defaults_manual_picks_to_elevated() {
        let mut flow = OnboardingFlow::new();
        flow.toggle_trigger("Peanuts");
        flow.toggle_trigger("Dairy");

        let (_, intolerances) = flow.finish();
        assert_eq!(intolerances.len(), 2);
        assert!(intolerances
            .iter()
            .all(|i| i.level == IntoleranceLevel::Elevated));
        assert_ne!(intolerances[0].id, intolerances[1].id);
    }

    #[tokio::test]
    async fn oversize_upload_never_reaches_the_gateway() {
        let (gateway, calls) = gateway_with(r#"{"foods":[]}"#);
        let mut flow = OnboardingFlow::new();
        flow.advance().unwrap();

        flow.upload_report(&gateway, vec![0u8; MAX_REPORT_BYTES + 1], "application/pdf")
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(flow.step(), Step::Triggers);
        assert!(flow.take_error().unwrap().contains("20MB"));
    }

    #[tokio::test]
    async fn parse_failure_stays_on_current_step() {
        let (gateway, calls) = gateway_with("not json at all");
        let mut flow = OnboardingFlow::new();
        flow.advance().unwrap();

        flow.upload_report(&gateway, vec![0u8; 64], "image/png").await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(flow.step(), Step::Triggers);
        assert!(flow.take_error().is_some());
        assert!(flow.parsed_foods().is_empty());
    }

    #[tokio::test]
    async fn successful_parse_advances_to_review() {
        let (gateway, _) =
            gateway_with(r#"{"foods":[{"food":"Wheat","level":"borderline"}]}"#);
        let mut flow = OnboardingFlow::new();
        flow.advance().unwrap();

        flow.upload_report(&gateway, vec![0u8; 64], "application/pdf").await;

        assert_eq!(flow.step(), Step::Review);
        assert_eq!(flow.parsed_foods().len(), 1);
        assert!(flow.take_error().is_none());

        let (_, intolerances) = flow.finish();
        assert_eq!(intolerances[0].food, "Wheat");
        assert_eq!(intolerances[0].level, IntoleranceLevel::Borderline);
    }

    #[test]
    fn report_mime_type_falls_back_to_jpeg() {
        assert_eq!(report_mime_type(Path::new("report.PDF")), "application/pdf");
        assert_eq!(report_mime_type(Path::new("scan.png")), "image/png");
        assert_eq!(report_mime_type(Path::new("photo")), "image/jpeg");
    }
}
