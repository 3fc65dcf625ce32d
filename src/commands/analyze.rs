use colored::Colorize;
use log::error;

use crate::commands::spinner;
use crate::gateway::AiGateway;
use crate::profile::manager::ProfileManager;
use crate::profile::types::{AnalysisResult, HistoryKind, IntoleranceLevel, MealPlan};

/// The text-query panel: safety analysis and the meal-plan mode. The two
/// are mutually exclusive; starting one clears the other's result.
pub struct AnalyzerPanel {
    result: Option<AnalysisResult>,
    meal_plan: Option<MealPlan>,
}

impl AnalyzerPanel {
    pub fn new() -> Self {
        Self {
            result: None,
            meal_plan: None,
        }
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn meal_plan(&self) -> Option<&MealPlan> {
        self.meal_plan.as_ref()
    }

    pub async fn check(
        &mut self,
        query: &str,
        gateway: &AiGateway,
        profiles: &mut ProfileManager,
    ) -> Result<(), String> {
        if query.is_empty() {
            return Err("Please provide a dish or product to check.".to_string());
        }

        self.result = None;
        self.meal_plan = None;

        let pb = spinner("Analyzing with live web search...");
        let outcome = gateway
            .analyze_food_safety(
                query,
                &profiles.profile().intolerances,
                &profiles.profile().health,
            )
            .await;
        pb.finish_and_clear();

        let result = outcome.map_err(|e| {
            error!("Food safety analysis failed for {:?}: {}", query, e);
            e.to_string()
        })?;

        profiles.record_analysis(
            HistoryKind::Search,
            query,
            result.safety_score,
            &result.summary,
        );

        render_analysis(&result);
        self.result = Some(result);
        Ok(())
    }

    pub async fn plan(
        &mut self,
        gateway: &AiGateway,
        profiles: &ProfileManager,
    ) -> Result<(), String> {
        self.result = None;
        self.meal_plan = None;

        let safe_foods: Vec<String> = profiles
            .profile()
            .intolerances
            .iter()
            .filter(|i| i.level == IntoleranceLevel::Normal)
            .map(|i| i.food.clone())
            .collect();

        let pb = spinner("Curating menu...");
        let outcome = gateway
            .generate_meal_plan(&safe_foods, &profiles.profile().health)
            .await;
        pb.finish_and_clear();

        let plan = outcome.map_err(|e| {
            error!("Meal plan generation failed: {}", e);
            e.to_string()
        })?;

        render_meal_plan(&plan, &profiles.profile().health.preference);
        self.meal_plan = Some(plan);
        Ok(())
    }
}

fn score_label(score: f64) -> colored::ColoredString {
    if score >= 8.0 {
        format!("{score}/10 Safe").green().bold()
    } else if score >= 5.0 {
        format!("{score}/10 Caution").yellow().bold()
    } else {
        format!("{score}/10 Unsafe").red().bold()
    }
}

fn render_analysis(result: &AnalysisResult) {
    println!("\n🛡️  Safety Score: {}", score_label(result.safety_score));
    if let Some(glycemic) = result.glycemic_score {
        println!("📈 Glycemic Score: {}", format!("{glycemic}/10").cyan());
    }
    println!("\n{}", result.summary);

    if result.found_allergens.is_empty() {
        println!("\n✅ {}", "No profile triggers found.".green());
    } else {
        println!("\n⚠️  Detected triggers:");
        for allergen in &result.found_allergens {
            println!("  • {}", allergen.red().bold());
        }
    }

    if let Some(note) = &result.health_note {
        println!("\n💡 Health Insight: {}", note.italic());
    }

    if let Some(sources) = &result.web_sources {
        if !sources.is_empty() {
            println!("\n🌐 Verified Sources:");
            for source in sources {
                println!("  • {} — {}", source.title.bold(), source.uri.underline());
            }
        }
    }
    println!();
}

fn render_meal_plan(plan: &MealPlan, preference: &str) {
    println!("\n🍳 {}: {}", "Breakfast".cyan().bold(), plan.breakfast);
    println!("🥗 {}: {}", "Lunch".cyan().bold(), plan.lunch);
    println!("🍲 {}: {}", "Dinner".cyan().bold(), plan.dinner);
    println!("\n\"{}\"", plan.explanation.italic());
    println!("{}", format!("Tailored for {preference} diet").dimmed());
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::store::MemoryStore;
    use crate::providers::traits::{GenerateRequest, GenerativeProvider, ModelResponse};
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    struct OneShotProvider {
        text: Option<String>,
    }

    #[async_trait]
    impl GenerativeProvider for OneShotProvider {
        async fn generate(&self, _request: GenerateRequest) -> Result<ModelResponse> {
            match &self.text {
                Some(text) => Ok(ModelResponse {
                    text: text.clone(),
                    grounding: Vec::new(),
                }),
                None => Err(anyhow!("network down")),
            }
        }

        async fn get_model_info(&self) -> Result<String> {
            Ok("stub".to_string())
        }
    }

    fn fixtures(text: Option<&str>) -> (AiGateway, ProfileManager) {
        let gateway = AiGateway::new(Box::new(OneShotProvider {
            text: text.map(str::to_string),
        }));
        let profiles = ProfileManager::new(Box::new(MemoryStore::new()));
        (gateway, profiles)
    }

    #[tokio::test]
    async fn successful_check_appends_search_history() {
        let (gateway, mut profiles) = fixtures(Some(
            "```json\n{\"safetyScore\":9,\"summary\":\"fine\",\"foundAllergens\":[]}\n```",
        ));
        let mut panel = AnalyzerPanel::new();

        panel.check("oat latte", &gateway, &mut profiles).await.unwrap();

        assert!(panel.result().is_some());
        let history = &profiles.profile().history;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, HistoryKind::Search);
        assert_eq!(history[0].query, "oat latte");
        assert_eq!(history[0].safety_score, 9.0);
    }

    #[tokio::test]
    async fn failed_check_leaves_result_and_history_unset() {
        let (gateway, mut profiles) = fixtures(None);
        let mut panel = AnalyzerPanel::new();

        let err = panel
            .check("mystery", &gateway, &mut profiles)
            .await
            .unwrap_err();

        assert_eq!(err, "Failed to analyze food. Please try again.");
        assert!(panel.result().is_none());
        assert!(profiles.profile().history.is_empty());
    }

    #[tokio::test]
    async fn plan_clears_analysis_result() {
        let (gateway, mut profiles) = fixtures(Some(
            "```json\n{\"safetyScore\":9,\"summary\":\"fine\",\"foundAllergens\":[]}\n```",
        ));
        let mut panel = AnalyzerPanel::new();
        panel.check("toast", &gateway, &mut profiles).await.unwrap();
        assert!(panel.result().is_some());

        // The stub text is not a valid meal plan, so the call fails; the
        // analysis result must be cleared regardless.
        let _ = panel.plan(&gateway, &profiles).await;
        assert!(panel.result().is_none());
        assert!(panel.meal_plan().is_none());
    }

    #[tokio::test]
    async fn plan_renders_from_safe_foods_only() {
        let (gateway, mut profiles) = fixtures(Some(
            r#"{"breakfast":"oats","lunch":"rice","dinner":"fish","explanation":"ok"}"#,
        ));
        profiles.add_intolerance("Oats", IntoleranceLevel::Normal);
        profiles.add_intolerance("Dairy", IntoleranceLevel::Elevated);

        let mut panel = AnalyzerPanel::new();
        panel.plan(&gateway, &profiles).await.unwrap();
        assert_eq!(panel.meal_plan().unwrap().breakfast, "oats");
        // Meal planning never writes history.
        assert!(profiles.profile().history.is_empty());
    }
}
