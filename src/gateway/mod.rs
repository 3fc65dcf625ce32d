pub mod decode;

use log::error;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::profile::types::{
    AnalysisResult, HealthProfile, IntoleranceItem, IntoleranceLevel, MealPlan,
};
use crate::providers::traits::{GenerateRequest, GenerativeProvider};

/// Fixed user-facing messages; the interesting detail goes to the log.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Failed to analyze report document.")]
    ReportParse,
    #[error("Failed to analyze food. Please try again.")]
    FoodAnalysis,
    #[error("Failed to generate meal plan.")]
    MealPlan,
    #[error("Failed to scan label.")]
    LabelScan,
}

#[derive(Debug, Deserialize)]
struct ParsedReport {
    #[serde(default)]
    foods: Vec<ParsedFood>,
}

#[derive(Debug, Deserialize)]
struct ParsedFood {
    food: String,
    level: IntoleranceLevel,
}

/// Four independent request/response exchanges with the generative model.
/// No retries, no timeouts: a failure rejects with a generic error for the
/// caller to display.
pub struct AiGateway {
    provider: Box<dyn GenerativeProvider>,
}

impl AiGateway {
    pub fn new(provider: Box<dyn GenerativeProvider>) -> Self {
        Self { provider }
    }

    /// Extracts a classified food list from an intolerance report (image or
    /// PDF). Schema-constrained; each returned entry gets a synthetic id.
    pub async fn parse_report_document(
        &self,
        data: Vec<u8>,
        mime_type: &str,
    ) -> Result<Vec<IntoleranceItem>, GatewayError> {
        let prompt = "Analyze this food intolerance report document (image or PDF). \
            Extract all food items and classify them into one of three categories: \
            'elevated', 'borderline', or 'normal' based on the report's metrics. \
            Return a JSON object with a key \"foods\" containing the list.";

        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "foods": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "food": { "type": "STRING" },
                            "level": {
                                "type": "STRING",
                                "enum": ["elevated", "borderline", "normal"]
                            }
                        }
                    }
                }
            }
        });

        let request = GenerateRequest::text(prompt)
            .with_attachment(mime_type, data)
            .with_response_schema(schema);

        let response = self.provider.generate(request).await.map_err(|e| {
            error!("Gemini parse report error: {}", e);
            GatewayError::ReportParse
        })?;

        let report: ParsedReport = serde_json::from_str(&response.text).map_err(|e| {
            error!("Report response was not valid JSON: {}", e);
            GatewayError::ReportParse
        })?;

        Ok(report
            .foods
            .into_iter()
            .map(|f| IntoleranceItem {
                id: Uuid::new_v4().to_string(),
                food: f.food,
                level: f.level,
            })
            .collect())
    }

    /// Checks a dish or product against the profile, grounded with live web
    /// search. Search grounding is incompatible with schema-constrained
    /// decoding on the Gemini API, so the response is prompted as fenced
    /// JSON and decoded manually; non-JSON output degrades, it never fails.
    pub async fn analyze_food_safety(
        &self,
        query: &str,
        intolerances: &[IntoleranceItem],
        health: &HealthProfile,
    ) -> Result<AnalysisResult, GatewayError> {
        let problem_foods = render_problem_foods(intolerances);

        let prompt = format!(
            "Act as a clinical nutritionist.\n\
             First, use Google Search to find the exact ingredients and nutritional profile for: \"{query}\".\n\n\
             Then, analyze it against this User Profile:\n\
             - Intolerances: {problem_foods}\n\
             - Health Condition: {condition}\n\
             - Dietary Preference: {preference}\n\n\
             Determine if this food is safe.\n\n\
             Output the result as a strict JSON object wrapped in a code block like this:\n\
             ```json\n\
             {{\n\
               \"safetyScore\": number (1-10, 10 is safest),\n\
               \"glycemicScore\": number (1-10, 10 is low impact/good, optional),\n\
               \"summary\": \"string (concise explanation citing specific ingredients)\",\n\
               \"foundAllergens\": [\"string\" (list specific detected triggers)],\n\
               \"healthNote\": \"string (specific advice for {condition})\"\n\
             }}\n\
             ```",
            condition = health.condition,
            preference = health.preference,
        );

        let request = GenerateRequest::text(prompt).with_web_search();

        let response = self.provider.generate(request).await.map_err(|e| {
            error!("Gemini food analysis error: {}", e);
            GatewayError::FoodAnalysis
        })?;

        let mut result = decode::parse_analysis(&response.text);
        result.web_sources = Some(decode::collect_web_sources(&response.grounding));
        Ok(result)
    }

    /// One-day meal plan from the foods the user tolerates normally.
    /// Schema-constrained; a malformed response propagates as an error.
    pub async fn generate_meal_plan(
        &self,
        safe_foods: &[String],
        health: &HealthProfile,
    ) -> Result<MealPlan, GatewayError> {
        let prompt = format!(
            "Create a 1-day meal plan (Breakfast, Lunch, Dinner) using ONLY these safe foods \
             and compatible ingredients: {}.\n\
             Consider the user's health condition: {} and preference: {}.\n\n\
             Return JSON.",
            safe_foods.join(", "),
            health.condition,
            health.preference,
        );

        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "breakfast": { "type": "STRING" },
                "lunch": { "type": "STRING" },
                "dinner": { "type": "STRING" },
                "explanation": { "type": "STRING" }
            }
        });

        let request = GenerateRequest::text(prompt).with_response_schema(schema);

        let response = self.provider.generate(request).await.map_err(|e| {
            error!("Gemini meal plan error: {}", e);
            GatewayError::MealPlan
        })?;

        serde_json::from_str(&response.text).map_err(|e| {
            error!("Meal plan response was not valid JSON: {}", e);
            GatewayError::MealPlan
        })
    }

    /// Reads a product label photo for allergens matching the profile.
    /// Schema-constrained; a malformed response propagates as an error.
    pub async fn scan_product_label(
        &self,
        image: Vec<u8>,
        intolerances: &[IntoleranceItem],
    ) -> Result<AnalysisResult, GatewayError> {
        let problem_foods = render_problem_foods(intolerances);

        let prompt = format!(
            "Analyze this product label image. Read the ingredients list carefully.\n\
             Check for these specific intolerances: {problem_foods}.\n\n\
             Output JSON with:\n\
             - safetyScore\n\
             - summary\n\
             - foundAllergens: A list of the specific ingredients found in the text that match \
             the intolerances. Ensure these match the text in the image exactly if possible.\n\
             - ingredientsText: The full, raw text of the ingredients list extracted from the label.\n\n\
             If you detect the ingredients list on the image, provide the bounding box as \
             [ymin, xmin, ymax, xmax] in percentages (0-100)."
        );

        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "safetyScore": { "type": "NUMBER" },
                "summary": { "type": "STRING" },
                "foundAllergens": { "type": "ARRAY", "items": { "type": "STRING" } },
                "ingredientsText": { "type": "STRING" },
                "boundingBox": {
                    "type": "ARRAY",
                    "items": { "type": "NUMBER" },
                    "description": "Bounding box of the ingredients list [ymin, xmin, ymax, xmax] in percentages 0-100"
                }
            }
        });

        let request = GenerateRequest::text(prompt)
            .with_attachment("image/jpeg", image)
            .with_response_schema(schema);

        let response = self.provider.generate(request).await.map_err(|e| {
            error!("Gemini label scan error: {}", e);
            GatewayError::LabelScan
        })?;

        serde_json::from_str(&response.text).map_err(|e| {
            error!("Label scan response was not valid JSON: {}", e);
            GatewayError::LabelScan
        })
    }
}

/// Renders the non-"normal" intolerances as `"name (level)"` joined by
/// commas, the form the prompts expect. "None" when nothing applies.
fn render_problem_foods(intolerances: &[IntoleranceItem]) -> String {
    let rendered: Vec<String> = intolerances
        .iter()
        .filter(|i| i.level != IntoleranceLevel::Normal)
        .map(|i| format!("{} ({})", i.food, i.level.as_str()))
        .collect();
    if rendered.is_empty() {
        "None".to_string()
    } else {
        rendered.join(", ")
    }
}
