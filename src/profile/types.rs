use serde::{Deserialize, Serialize};

/// How strongly the user reacts to a food, as classified by their report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntoleranceLevel {
    Normal,
    Borderline,
    Elevated,
}

impl IntoleranceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntoleranceLevel::Normal => "normal",
            IntoleranceLevel::Borderline => "borderline",
            IntoleranceLevel::Elevated => "elevated",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "normal" => Some(IntoleranceLevel::Normal),
            "borderline" => Some(IntoleranceLevel::Borderline),
            "elevated" => Some(IntoleranceLevel::Elevated),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntoleranceItem {
    pub id: String,
    pub food: String,
    pub level: IntoleranceLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthProfile {
    pub condition: String,
    pub preference: String,
}

impl Default for HealthProfile {
    fn default() -> Self {
        Self {
            condition: "none".to_string(),
            preference: "balanced".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    Scan,
    Search,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: HistoryKind,
    /// The search term, or the fixed scan label for label scans.
    pub query: String,
    /// Unix milliseconds.
    pub timestamp: i64,
    pub safety_score: f64,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub intolerances: Vec<IntoleranceItem>,
    pub health: HealthProfile,
    pub is_onboarded: bool,
    #[serde(default)]
    pub history: Vec<HistoryItem>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            intolerances: Vec::new(),
            health: HealthProfile::default(),
            is_onboarded: false,
            history: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSource {
    pub title: String,
    pub uri: String,
}

/// One completed analysis, as returned by the model. Transient: rendered
/// once and only the score/summary make it into history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// 1-10, 10 is safest.
    #[serde(default)]
    pub safety_score: f64,
    /// 1-10, 10 is low glycemic impact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glycemic_score: Option<f64>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub found_allergens: Vec<String>,
    /// Verbatim ingredients text extracted from a label image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredients_text: Option<String>,
    /// Search-grounding citations, deduplicated by uri.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_sources: Option<Vec<WebSource>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_note: Option<String>,
    /// Ingredients-list region as [ymin, xmin, ymax, xmax] percentages
    /// (0-100). Model convention, preserved exactly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MealPlan {
    #[serde(default)]
    pub breakfast: String,
    #[serde(default)]
    pub lunch: String,
    #[serde(default)]
    pub dinner: String,
    #[serde(default)]
    pub explanation: String,
}
