use std::env;

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
}

impl GeminiConfig {
    pub fn from_env() -> Result<Self, String> {
        let api_key = env::var("GEMINI_API_KEY")
            .map_err(|_| "GEMINI_API_KEY environment variable not set".to_string())?;
        Ok(Self::with_api_key(api_key))
    }

    pub fn with_api_key(api_key: String) -> Self {
        let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string());

        let api_url = env::var("GEMINI_API_URL")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta/models".to_string());

        Self {
            api_key,
            api_url,
            model,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub profile_path: String,
}

impl StorageConfig {
    pub fn from_env() -> Self {
        let profile_path = env::var("ALLERGY_GUARD_PROFILE")
            .unwrap_or_else(|_| "data/profile.json".to_string());

        Self { profile_path }
    }
}
