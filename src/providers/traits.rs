use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Inline binary attachment (image or PDF) sent alongside the prompt.
#[derive(Debug, Clone)]
pub struct InlineData {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// A single request to the generative model.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub prompt: String,
    pub attachment: Option<InlineData>,
    /// Ask the model to ground its answer with live web search. Mutually
    /// exclusive with `response_schema` on the Gemini API.
    pub web_search: bool,
    /// JSON schema for constrained decoding; implies a JSON response.
    pub response_schema: Option<Value>,
}

impl GenerateRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_attachment(mut self, mime_type: &str, data: Vec<u8>) -> Self {
        self.attachment = Some(InlineData {
            mime_type: mime_type.to_string(),
            data,
        });
        self
    }

    pub fn with_web_search(mut self) -> Self {
        self.web_search = true;
        self
    }

    pub fn with_response_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }
}

/// One search-grounding citation from response metadata, still raw: either
/// field may be missing.
#[derive(Debug, Clone, Default)]
pub struct GroundingChunk {
    pub title: Option<String>,
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ModelResponse {
    pub text: String,
    pub grounding: Vec<GroundingChunk>,
}

#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    async fn generate(&self, request: GenerateRequest) -> Result<ModelResponse>;

    async fn get_model_info(&self) -> Result<String>;
}
