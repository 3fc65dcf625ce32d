use anyhow::{anyhow, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::GeminiConfig;
use crate::providers::traits::{
    GenerateRequest, GenerativeProvider, GroundingChunk, ModelResponse,
};

#[derive(Clone)]
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.config.api_url, self.config.model
        )
    }

    fn build_payload(request: &GenerateRequest) -> Value {
        let mut parts = vec![json!({ "text": request.prompt })];
        if let Some(attachment) = &request.attachment {
            parts.push(json!({
                "inlineData": {
                    "mimeType": attachment.mime_type,
                    "data": BASE64.encode(&attachment.data)
                }
            }));
        }

        let mut payload = json!({
            "contents": [{
                "role": "user",
                "parts": parts
            }]
        });

        if request.web_search {
            payload["tools"] = json!([{ "google_search": {} }]);
        }

        // Schema-constrained JSON mode. Not allowed together with tools.
        if let Some(schema) = &request.response_schema {
            payload["generationConfig"] = json!({
                "responseMimeType": "application/json",
                "responseSchema": schema
            });
        }

        payload
    }

    fn extract_text(response_json: &Value) -> Result<String> {
        let parts = response_json["candidates"][0]["content"]["parts"]
            .as_array()
            .ok_or_else(|| anyhow!("Invalid response format"))?;

        let text: String = parts
            .iter()
            .filter_map(|p| p["text"].as_str())
            .collect::<Vec<_>>()
            .join("");
        Ok(text)
    }

    fn extract_grounding(response_json: &Value) -> Vec<GroundingChunk> {
        response_json["candidates"][0]["groundingMetadata"]["groundingChunks"]
            .as_array()
            .map(|chunks| {
                chunks
                    .iter()
                    .map(|chunk| GroundingChunk {
                        title: chunk["web"]["title"].as_str().map(str::to_string),
                        uri: chunk["web"]["uri"].as_str().map(str::to_string),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl GenerativeProvider for GeminiProvider {
    async fn generate(&self, request: GenerateRequest) -> Result<ModelResponse> {
        let payload = Self::build_payload(&request);

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(anyhow!(
                "API request failed: Status {}, Body: {}",
                status,
                error_text
            ));
        }

        let response_json: Value = response.json().await?;

        if let Some(error) = response_json.get("error") {
            return Err(anyhow!("API returned error: {}", error));
        }

        Ok(ModelResponse {
            text: Self::extract_text(&response_json)?,
            grounding: Self::extract_grounding(&response_json),
        })
    }

    async fn get_model_info(&self) -> Result<String> {
        Ok(self.config.model.clone())
    }
}
