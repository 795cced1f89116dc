use async_trait::async_trait;
use reqwest::Client;

use crate::config::GeminiConfig;
use crate::error::{Result, WritingCoachError};
use crate::models::{
    Content, GenerateContentRequest, GenerateContentResponse, HarmCategory, Part, SafetySetting,
};

#[cfg(test)]
use mockall::automock;

/// One configured generative model. Each call sends the given parts as a
/// single user turn and returns the response text.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, parts: Vec<Part>) -> Result<String>;
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
    safety_settings: Vec<SafetySetting>,
}

impl GeminiClient {
    pub fn new(cfg: &GeminiConfig) -> Result<Self> {
        if cfg.api_key.is_empty() {
            return Err(WritingCoachError::Config(
                "GEMINI_API_KEY must be set".to_string(),
            ));
        }
        let safety_settings = [HarmCategory::Harassment, HarmCategory::HateSpeech]
            .into_iter()
            .map(|category| SafetySetting {
                category,
                threshold: cfg.safety_threshold,
            })
            .collect();

        Ok(Self {
            client: Client::new(),
            api_key: cfg.api_key.clone(),
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            safety_settings,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    fn request(&self, parts: Vec<Part>) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
            safety_settings: self.safety_settings.clone(),
        }
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(&self, parts: Vec<Part>) -> Result<String> {
        let request = self.request(parts);
        tracing::debug!(model = %self.model, parts = request.contents[0].parts.len(), "Calling Gemini generateContent");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| WritingCoachError::Http(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(WritingCoachError::Transport(format!(
                "Gemini API returned {status}: {body}"
            )));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            WritingCoachError::Transport(format!("Failed to parse Gemini API response: {e}"))
        })?;

        parsed
            .text()
            .ok_or_else(|| WritingCoachError::Model(parsed.diagnose()))
    }
}
