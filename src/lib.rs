pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod normalizer;
pub mod notifications;
pub mod prompts;
pub mod state;
pub mod topics;
pub mod transport;

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::Result;
use crate::gateway::ModelGateway;
use crate::models::{AnalysisPayload, AnalysisRequest, GenerationRequest, ModelResult};
use crate::notifications::{NotificationQueue, Severity};
use crate::state::StateHandle;
use crate::transport::{GeminiClient, ModelClient};

pub const BUSY_MESSAGE: &str = "A request is already in progress";

/// One user session: a gateway, the state it reports into, and the toast
/// queue. Mirrors what a page does around a gateway call: refuse while busy,
/// toast on success, surface the inline error otherwise.
pub struct WritingSession {
    gateway: ModelGateway,
    notifications: NotificationQueue,
}

impl WritingSession {
    pub fn new(cfg: &Config) -> Result<Self> {
        let client = Arc::new(GeminiClient::new(&cfg.gemini)?);
        tracing::info!(model = client.model(), "Gemini client configured");
        Ok(Self::with_client(client, cfg.notification_ttl()))
    }

    pub fn with_client(client: Arc<dyn ModelClient>, toast_ttl: Duration) -> Self {
        Self {
            gateway: ModelGateway::new(client, StateHandle::new()),
            notifications: NotificationQueue::new(toast_ttl),
        }
    }

    pub fn gateway(&self) -> &ModelGateway {
        &self.gateway
    }

    pub fn state(&self) -> &StateHandle {
        self.gateway.state()
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    /// Analyze typed text or a handwriting image. `Err` carries the message
    /// to show next to the submit control.
    pub async fn improve(&self, request: &AnalysisRequest) -> std::result::Result<ModelResult, String> {
        let Some(guard) = self.state().try_begin() else {
            return Err(BUSY_MESSAGE.to_string());
        };
        let result = match request.payload() {
            AnalysisPayload::Text(text) => {
                self.gateway
                    .analyze_text_guarded(guard, text, request.content_kind())
                    .await
            }
            AnalysisPayload::Image(image) => {
                self.gateway.analyze_handwriting_guarded(guard, image).await
            }
        };
        match result {
            Some(result) => {
                self.notifications.push(
                    "Analysis Complete",
                    Some("Your writing has been analyzed successfully".to_string()),
                    Severity::Success,
                );
                Ok(result)
            }
            None => Err(self.failure_message()),
        }
    }

    pub async fn generate(&self, request: &GenerationRequest) -> std::result::Result<String, String> {
        let Some(guard) = self.state().try_begin() else {
            return Err(BUSY_MESSAGE.to_string());
        };
        match self
            .gateway
            .generate_content_guarded(guard, request.topic(), request.content_kind())
            .await
        {
            Some(text) => {
                self.notifications.push(
                    "Content Generated",
                    Some(format!("Your {} is ready", request.content_kind().noun())),
                    Severity::Success,
                );
                Ok(text)
            }
            None => Err(self.failure_message()),
        }
    }

    fn failure_message(&self) -> String {
        self.state()
            .last_error()
            .unwrap_or_else(|| "Something went wrong. Please try again.".to_string())
    }
}
