use std::sync::Arc;

use crate::models::{ContentKind, ImagePayload, ModelResult, Part};
use crate::normalizer::normalize;
use crate::prompts::{build_analysis_prompt, build_generation_prompt, build_handwriting_prompt};
use crate::state::{InFlightGuard, StateHandle};
use crate::transport::ModelClient;

pub const EMPTY_TEXT_MESSAGE: &str = "Please enter some text to analyze";
pub const EMPTY_TOPIC_MESSAGE: &str = "Please enter a topic to generate content";
pub const EMPTY_IMAGE_MESSAGE: &str = "Please upload an image to analyze";
pub const ANALYZE_FAILED_MESSAGE: &str = "Failed to analyze text. Please try again.";
pub const GENERATE_FAILED_MESSAGE: &str = "Failed to generate content. Please try again.";
pub const HANDWRITING_FAILED_MESSAGE: &str = "Failed to analyze handwriting. Please try again.";

/// Sole mediator between callers and the model.
///
/// Every operation makes at most one model call, records failures in the
/// shared [`StateHandle`] and returns `None` instead of an error. Starting a
/// second operation while one is in flight is not prevented here; the session
/// reserves the flag with `StateHandle::try_begin` and hands the guard over.
#[derive(Clone)]
pub struct ModelGateway {
    client: Arc<dyn ModelClient>,
    state: StateHandle,
}

impl ModelGateway {
    pub fn new(client: Arc<dyn ModelClient>, state: StateHandle) -> Self {
        Self { client, state }
    }

    pub fn state(&self) -> &StateHandle {
        &self.state
    }

    pub async fn analyze_text(&self, text: &str, kind: ContentKind) -> Option<ModelResult> {
        self.analyze_text_guarded(self.state.begin(), text, kind).await
    }

    pub(crate) async fn analyze_text_guarded(
        &self,
        _guard: InFlightGuard,
        text: &str,
        kind: ContentKind,
    ) -> Option<ModelResult> {
        if text.trim().is_empty() {
            self.state.set_error(EMPTY_TEXT_MESSAGE);
            return None;
        }

        tracing::info!(kind = %kind, chars = text.len(), "Analyzing text");
        let prompt = build_analysis_prompt(text, kind);
        match self.client.generate(vec![Part::text(prompt)]).await {
            Ok(raw) => Some(normalize(&raw)),
            Err(e) => {
                tracing::error!("AI analysis error: {e}");
                self.state.set_error(ANALYZE_FAILED_MESSAGE);
                None
            }
        }
    }

    /// Returns the model's text as-is; generated content is never decoded.
    pub async fn generate_content(&self, topic: &str, kind: ContentKind) -> Option<String> {
        self.generate_content_guarded(self.state.begin(), topic, kind).await
    }

    pub(crate) async fn generate_content_guarded(
        &self,
        _guard: InFlightGuard,
        topic: &str,
        kind: ContentKind,
    ) -> Option<String> {
        if topic.trim().is_empty() {
            self.state.set_error(EMPTY_TOPIC_MESSAGE);
            return None;
        }

        tracing::info!(kind = %kind, "Generating content");
        let prompt = build_generation_prompt(topic, kind);
        match self.client.generate(vec![Part::text(prompt)]).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::error!("AI generation error: {e}");
                self.state.set_error(GENERATE_FAILED_MESSAGE);
                None
            }
        }
    }

    pub async fn analyze_handwriting_image(&self, image: &ImagePayload) -> Option<ModelResult> {
        self.analyze_handwriting_guarded(self.state.begin(), image).await
    }

    pub(crate) async fn analyze_handwriting_guarded(
        &self,
        _guard: InFlightGuard,
        image: &ImagePayload,
    ) -> Option<ModelResult> {
        if image.is_empty() {
            self.state.set_error(EMPTY_IMAGE_MESSAGE);
            return None;
        }

        tracing::info!(mime = image.mime_type(), bytes = image.bytes().len(), "Analyzing handwriting");
        let parts = vec![Part::text(build_handwriting_prompt()), image.to_part()];
        match self.client.generate(parts).await {
            Ok(raw) => Some(normalize(&raw)),
            Err(e) => {
                tracing::error!("AI handwriting analysis error: {e}");
                self.state.set_error(HANDWRITING_FAILED_MESSAGE);
                None
            }
        }
    }
}
