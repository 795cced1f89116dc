use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

use writing_coach::error::{Result, WritingCoachError};
use writing_coach::models::{
    AnalysisReport, AnalysisRequest, ContentKind, FieldValue, GenerationRequest, ImagePayload,
    ModelResult, Part,
};
use writing_coach::notifications::Severity;
use writing_coach::{BUSY_MESSAGE, WritingSession};

/// Fake model: replies with a fixed answer (or fails), counts calls, and can
/// hold each call until released.
struct FakeModel {
    reply: Option<String>,
    calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl FakeModel {
    fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl writing_coach::transport::ModelClient for FakeModel {
    async fn generate(&self, _parts: Vec<Part>) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.reply
            .clone()
            .ok_or_else(|| WritingCoachError::Transport("network unreachable".to_string()))
    }
}

fn session(model: &Arc<FakeModel>) -> WritingSession {
    WritingSession::with_client(model.clone(), Duration::from_secs(5))
}

#[tokio::test(start_paused = true)]
async fn improve_success_pushes_toast_that_expires() {
    let model = Arc::new(FakeModel::replying(
        r#"{"errors":"Use 'went' instead of 'go'","score":"6/10","improvements":["Use past tense"]}"#,
    ));
    let session = session(&model);

    let result = session
        .improve(&AnalysisRequest::text("He go to market yesterday.", ContentKind::Essay))
        .await
        .expect("analysis should succeed");

    let report = AnalysisReport::from_result(&result).expect("structured result");
    assert_eq!(
        report.errors,
        Some(FieldValue::Text("Use 'went' instead of 'go'".to_string()))
    );
    assert_eq!(report.numeric_score(), Some(6.0));
    assert!(report.vocabulary.is_none());

    let toasts = session.notifications().list();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].title, "Analysis Complete");
    assert_eq!(toasts[0].severity, Severity::Success);

    tokio::time::sleep(Duration::from_millis(5_100)).await;
    assert!(session.notifications().is_empty());
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn improve_failure_returns_inline_error_without_toast() {
    let model = Arc::new(FakeModel::failing());
    let session = session(&model);

    let err = session
        .improve(&AnalysisRequest::text("hello", ContentKind::parse("essay")))
        .await
        .unwrap_err();

    assert_eq!(err, "Failed to analyze text. Please try again.");
    assert!(session.notifications().is_empty());
    assert!(!session.state().is_in_flight());
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn empty_inputs_never_reach_the_model() {
    let model = Arc::new(FakeModel::replying("{}"));
    let session = session(&model);

    let err = session
        .improve(&AnalysisRequest::text("   ", ContentKind::Letter))
        .await
        .unwrap_err();
    assert_eq!(err, "Please enter some text to analyze");

    let err = session
        .improve(&AnalysisRequest::image(ImagePayload::new(Vec::new(), "image/png")))
        .await
        .unwrap_err();
    assert_eq!(err, "Please upload an image to analyze");

    let err = session
        .generate(&GenerationRequest::new("", ContentKind::Essay))
        .await
        .unwrap_err();
    assert_eq!(err, "Please enter a topic to generate content");

    assert_eq!(model.calls(), 0);
    assert!(session.notifications().is_empty());
}

#[tokio::test]
async fn handwriting_raw_text_is_kept() {
    let model = Arc::new(FakeModel::replying("The handwriting is neat and legible."));
    let session = session(&model);

    let image = ImagePayload::from_bytes(vec![0xFF, 0xD8, 0xFF, 0xDB, 0x00]);
    let result = session.improve(&AnalysisRequest::image(image)).await.unwrap();

    assert_eq!(
        result,
        ModelResult::RawText("The handwriting is neat and legible.".to_string())
    );
    assert!(AnalysisReport::from_result(&result).is_none());
}

#[tokio::test]
async fn generate_returns_text_and_toasts() {
    let model = Arc::new(FakeModel::replying("Respected Sir,\nI beg to state..."));
    let session = session(&model);

    let text = session
        .generate(&GenerationRequest::new("Leave for two days", ContentKind::Application))
        .await
        .unwrap();

    assert!(text.starts_with("Respected Sir"));
    let toasts = session.notifications().list();
    assert_eq!(toasts[0].title, "Content Generated");
    assert_eq!(toasts[0].description.as_deref(), Some("Your application is ready"));
}

#[tokio::test]
async fn second_request_while_in_flight_is_refused() {
    let gate = Arc::new(Notify::new());
    let model = Arc::new(FakeModel {
        reply: Some(r#"{"score": 8}"#.to_string()),
        calls: AtomicUsize::new(0),
        gate: Some(gate.clone()),
    });
    let session = session(&model);
    let request = AnalysisRequest::text("A short story.", ContentKind::Story);

    let first = session.improve(&request);
    let second = async {
        while !session.state().is_in_flight() {
            tokio::task::yield_now().await;
        }
        let refused = session.improve(&request).await;
        gate.notify_one();
        refused
    };
    let (first, second) = tokio::join!(first, second);

    assert_eq!(second.unwrap_err(), BUSY_MESSAGE);
    assert!(first.is_ok());
    assert_eq!(model.calls(), 1);
    assert!(!session.state().is_in_flight());
    assert!(session.state().last_error().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_on_worker_threads_admit_exactly_one() {
    let gate = Arc::new(Notify::new());
    let model = Arc::new(FakeModel {
        reply: Some(r#"{"score": 7}"#.to_string()),
        calls: AtomicUsize::new(0),
        gate: Some(gate.clone()),
    });
    let session = Arc::new(session(&model));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let session = session.clone();
            tokio::spawn(async move {
                session
                    .improve(&AnalysisRequest::text("Time and tide.", ContentKind::Essay))
                    .await
            })
        })
        .collect();

    // The admitted request parks on the gate; everyone else must be refused.
    while handles.iter().filter(|h| h.is_finished()).count() < 7 {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    gate.notify_one();

    let mut admitted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => admitted += 1,
            Err(message) => assert_eq!(message, BUSY_MESSAGE),
        }
    }
    assert_eq!(admitted, 1);
    assert_eq!(model.calls(), 1);
    assert!(!session.state().is_in_flight());
}

#[tokio::test]
async fn data_url_image_reaches_the_model_and_other_kind_toasts_as_content() {
    let model = Arc::new(FakeModel::replying(r#"{"transcription":"Time is money","score":7}"#));
    let session = session(&model);

    let image = ImagePayload::from_data_url("data:image/png;base64,iVBORw0KGgo=").unwrap();
    assert_eq!(image.mime_type(), "image/png");
    let result = session.improve(&AnalysisRequest::image(image)).await.unwrap();
    let report = AnalysisReport::from_result(&result).unwrap();
    assert_eq!(report.numeric_score(), Some(7.0));

    session
        .generate(&GenerationRequest::new("Road safety", ContentKind::Other))
        .await
        .unwrap();
    let toasts = session.notifications().list();
    assert_eq!(toasts[1].description.as_deref(), Some("Your content is ready"));
    assert_eq!(model.calls(), 2);
}
