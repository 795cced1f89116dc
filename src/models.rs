use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, WritingCoachError};

/// Kind of writing a request is about. Selects the prompt template and the
/// field contract the model is asked to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentKind {
    Essay,
    Letter,
    Application,
    Paragraph,
    Story,
    Report,
    MockTest,
    Other,
}

impl ContentKind {
    pub const ALL: [ContentKind; 8] = [
        ContentKind::Essay,
        ContentKind::Letter,
        ContentKind::Application,
        ContentKind::Paragraph,
        ContentKind::Story,
        ContentKind::Report,
        ContentKind::MockTest,
        ContentKind::Other,
    ];

    /// Total parse: anything unrecognized becomes `Other`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "essay" => ContentKind::Essay,
            "letter" => ContentKind::Letter,
            "application" => ContentKind::Application,
            "paragraph" => ContentKind::Paragraph,
            "story" => ContentKind::Story,
            "report" => ContentKind::Report,
            "mocktest" | "mock_test" | "mock-test" => ContentKind::MockTest,
            _ => ContentKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Essay => "essay",
            ContentKind::Letter => "letter",
            ContentKind::Application => "application",
            ContentKind::Paragraph => "paragraph",
            ContentKind::Story => "story",
            ContentKind::Report => "report",
            ContentKind::MockTest => "mockTest",
            ContentKind::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContentKind::Essay => "Essay",
            ContentKind::Letter => "Letter",
            ContentKind::Application => "Application",
            ContentKind::Paragraph => "Paragraph",
            ContentKind::Story => "Story",
            ContentKind::Report => "Report",
            ContentKind::MockTest => "Mock Test",
            ContentKind::Other => "Other",
        }
    }

    /// Lower-case noun for running text ("your essay", "a report").
    pub fn noun(&self) -> String {
        match self {
            ContentKind::Other => "content".to_string(),
            kind => kind.label().to_lowercase(),
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Text,
    Image,
}

/// Payload of an analysis request: typed text or a handwriting photo.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisPayload {
    Text(String),
    Image(ImagePayload),
}

/// One user-initiated analysis. Built per action and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    content_kind: ContentKind,
    payload: AnalysisPayload,
}

impl AnalysisRequest {
    pub fn text(text: impl Into<String>, content_kind: ContentKind) -> Self {
        Self {
            content_kind,
            payload: AnalysisPayload::Text(text.into()),
        }
    }

    pub fn image(image: ImagePayload) -> Self {
        Self {
            content_kind: ContentKind::Other,
            payload: AnalysisPayload::Image(image),
        }
    }

    pub fn input_kind(&self) -> InputKind {
        match self.payload {
            AnalysisPayload::Text(_) => InputKind::Text,
            AnalysisPayload::Image(_) => InputKind::Image,
        }
    }

    pub fn content_kind(&self) -> ContentKind {
        self.content_kind
    }

    pub fn payload(&self) -> &AnalysisPayload {
        &self.payload
    }
}

/// One user-initiated generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    topic: String,
    content_kind: ContentKind,
}

impl GenerationRequest {
    pub fn new(topic: impl Into<String>, content_kind: ContentKind) -> Self {
        Self {
            topic: topic.into(),
            content_kind,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn content_kind(&self) -> ContentKind {
        self.content_kind
    }
}

/// Normalized model output: a decoded key/value object, or the raw text when
/// the model did not answer with one.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelResult {
    Structured(Map<String, Value>),
    RawText(String),
}

impl ModelResult {
    pub fn as_structured(&self) -> Option<&Map<String, Value>> {
        match self {
            ModelResult::Structured(map) => Some(map),
            ModelResult::RawText(_) => None,
        }
    }

    pub fn as_raw_text(&self) -> Option<&str> {
        match self {
            ModelResult::Structured(_) => None,
            ModelResult::RawText(text) => Some(text),
        }
    }

    /// JSON rendering for display. Raw text is wrapped as `{"rawResponse": ...}`.
    pub fn to_json(&self) -> Value {
        match self {
            ModelResult::Structured(map) => Value::Object(map.clone()),
            ModelResult::RawText(text) => serde_json::json!({ "rawResponse": text }),
        }
    }
}

/// A single feedback field. The model is free to send a list where a string
/// was requested (or the reverse), so every shape is kept.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    List(Vec<Value>),
    Number(f64),
    Other(Value),
}

impl FieldValue {
    /// `None` for JSON null, which is treated the same as a missing key.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(FieldValue::Text(s.clone())),
            Value::Array(items) => Some(FieldValue::List(items.clone())),
            Value::Number(n) => n.as_f64().map(FieldValue::Number),
            other => Some(FieldValue::Other(other.clone())),
        }
    }

    /// Display lines: one per list item, or a single line for scalars.
    pub fn lines(&self) -> Vec<String> {
        match self {
            FieldValue::Text(s) => vec![s.clone()],
            FieldValue::List(items) => items.iter().map(render_item).collect(),
            FieldValue::Number(n) => vec![n.to_string()],
            FieldValue::Other(v) => vec![render_item(v)],
        }
    }
}

fn render_item(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{k}: {}", render_item(v)))
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

/// Score may arrive as `7`, `7.5`, `"7"` or `"7/10"`.
fn deserialize_flexible_score<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlexibleScore {
        Float(f64),
        String(String),
    }

    let value = Option::<FlexibleScore>::deserialize(deserializer)?;
    Ok(match value {
        Some(FlexibleScore::Float(f)) => Some(f),
        Some(FlexibleScore::String(s)) => s
            .split('/')
            .next()
            .and_then(|head| head.trim().parse::<f64>().ok()),
        None => None,
    })
}

#[derive(Deserialize)]
struct ScoreOnly {
    #[serde(default, deserialize_with = "deserialize_flexible_score")]
    score: Option<f64>,
}

/// Explicit optional-field view of a structured analysis result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisReport {
    pub transcription: Option<FieldValue>,
    pub format: Option<FieldValue>,
    pub errors: Option<FieldValue>,
    pub structure: Option<FieldValue>,
    pub organization: Option<FieldValue>,
    pub vocabulary: Option<FieldValue>,
    pub tone: Option<FieldValue>,
    pub clarity: Option<FieldValue>,
    pub legibility: Option<FieldValue>,
    pub score: Option<FieldValue>,
    pub improvements: Option<FieldValue>,
    /// Keys outside the known set, kept as sent.
    pub extra: Map<String, Value>,
}

impl AnalysisReport {
    pub const KNOWN_FIELDS: [&'static str; 11] = [
        "transcription",
        "format",
        "errors",
        "structure",
        "organization",
        "vocabulary",
        "tone",
        "clarity",
        "legibility",
        "score",
        "improvements",
    ];

    pub fn from_result(result: &ModelResult) -> Option<Self> {
        result.as_structured().map(Self::from_map)
    }

    pub fn from_map(map: &Map<String, Value>) -> Self {
        let mut report = AnalysisReport::default();
        for (key, value) in map {
            let slot = match key.as_str() {
                "transcription" => &mut report.transcription,
                "format" => &mut report.format,
                "errors" => &mut report.errors,
                "structure" => &mut report.structure,
                "organization" => &mut report.organization,
                "vocabulary" => &mut report.vocabulary,
                "tone" => &mut report.tone,
                "clarity" => &mut report.clarity,
                "legibility" => &mut report.legibility,
                "score" => &mut report.score,
                "improvements" => &mut report.improvements,
                _ => {
                    report.extra.insert(key.clone(), value.clone());
                    continue;
                }
            };
            *slot = FieldValue::from_json(value);
        }
        report
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        match name {
            "transcription" => self.transcription.as_ref(),
            "format" => self.format.as_ref(),
            "errors" => self.errors.as_ref(),
            "structure" => self.structure.as_ref(),
            "organization" => self.organization.as_ref(),
            "vocabulary" => self.vocabulary.as_ref(),
            "tone" => self.tone.as_ref(),
            "clarity" => self.clarity.as_ref(),
            "legibility" => self.legibility.as_ref(),
            "score" => self.score.as_ref(),
            "improvements" => self.improvements.as_ref(),
            _ => None,
        }
    }

    /// Numeric score out of 10, if the model sent something readable.
    pub fn numeric_score(&self) -> Option<f64> {
        let raw = match self.score.as_ref()? {
            FieldValue::Number(n) => return Some(*n),
            FieldValue::Text(s) => Value::String(s.clone()),
            _ => return None,
        };
        serde_json::from_value::<ScoreOnly>(serde_json::json!({ "score": raw }))
            .ok()
            .and_then(|s| s.score)
    }
}

/// Image bytes plus MIME type, ready to be inlined into a model request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    mime_type: String,
    bytes: Vec<u8>,
}

impl ImagePayload {
    pub const DEFAULT_MIME_TYPE: &'static str = "image/jpeg";

    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// MIME type sniffed from the leading bytes, `image/jpeg` when unknown.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let mime_type = sniff_mime_type(&bytes).unwrap_or(Self::DEFAULT_MIME_TYPE);
        Self::new(bytes, mime_type)
    }

    /// Decode a `data:<mime>;base64,<data>` URL as produced by a browser file reader.
    pub fn from_data_url(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| WritingCoachError::InvalidImage("missing data: prefix".to_string()))?;
        let (header, data) = rest
            .split_once(',')
            .ok_or_else(|| WritingCoachError::InvalidImage("missing ',' separator".to_string()))?;
        let header = header
            .strip_suffix(";base64")
            .ok_or_else(|| WritingCoachError::InvalidImage("data URL is not base64".to_string()))?;
        let bytes = BASE64
            .decode(data.trim())
            .map_err(|e| WritingCoachError::InvalidImage(format!("bad base64: {e}")))?;
        let mime_type = if header.is_empty() {
            Self::DEFAULT_MIME_TYPE
        } else {
            header
        };
        Ok(Self::new(bytes, mime_type))
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_part(&self) -> Part {
        Part::InlineData {
            inline_data: InlineData {
                mime_type: self.mime_type.clone(),
                data: BASE64.encode(&self.bytes),
            },
        }
    }
}

fn sniff_mime_type(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => Some("image/png"),
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [b'G', b'I', b'F', b'8', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        _ => None,
    }
}

// Gemini generateContent request format
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    /// Base64 of the raw bytes.
    pub data: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum HarmCategory {
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmBlockThreshold {
    BlockNone,
    BlockOnlyHigh,
    BlockMediumAndAbove,
    BlockLowAndAbove,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmBlockThreshold,
}

// Gemini generateContent response format
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, `None` if it carries none.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.is_empty() { None } else { Some(text) }
    }

    /// Why a response carried no text.
    pub fn diagnose(&self) -> String {
        let mut diag = Vec::new();
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            diag.push(format!("promptFeedback.blockReason={reason}"));
        }
        match self.candidates.first() {
            None => diag.push("candidates array is empty".to_string()),
            Some(c0) => {
                if let Some(reason) = c0.finish_reason.as_deref() {
                    diag.push(format!("finishReason={reason}"));
                }
                if c0.content.is_none() {
                    diag.push("candidate has no content".to_string());
                }
            }
        }
        if diag.is_empty() {
            "response contained no text parts".to_string()
        } else {
            diag.join(", ")
        }
    }
}
