//! Recognition collaborator
//!
//! Sends encoded page bytes to the external recognition service and parses
//! the response into a [`RecognitionOutcome`]: either a tag list or a
//! document-text structure. The processing pipeline dispatches on the
//! returned variant, so stub services and mixed deployments are handled the
//! same way as the configured mode.
//!
//! # Features
//!
//! - Tag responses: `{"predictions": [{"tagName"|"name", "probability"}]}`
//! - Text responses: `{"pages": [{"lines": [...], "words": [...]}]}`
//! - One synchronous request per page, no retries, bounded by a per-request
//!   timeout
//!
//! # Example
//!
//! ```rust,no_run
//! use journal_scan::recognize::{HttpRecognizer, RecognitionMode, Recognizer};
//! use std::time::Duration;
//!
//! let recognizer = HttpRecognizer::new(
//!     "https://example.invalid/predict",
//!     "secret-key",
//!     RecognitionMode::Tags,
//!     Duration::from_secs(30),
//! ).unwrap();
//! let outcome = recognizer.recognize(&[0xFF, 0xD8]).unwrap();
//! println!("{:?}", outcome);
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

// ============================================================
// Constants
// ============================================================

/// Header carrying the service subscription key
const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ============================================================
// Error Types
// ============================================================

/// Recognition error types
#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("Recognition service returned HTTP {code}")]
    Status { code: u16 },

    #[error("Recognition request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed recognition response: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RecognitionError>;

// ============================================================
// Result Types
// ============================================================

/// Which response shape the configured service speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecognitionMode {
    /// Image tagging: labels with probabilities
    #[default]
    Tags,
    /// Document text: lines, words, confidences, bounding polygons
    Text,
}

impl RecognitionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecognitionMode::Tags => "tags",
            RecognitionMode::Text => "text",
        }
    }
}

impl std::str::FromStr for RecognitionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tags" => Ok(RecognitionMode::Tags),
            "text" => Ok(RecognitionMode::Text),
            other => Err(format!("Unknown recognition mode: {}", other)),
        }
    }
}

impl std::fmt::Display for RecognitionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One predicted tag
#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    #[serde(alias = "tagName")]
    pub name: String,
    pub probability: f64,
}

/// Character range inside the page's full text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TextSpan {
    pub offset: usize,
    pub length: usize,
}

impl TextSpan {
    /// Exclusive end offset
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// One point of a word's bounding polygon
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PolygonPoint {
    pub x: f32,
    pub y: f32,
}

/// One recognized line
#[derive(Debug, Clone, Deserialize)]
pub struct TextLine {
    pub content: String,
    #[serde(default)]
    pub spans: Vec<TextSpan>,
}

/// One recognized word
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextWord {
    pub content: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub span: Option<TextSpan>,
    #[serde(default)]
    pub bounding_polygon: Vec<PolygonPoint>,
}

/// One page of a document-text response
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentPage {
    #[serde(default)]
    pub lines: Vec<TextLine>,
    #[serde(default)]
    pub words: Vec<TextWord>,
}

/// Full document-text response
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentText {
    #[serde(default)]
    pub pages: Vec<DocumentPage>,
}

impl DocumentText {
    /// Lines across all pages, in response order
    pub fn flattened_lines(&self) -> impl Iterator<Item = &TextLine> {
        self.pages.iter().flat_map(|page| page.lines.iter())
    }

    /// Words across all pages, in response order
    pub fn flattened_words(&self) -> impl Iterator<Item = &TextWord> {
        self.pages.iter().flat_map(|page| page.words.iter())
    }

    pub fn line_count(&self) -> usize {
        self.pages.iter().map(|page| page.lines.len()).sum()
    }

    pub fn word_count(&self) -> usize {
        self.pages.iter().map(|page| page.words.len()).sum()
    }
}

/// What the recognition service said about one page image
#[derive(Debug, Clone)]
pub enum RecognitionOutcome {
    Tags(Vec<Tag>),
    Document(DocumentText),
}

/// Order tags by descending probability
///
/// Relative order of equal probabilities is preserved but not contractual.
pub fn sort_tags_descending(tags: &mut [Tag]) {
    tags.sort_by(|a, b| b.probability.total_cmp(&a.probability));
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    predictions: Vec<Tag>,
}

// ============================================================
// Recognizer Trait
// ============================================================

/// External recognition collaborator
///
/// One call per page; a failure is terminal for that page only.
pub trait Recognizer {
    fn recognize(&self, image: &[u8]) -> Result<RecognitionOutcome>;
}

// ============================================================
// HTTP Implementation
// ============================================================

/// Blocking HTTP recognizer
///
/// Posts raw JPEG bytes to the configured endpoint with the subscription key
/// header. Every request carries the configured timeout, so one hung call can
/// stall the batch for at most that long.
pub struct HttpRecognizer {
    client: reqwest::blocking::Client,
    endpoint: String,
    key: String,
    mode: RecognitionMode,
}

impl HttpRecognizer {
    pub fn new(
        endpoint: impl Into<String>,
        key: impl Into<String>,
        mode: RecognitionMode,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            key: key.into(),
            mode,
        })
    }

    pub fn mode(&self) -> RecognitionMode {
        self.mode
    }
}

impl Recognizer for HttpRecognizer {
    fn recognize(&self, image: &[u8]) -> Result<RecognitionOutcome> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(SUBSCRIPTION_KEY_HEADER, &self.key)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image.to_vec())
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(RecognitionError::Status {
                code: status.as_u16(),
            });
        }

        let body = response.text()?;
        match self.mode {
            RecognitionMode::Tags => {
                let parsed: TagsResponse = serde_json::from_str(&body)?;
                Ok(RecognitionOutcome::Tags(parsed.predictions))
            }
            RecognitionMode::Text => {
                let parsed: DocumentText = serde_json::from_str(&body)?;
                Ok(RecognitionOutcome::Document(parsed))
            }
        }
    }
}

// ============================================================
// Tests
// ============================================================
