//! Optional text collaborators
//!
//! Language detection, translation, and OCR correction are each optional: an
//! unconfigured collaborator is simply absent and the pipeline skips its step.
//! A configured collaborator that errors degrades to pass-through for that
//! sentence, so a flaky translation endpoint can never block emission.
//!
//! # Features
//!
//! - **Language detection** ([`LanguageDetector`]) - `detect(text)` returning a
//!   language code, or `None` when the service cannot tell
//! - **Translation** ([`Translator`]) - `translate(text, target)` defaulting to
//!   English
//! - **Correction** ([`Corrector`]) - prompt-based OCR/translation cleanup
//! - [`Assists`] bundles the three as optional boxed traits
//!
//! # Example
//!
//! ```rust
//! use journal_scan::assist::Assists;
//!
//! let assists = Assists::none();
//! assert!(assists.detector.is_none());
//! assert!(assists.translator.is_none());
//! assert!(assists.corrector.is_none());
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

// ============================================================
// Constants
// ============================================================

/// Header carrying the service subscription key
const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Default translation target language
pub const DEFAULT_TARGET_LANG: &str = "en";

/// Language code sentences fall back to when detection is absent or silent
pub const FALLBACK_LANG: &str = "en";

// ============================================================
// Error Types
// ============================================================

/// Collaborator error types
///
/// These never propagate past the pipeline; every failure degrades to
/// pass-through for the sentence being processed.
#[derive(Debug, Error)]
pub enum AssistError {
    #[error("Collaborator returned HTTP {code}")]
    Status { code: u16 },

    #[error("Collaborator request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed collaborator response: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AssistError>;

// ============================================================
// Collaborator Traits
// ============================================================

/// Reports the language of a piece of text
pub trait LanguageDetector {
    /// Detected language code, or `None` when the service cannot tell
    fn detect(&self, text: &str) -> Result<Option<String>>;
}

/// Translates text into a target language
pub trait Translator {
    /// Translated text, or `None` when the service declines
    fn translate(&self, text: &str, target: &str) -> Result<Option<String>>;
}

/// Rewrites a sentence from a correction prompt
pub trait Corrector {
    fn correct(&self, prompt: &str) -> Result<String>;
}

/// The three optional collaborators, each absent when unconfigured
#[derive(Default)]
pub struct Assists {
    pub detector: Option<Box<dyn LanguageDetector>>,
    pub translator: Option<Box<dyn Translator>>,
    pub corrector: Option<Box<dyn Corrector>>,
}

impl Assists {
    /// No collaborators at all; every optional step is skipped
    pub fn none() -> Self {
        Self::default()
    }
}

/// The prompt sent to the correction collaborator for one sentence
pub fn correction_prompt(sentence: &str) -> String {
    format!(
        "Correct any OCR or translation mistakes in this sentence, changing nothing else: {}",
        sentence
    )
}

// ============================================================
// Wire Shapes
// ============================================================

#[derive(Debug, Serialize)]
struct DetectRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct DetectResponse {
    language: Option<String>,
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
    to: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct CorrectRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct CorrectResponse {
    text: String,
}

// ============================================================
// HTTP Implementations
// ============================================================

/// Shared plumbing for the three JSON collaborators
struct HttpAssist {
    client: reqwest::blocking::Client,
    endpoint: String,
    key: String,
}

impl HttpAssist {
    fn new(endpoint: impl Into<String>, key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            key: key.into(),
        })
    }

    fn post_json<B: Serialize>(&self, body: &B) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(SUBSCRIPTION_KEY_HEADER, &self.key)
            .json(body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssistError::Status {
                code: status.as_u16(),
            });
        }
        Ok(response.text()?)
    }
}

/// Blocking HTTP language detector
pub struct HttpLanguageDetector {
    inner: HttpAssist,
}

impl HttpLanguageDetector {
    pub fn new(
        endpoint: impl Into<String>,
        key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            inner: HttpAssist::new(endpoint, key, timeout)?,
        })
    }
}

impl LanguageDetector for HttpLanguageDetector {
    fn detect(&self, text: &str) -> Result<Option<String>> {
        let body = self.inner.post_json(&DetectRequest { text })?;
        let parsed: DetectResponse = serde_json::from_str(&body)?;
        Ok(parsed.language)
    }
}

/// Blocking HTTP translator
pub struct HttpTranslator {
    inner: HttpAssist,
}

impl HttpTranslator {
    pub fn new(
        endpoint: impl Into<String>,
        key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            inner: HttpAssist::new(endpoint, key, timeout)?,
        })
    }
}

impl Translator for HttpTranslator {
    fn translate(&self, text: &str, target: &str) -> Result<Option<String>> {
        let body = self.inner.post_json(&TranslateRequest { text, to: target })?;
        let parsed: TranslateResponse = serde_json::from_str(&body)?;
        Ok(parsed.text)
    }
}

/// Blocking HTTP corrector
pub struct HttpCorrector {
    inner: HttpAssist,
}

impl HttpCorrector {
    pub fn new(
        endpoint: impl Into<String>,
        key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            inner: HttpAssist::new(endpoint, key, timeout)?,
        })
    }
}

impl Corrector for HttpCorrector {
    fn correct(&self, prompt: &str) -> Result<String> {
        let body = self.inner.post_json(&CorrectRequest { prompt })?;
        let parsed: CorrectResponse = serde_json::from_str(&body)?;
        Ok(parsed.text)
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assists_none_is_all_absent() {
        let assists = Assists::none();
        assert!(assists.detector.is_none());
        assert!(assists.translator.is_none());
        assert!(assists.corrector.is_none());
    }

    #[test]
    fn test_correction_prompt_embeds_sentence() {
        let prompt = correction_prompt("Ths is a typo.");
        assert!(prompt.starts_with("Correct any OCR or translation mistakes"));
        assert!(prompt.ends_with("Ths is a typo."));
    }

    #[test]
    fn test_detect_response_accepts_null_language() {
        let parsed: DetectResponse = serde_json::from_str(r#"{"language":null}"#).unwrap();
        assert!(parsed.language.is_none());

        let parsed: DetectResponse = serde_json::from_str(r#"{"language":"de"}"#).unwrap();
        assert_eq!(parsed.language.as_deref(), Some("de"));
    }

    #[test]
    fn test_translate_response_accepts_null_text() {
        let parsed: TranslateResponse = serde_json::from_str(r#"{"text":null}"#).unwrap();
        assert!(parsed.text.is_none());
    }

    #[test]
    fn test_request_bodies_serialize_to_expected_keys() {
        let detect = serde_json::to_string(&DetectRequest { text: "hallo" }).unwrap();
        assert_eq!(detect, r#"{"text":"hallo"}"#);

        let translate = serde_json::to_string(&TranslateRequest {
            text: "hallo",
            to: "en",
        })
        .unwrap();
        assert_eq!(translate, r#"{"text":"hallo","to":"en"}"#);

        let correct = serde_json::to_string(&CorrectRequest { prompt: "fix" }).unwrap();
        assert_eq!(correct, r#"{"prompt":"fix"}"#);
    }

    #[test]
    fn test_unreachable_detector_is_an_http_error() {
        let detector = HttpLanguageDetector::new(
            "http://127.0.0.1:1/detect",
            "key",
            Duration::from_secs(1),
        )
        .unwrap();
        let result = detector.detect("some text");
        assert!(matches!(result, Err(AssistError::Http(_))));
    }

    #[test]
    fn test_error_display() {
        let err = AssistError::Status { code: 429 };
        assert!(err.to_string().contains("429"));
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AssistError>();
        assert_send_sync::<HttpLanguageDetector>();
        assert_send_sync::<HttpTranslator>();
        assert_send_sync::<HttpCorrector>();
    }
}
