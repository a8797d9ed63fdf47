//! Per-page processing
//!
//! Drives one page through encode -> recognize -> interpret -> annotate,
//! emitting a line to the supplied sink at every step. A failure anywhere
//! after the start is terminal for that page only; the driver logs it and
//! moves on, so the batch never stops for a single bad page.
//!
//! ## Processing Steps
//!
//! 1. JPEG-encode the page pixels at the configured quality
//! 2. One synchronous recognition call (no retry, bounded by timeout)
//! 3. Interpret: sort tags, or flatten lines/words and split sentences
//! 4. Optional translation/correction per sentence, degrading to pass-through
//! 5. Optional annotation output, gated on --save-images with --verbose
//!
//! Sentence splitting is a documented heuristic: text is cut after `.`, `!`,
//! or `?` with the terminator kept on the preceding sentence. Abbreviations
//! and decimal points are knowingly mis-split.

use image::codecs::jpeg::JpegEncoder;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::annotate::{Annotator, TagLabel, WordOutline};
use crate::assist::{correction_prompt, Assists, FALLBACK_LANG};
use crate::recognize::{
    sort_tags_descending, DocumentText, RecognitionError, RecognitionMode, RecognitionOutcome,
    Recognizer, TextLine, TextWord, DEFAULT_TIMEOUT_SECS,
};
use crate::sink::LogSink;
use crate::split::Page;
use crate::util::format_percent;

// ============================================================
// Error Types
// ============================================================

/// Per-page processing error types
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("JPEG encoding failed: {0}")]
    Encode(String),

    #[error("Recognition failed: {0}")]
    Recognition(#[from] RecognitionError),

    #[error("Output failed: {0}")]
    Sink(#[from] crate::sink::SinkError),
}

pub type Result<T> = std::result::Result<T, ProcessError>;

// ============================================================
// Options
// ============================================================

/// Processing options shared by the page processor and the batch driver
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Binder gutter width excluded from both split halves
    pub gutter_width: u32,
    /// JPEG quality for recognition requests and annotated output (1-100)
    pub jpeg_quality: u8,
    /// Which response shape the recognition service speaks
    pub mode: RecognitionMode,
    /// Write annotated page images (effective only with `verbose`)
    pub save_images: bool,
    /// Emit extra diagnostic lines
    pub verbose: bool,
    /// Run translated sentences through the correction collaborator
    pub correct_translations: bool,
    /// Per-request timeout shared by all collaborators
    pub timeout_secs: u64,
    /// Translation target language
    pub target_lang: String,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            gutter_width: crate::split::DEFAULT_GUTTER_WIDTH,
            jpeg_quality: crate::annotate::DEFAULT_JPEG_QUALITY,
            mode: RecognitionMode::Tags,
            save_images: false,
            verbose: false,
            correct_translations: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            target_lang: crate::assist::DEFAULT_TARGET_LANG.to_string(),
        }
    }
}

impl ProcessOptions {
    /// Builder pattern: set gutter width
    pub fn with_gutter_width(mut self, pixels: u32) -> Self {
        self.gutter_width = pixels;
        self
    }

    /// Builder pattern: set JPEG quality
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// Builder pattern: set recognition mode
    pub fn with_mode(mut self, mode: RecognitionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builder pattern: set annotated-image output
    pub fn with_save_images(mut self, enabled: bool) -> Self {
        self.save_images = enabled;
        self
    }

    /// Builder pattern: set verbose diagnostics
    pub fn with_verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    /// Builder pattern: set translation correction
    pub fn with_correct_translations(mut self, enabled: bool) -> Self {
        self.correct_translations = enabled;
        self
    }

    /// Builder pattern: set collaborator timeout
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

// ============================================================
// Result Types
// ============================================================

/// Aggregate contribution of one successfully processed page
///
/// Text pages report their word count and summed word confidence; tag pages
/// report zero units and count only through the driver's page counter.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageReport {
    pub units: usize,
    pub confidence_sum: f64,
}

// ============================================================
// Text Helpers
// ============================================================

/// Split line content into sentences after `.`, `!`, or `?`
///
/// The terminator stays with the preceding sentence; segments are trimmed and
/// empty ones dropped. This is the heuristic the rest of the pipeline is
/// built around, not a real tokenizer.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        current.push(ch);
        if matches!(ch, '.' | '!' | '?') {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_string());
            }
            current.clear();
        }
    }

    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    sentences
}

/// Average confidence of the words whose span falls inside the line's span
///
/// Returns 0.0 when the line has no span or no word lands inside it.
pub fn line_confidence(line: &TextLine, words: &[&TextWord]) -> f64 {
    let Some(line_span) = line.spans.first() else {
        return 0.0;
    };

    let mut sum = 0.0;
    let mut count = 0usize;
    for word in words {
        if let Some(span) = word.span {
            if span.offset >= line_span.offset && span.end() <= line_span.end() {
                sum += word.confidence;
                count += 1;
            }
        }
    }

    if count == 0 { 0.0 } else { sum / count as f64 }
}

// ============================================================
// Main Implementation
// ============================================================

/// Processes one page at a time against the configured collaborators
pub struct PageProcessor<'a> {
    options: &'a ProcessOptions,
    recognizer: &'a dyn Recognizer,
    assists: &'a Assists,
    annotator: &'a Annotator,
}

impl<'a> PageProcessor<'a> {
    pub fn new(
        options: &'a ProcessOptions,
        recognizer: &'a dyn Recognizer,
        assists: &'a Assists,
        annotator: &'a Annotator,
    ) -> Self {
        Self {
            options,
            recognizer,
            assists,
            annotator,
        }
    }

    /// Run one page through the full encode/recognize/interpret/annotate flow
    ///
    /// Every line of page output goes to `sink`; sidecar files and annotated
    /// images land in `out_dir`. Dispatch follows the returned outcome
    /// variant, not the configured mode.
    pub fn process(
        &self,
        page: &Page,
        page_name: &str,
        out_dir: &Path,
        sink: &mut dyn LogSink,
    ) -> Result<PageReport> {
        sink.write_line("[INFO] Encoding page to JPEG for prediction...")?;
        let encoded = self.encode_jpeg(page)?;
        sink.write_line(&format!(
            "[INFO] JPEG encoding complete. Size: {} bytes.",
            encoded.len()
        ))?;

        sink.write_line("[INFO] Sending image to recognition service...")?;
        let outcome = self.recognizer.recognize(&encoded)?;

        match outcome {
            RecognitionOutcome::Tags(tags) => self.interpret_tags(page, page_name, out_dir, tags, sink),
            RecognitionOutcome::Document(doc) => {
                self.interpret_document(page, page_name, out_dir, &doc, sink)
            }
        }
    }

    fn encode_jpeg(&self, page: &Page) -> Result<Vec<u8>> {
        let rgb = page.image.to_rgb8();
        let mut bytes = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut bytes);
        JpegEncoder::new_with_quality(&mut cursor, self.options.jpeg_quality)
            .encode_image(&rgb)
            .map_err(|e| ProcessError::Encode(e.to_string()))?;
        Ok(bytes)
    }

    fn interpret_tags(
        &self,
        page: &Page,
        page_name: &str,
        out_dir: &Path,
        mut tags: Vec<crate::recognize::Tag>,
        sink: &mut dyn LogSink,
    ) -> Result<PageReport> {
        sort_tags_descending(&mut tags);

        sink.write_line(&format!(
            "[INFO] Recognition complete. {} tag(s) returned.",
            tags.len()
        ))?;
        sink.write_line("Predicted tags:")?;
        for tag in &tags {
            sink.write_line(&format!("  {}: {}", tag.name, format_percent(tag.probability)))?;
        }

        let labels: Vec<TagLabel> = tags
            .into_iter()
            .map(|tag| TagLabel {
                name: tag.name,
                probability: tag.probability,
            })
            .collect();
        let output = out_dir.join(format!("{}_tags.jpg", page_name));
        self.maybe_annotate(sink, &output, || {
            self.annotator.save_tag_labels(&page.image, &labels, &output)
        })?;

        Ok(PageReport::default())
    }

    fn interpret_document(
        &self,
        page: &Page,
        page_name: &str,
        out_dir: &Path,
        doc: &DocumentText,
        sink: &mut dyn LogSink,
    ) -> Result<PageReport> {
        let words: Vec<&TextWord> = doc.flattened_words().collect();

        sink.write_line(&format!(
            "[INFO] Recognition complete. {} line(s), {} word(s) returned.",
            doc.line_count(),
            doc.word_count()
        ))?;
        sink.write_line("Recognized sentences:")?;

        let mut by_language: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for line in doc.flattened_lines() {
            let confidence = line_confidence(line, &words);
            for sentence in split_sentences(&line.content) {
                let language = self.detect_language(&sentence, sink)?;
                let translated = if language != FALLBACK_LANG {
                    self.translate(&sentence, sink)?
                } else {
                    None
                };
                let translated = match translated {
                    Some(text) => Some(self.maybe_correct(text, sink)?),
                    None => None,
                };

                sink.write_line(&format!("  [{}|{:.2}] {}", language, confidence, sentence))?;
                if let Some(text) = &translated {
                    sink.write_line(&format!("    -> {}", text))?;
                }
                by_language.entry(language).or_default().push(sentence);
            }
        }

        self.write_sidecars(page_name, out_dir, &by_language, sink)?;

        let outlines: Vec<WordOutline> = words
            .iter()
            .filter(|word| word.bounding_polygon.len() >= 2)
            .map(|word| WordOutline {
                points: word.bounding_polygon.iter().map(|p| (p.x, p.y)).collect(),
            })
            .collect();
        let output = out_dir.join(format!("{}_words.jpg", page_name));
        self.maybe_annotate(sink, &output, || {
            self.annotator.save_word_outlines(&page.image, &outlines, &output)
        })?;

        Ok(PageReport {
            units: doc.word_count(),
            confidence_sum: words.iter().map(|w| w.confidence).sum(),
        })
    }

    /// Detected language of a sentence, falling back to English
    ///
    /// Absent detector, a `null` answer, and a failed call all read as the
    /// fallback; the failure is only surfaced as a verbose notice.
    fn detect_language(&self, sentence: &str, sink: &mut dyn LogSink) -> Result<String> {
        let Some(detector) = &self.assists.detector else {
            return Ok(FALLBACK_LANG.to_string());
        };

        match detector.detect(sentence) {
            Ok(Some(code)) => Ok(code),
            Ok(None) => Ok(FALLBACK_LANG.to_string()),
            Err(e) => {
                if self.options.verbose {
                    sink.write_line(&format!(
                        "[INFO] Language detection failed ({}); assuming {}.",
                        e, FALLBACK_LANG
                    ))?;
                }
                Ok(FALLBACK_LANG.to_string())
            }
        }
    }

    fn translate(&self, sentence: &str, sink: &mut dyn LogSink) -> Result<Option<String>> {
        let Some(translator) = &self.assists.translator else {
            return Ok(None);
        };

        match translator.translate(sentence, &self.options.target_lang) {
            Ok(result) => Ok(result),
            Err(e) => {
                if self.options.verbose {
                    sink.write_line(&format!(
                        "[INFO] Translation failed ({}); keeping original sentence.",
                        e
                    ))?;
                }
                Ok(None)
            }
        }
    }

    /// Correction applies to translated sentences only, and never blocks them
    fn maybe_correct(&self, translated: String, sink: &mut dyn LogSink) -> Result<String> {
        if !self.options.correct_translations {
            return Ok(translated);
        }
        let Some(corrector) = &self.assists.corrector else {
            return Ok(translated);
        };

        match corrector.correct(&correction_prompt(&translated)) {
            Ok(corrected) => Ok(corrected),
            Err(e) => {
                if self.options.verbose {
                    sink.write_line(&format!(
                        "[INFO] Correction failed ({}); keeping translation as-is.",
                        e
                    ))?;
                }
                Ok(translated)
            }
        }
    }

    /// One sentence file per detected language, original text only
    fn write_sidecars(
        &self,
        page_name: &str,
        out_dir: &Path,
        by_language: &BTreeMap<String, Vec<String>>,
        sink: &mut dyn LogSink,
    ) -> Result<()> {
        for (language, sentences) in by_language {
            let path = out_dir.join(format!("{}_{}.txt", page_name, language));
            let mut contents = sentences.join("\n");
            contents.push('\n');
            if let Err(e) = std::fs::write(&path, contents) {
                sink.write_line(&format!("[ERROR] Failed to write {}: {}", path.display(), e))?;
            }
        }
        Ok(())
    }

    /// Annotation gate: requires both --save-images and --verbose
    ///
    /// IO failures are logged and swallowed; the page still counts as
    /// processed.
    fn maybe_annotate<F>(&self, sink: &mut dyn LogSink, output: &Path, render: F) -> Result<()>
    where
        F: FnOnce() -> crate::annotate::Result<()>,
    {
        if !self.options.save_images {
            return Ok(());
        }
        if !self.options.verbose {
            sink.write_line("[INFO] Skipping annotation (requires --verbose).")?;
            return Ok(());
        }

        sink.write_line(&format!(
            "[INFO] Annotating and saving image to: {}",
            output.display()
        ))?;
        match render() {
            Ok(()) => sink.write_line("[INFO] Annotated image saved.")?,
            Err(e) => sink.write_line(&format!("[ERROR] Annotation failed: {}", e))?,
        }
        Ok(())
    }
}

// ============================================================
// Tests
// ============================================================
