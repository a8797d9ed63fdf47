//! Batch driving and aggregation
//!
//! Walks the entry list strictly in order: one entry, one page, one
//! recognition call at a time. Each page's output fans out through a 3-way
//! tee (console, shared aggregator file, per-page log); the tee for a page
//! is dropped when the page ends, so a failing page can never leave later
//! output pointing at its closed log. Entry-level failures (undecodable
//! image, impossible split geometry) skip the entry; page-level failures
//! count the page as failed and the batch continues.
//!
//! # Example
//!
//! ```rust,no_run
//! use journal_scan::assist::Assists;
//! use journal_scan::annotate::Annotator;
//! use journal_scan::batch::BatchDriver;
//! use journal_scan::pipeline::ProcessOptions;
//! use journal_scan::recognize::{HttpRecognizer, RecognitionMode};
//! use journal_scan::sink::ConsoleSink;
//! use std::path::Path;
//! use std::time::Duration;
//!
//! let options = ProcessOptions::default();
//! let recognizer = HttpRecognizer::new(
//!     "https://example.invalid/predict", "key",
//!     RecognitionMode::Tags, Duration::from_secs(30),
//! ).unwrap();
//! let assists = Assists::none();
//! let annotator = Annotator::new(50);
//!
//! let discovered = journal_scan::entries::discover(Path::new("images")).unwrap();
//! let driver = BatchDriver::new(&options, &recognizer, &assists, &annotator);
//! let summary = driver.run(&discovered, &mut ConsoleSink::new()).unwrap();
//! println!("{} page(s), {} failed", summary.pages_processed, summary.pages_failed);
//! ```

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::annotate::Annotator;
use crate::assist::Assists;
use crate::entries::Discovered;
use crate::orient::OrientationNormalizer;
use crate::pipeline::{PageProcessor, ProcessOptions};
use crate::recognize::{RecognitionMode, Recognizer};
use crate::sink::{FileSink, LogSink, NullSink, TeeSink};
use crate::split::PageSplitter;
use crate::util::{ensure_dir_writable, format_duration};

// ============================================================
// Constants
// ============================================================

/// Output directory name under the input root
pub const OUTPUT_DIR_NAME: &str = "image_out";

/// Shared aggregator file name, truncated at batch start
pub const AGGREGATOR_FILE_NAME: &str = "aggregator.txt";

// ============================================================
// Error Types
// ============================================================

/// Batch-level error types
///
/// Only failures of the shared output machinery abort a batch; anything
/// scoped to a single entry or page is logged and skipped instead.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Output directory not writable: {path}: {message}")]
    OutputDir { path: PathBuf, message: String },

    #[error("Output failed: {0}")]
    Sink(#[from] crate::sink::SinkError),
}

pub type Result<T> = std::result::Result<T, BatchError>;

// ============================================================
// Aggregate Types
// ============================================================

/// Running totals across the whole batch
///
/// Mutated exactly once per processed page, in processing order.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningAggregate {
    /// Recognized units (words in text mode)
    pub total_units: usize,
    /// Summed per-unit confidence
    pub confidence_sum: f64,
    /// Pages that completed successfully
    pub page_count: usize,
    /// Pages that failed mid-processing
    pub failed_count: usize,
}

impl RunningAggregate {
    /// Mean confidence over all units, 0 when there are none
    pub fn average_confidence(&self) -> f64 {
        if self.total_units == 0 {
            0.0
        } else {
            self.confidence_sum / self.total_units as f64
        }
    }
}

/// What a completed batch run looked like
#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub pages_processed: usize,
    pub pages_failed: usize,
    pub total_units: usize,
    pub average_confidence: f64,
    pub elapsed: Duration,
}

// ============================================================
// Main Implementation
// ============================================================

/// Sequential batch driver
pub struct BatchDriver<'a> {
    options: &'a ProcessOptions,
    recognizer: &'a dyn Recognizer,
    assists: &'a Assists,
    annotator: &'a Annotator,
}

impl<'a> BatchDriver<'a> {
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

    /// Process every entry, accumulating into one aggregate and one
    /// aggregator file
    ///
    /// `console` receives every line the aggregator and per-page logs do,
    /// plus the final summary.
    pub fn run(&self, discovered: &Discovered, console: &mut dyn LogSink) -> Result<BatchSummary> {
        let start = Instant::now();

        if discovered.entries.is_empty() {
            console.write_line("No images to process; exiting.")?;
            return Ok(BatchSummary {
                pages_processed: 0,
                pages_failed: 0,
                total_units: 0,
                average_confidence: 0.0,
                elapsed: start.elapsed(),
            });
        }

        let out_dir = discovered.root.join(OUTPUT_DIR_NAME);
        ensure_dir_writable(&out_dir).map_err(|message| BatchError::OutputDir {
            path: out_dir.clone(),
            message,
        })?;

        let mut aggregator =
            FileSink::create(out_dir.join(AGGREGATOR_FILE_NAME))?.auto_flush(true);
        let mut aggregate = RunningAggregate::default();
        let processor =
            PageProcessor::new(self.options, self.recognizer, self.assists, self.annotator);

        for entry in &discovered.entries {
            let mut base = TeeSink::new(console, &mut aggregator);

            let loaded = match OrientationNormalizer::load(&entry.path) {
                Ok(loaded) => loaded,
                Err(e) => {
                    base.write_line(&format!(
                        "[ERROR] Skipping {}: {}",
                        entry.path.display(),
                        e
                    ))?;
                    continue;
                }
            };
            if self.options.verbose {
                base.write_line(&format!(
                    "[INFO] Orientation: {}",
                    OrientationNormalizer::describe(loaded.orientation)
                ))?;
            }

            let pages =
                match PageSplitter::split(loaded.image, entry.split, self.options.gutter_width) {
                    Ok(pages) => pages,
                    Err(e) => {
                        base.write_line(&format!(
                            "[ERROR] Skipping {}: {}",
                            entry.path.display(),
                            e
                        ))?;
                        continue;
                    }
                };
            if self.options.verbose && pages.len() == 2 {
                base.write_line(&format!(
                    "[INFO] Split spread into {}x{} and {}x{} (gutter {}).",
                    pages[0].image.width(),
                    pages[0].image.height(),
                    pages[1].image.width(),
                    pages[1].image.height(),
                    self.options.gutter_width
                ))?;
            }
            drop(base);

            let stem = entry
                .path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "page".to_string());

            for page in &pages {
                let page_name = format!("{}{}", stem, page.suffix());
                self.process_page(
                    &processor,
                    page,
                    &page_name,
                    &out_dir,
                    console,
                    &mut aggregator,
                    &mut aggregate,
                )?;
            }
        }

        let elapsed = start.elapsed();
        let summary = BatchSummary {
            pages_processed: aggregate.page_count,
            pages_failed: aggregate.failed_count,
            total_units: aggregate.total_units,
            average_confidence: aggregate.average_confidence(),
            elapsed,
        };
        self.write_summary(&summary, console, &mut aggregator)?;
        aggregator.flush()?;

        Ok(summary)
    }

    /// One page: open its log, tee three ways, process, always close out
    #[allow(clippy::too_many_arguments)]
    fn process_page(
        &self,
        processor: &PageProcessor<'_>,
        page: &crate::split::Page,
        page_name: &str,
        out_dir: &Path,
        console: &mut dyn LogSink,
        aggregator: &mut FileSink,
        aggregate: &mut RunningAggregate,
    ) -> Result<()> {
        let page_start = Instant::now();
        let log_path = out_dir.join(format!("{}.out", page_name));

        // The page log failing to open is non-fatal: the page still runs
        // against console + aggregator.
        let mut page_log: Box<dyn LogSink> = match FileSink::create(&log_path) {
            Ok(sink) => Box::new(sink),
            Err(e) => {
                let mut base = TeeSink::new(console, aggregator);
                base.write_line(&format!("[ERROR] Failed to open {}: {}", log_path.display(), e))?;
                Box::new(NullSink::new())
            }
        };

        let outcome = {
            let mut base = TeeSink::new(console, aggregator);
            let mut tee = TeeSink::new(&mut base, page_log.as_mut());

            tee.write_line(&format!("---------- {} ----------", page_name))?;
            let outcome = processor.process(page, page_name, out_dir, &mut tee);

            match &outcome {
                Ok(_) => {}
                Err(e) => {
                    tee.write_line(&format!("[ERROR] Failed to process {}: {}", page_name, e))?;
                }
            }
            tee.write_line(&format!(
                "[INFO] Done in {}",
                format_duration(page_start.elapsed())
            ))?;
            tee.write_line("")?;
            tee.flush()?;
            outcome
        };

        match outcome {
            Ok(report) => {
                aggregate.page_count += 1;
                aggregate.total_units += report.units;
                aggregate.confidence_sum += report.confidence_sum;
            }
            Err(_) => {
                aggregate.failed_count += 1;
            }
        }
        Ok(())
    }

    fn write_summary(
        &self,
        summary: &BatchSummary,
        console: &mut dyn LogSink,
        aggregator: &mut FileSink,
    ) -> Result<()> {
        let mut tee = TeeSink::new(console, aggregator);
        tee.write_line(&format!(
            "Processed {} page(s) in {}.",
            summary.pages_processed,
            format_duration(summary.elapsed)
        ))?;
        if summary.pages_failed > 0 {
            tee.write_line(&format!("{} page(s) failed.", summary.pages_failed))?;
        }
        if self.options.mode == RecognitionMode::Text {
            tee.write_line(&format!(
                "Average confidence: {:.2}",
                summary.average_confidence
            ))?;
        }
        Ok(())
    }
}

// ============================================================
// Tests
// ============================================================
