//! journal-scan - Batch recognition for scanned journal pages
//!
//! A batch processor that walks a directory or manifest of scanned journal
//! images, normalizes EXIF orientation, splits two-page spreads, and sends
//! each page to an external recognition service for tagging or text
//! extraction. Every line of output is multiplexed to the console, a shared
//! aggregator file, and a per-page log.
//!
//! # Features
//!
//! - **Orientation** ([`orient`]) - Undo EXIF orientation before processing
//! - **Splitting** ([`split`]) - Cut spreads into left/right pages around a gutter
//! - **Input discovery** ([`entries`]) - Directory scan or JSON manifest
//! - **Recognition** ([`recognize`]) - Tagging and document-text service clients
//! - **Collaborators** ([`assist`]) - Optional detection/translation/correction
//! - **Annotation** ([`annotate`]) - Tag labels and word outlines on saved pages
//! - **Sinks** ([`sink`]) - Tee-multiplexed console/file/memory output
//! - **Pipeline** ([`pipeline`]) - Per-page processing state machine
//! - **Batch** ([`batch`]) - Sequential driver with running aggregation
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use journal_scan::{Annotator, Assists, BatchDriver, ConsoleSink, HttpRecognizer,
//!     ProcessOptions, RecognitionMode};
//! use std::path::Path;
//! use std::time::Duration;
//!
//! let options = ProcessOptions::default().with_verbose(true);
//! let recognizer = HttpRecognizer::new(
//!     "https://example.invalid/analyze", "key",
//!     RecognitionMode::Text, Duration::from_secs(30),
//! ).unwrap();
//!
//! let assists = Assists::none();
//! let annotator = Annotator::new(50);
//!
//! let discovered = journal_scan::entries::discover(Path::new("images")).unwrap();
//! let driver = BatchDriver::new(&options, &recognizer, &assists, &annotator);
//! let summary = driver.run(&discovered, &mut ConsoleSink::new()).unwrap();
//! println!("{} page(s)", summary.pages_processed);
//! ```
//!
//! # Architecture
//!
//! ```text
//! Directory / Manifest -> Orientation -> Spread Split
//!                                            |
//!                            JPEG encode -> Recognition Service
//!                                            |
//!                    Tags: sort + label     Text: sentences -> detect ->
//!                                                 translate -> correct
//!                                            |
//!                      Console + aggregator.txt + <page>.out
//! ```
//!
//! # License
//!
//! AGPL-3.0

pub mod annotate;
pub mod assist;
pub mod batch;
pub mod cli;
pub mod config;
pub mod entries;
pub mod orient;
pub mod pipeline;
pub mod recognize;
pub mod sink;
pub mod split;
pub mod util;

// Re-exports for convenience
pub use annotate::{AnnotateError, Annotator, TagLabel, WordOutline};
pub use assist::{
    AssistError, Assists, Corrector, HttpCorrector, HttpLanguageDetector, HttpTranslator,
    LanguageDetector, Translator,
};
pub use batch::{BatchDriver, BatchError, BatchSummary, RunningAggregate};
pub use cli::{Cli, ExitCode};
pub use config::{CliOverrides, Config, ConfigError};
pub use entries::{Discovered, EntryError, ImageEntry};
pub use orient::{NormalizedImage, OrientError, OrientationNormalizer};
pub use pipeline::{PageProcessor, PageReport, ProcessError, ProcessOptions};
pub use recognize::{
    DocumentText, HttpRecognizer, RecognitionError, RecognitionMode, RecognitionOutcome,
    Recognizer, Tag, TextLine, TextWord,
};
pub use sink::{ConsoleSink, FileSink, LogSink, MemorySink, NullSink, SinkError, TeeSink};
pub use split::{GeometryError, Page, PageSide, PageSplitter};
pub use util::{ensure_dir_writable, format_duration, format_percent};

/// Exit codes for CLI (deprecated: prefer using `ExitCode` enum)
///
/// These constants are provided for backward compatibility.
/// The `ExitCode` enum provides a more type-safe alternative.
pub mod exit_codes {
    use super::ExitCode;

    pub const SUCCESS: i32 = ExitCode::Success as i32;
    pub const GENERAL_ERROR: i32 = ExitCode::GeneralError as i32;
    pub const INVALID_ARGS: i32 = ExitCode::InvalidArgs as i32;
    pub const INPUT_NOT_FOUND: i32 = ExitCode::InputNotFound as i32;
    pub const CONFIG_ERROR: i32 = ExitCode::ConfigError as i32;
    pub const OUTPUT_ERROR: i32 = ExitCode::OutputError as i32;
}
