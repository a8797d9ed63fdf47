//! Page annotation
//!
//! Draws recognition results onto a copy of a page image and writes the copy
//! as a JPEG. The source buffer is never touched.
//!
//! # Features
//!
//! - **Tag labels** - stacked text lines in a fixed left column, one per tag,
//!   `"<name>: <percent>"` with two decimals
//! - **Word outlines** - closed polygons connecting each word's bounding
//!   points and returning to the first point
//! - Output quality is configurable (default 50); parent directories are
//!   created as needed
//! - Text rendering needs a loaded font; without one the outlines still draw
//!   and label calls fall back to writing the plain copy
//!
//! # Example
//!
//! ```rust,no_run
//! use journal_scan::annotate::{Annotator, TagLabel};
//! use std::path::Path;
//!
//! let annotator = Annotator::new(50);
//! let page = image::open("page_L.jpg").unwrap();
//! let labels = vec![TagLabel { name: "handwriting".into(), probability: 0.97 }];
//! annotator.save_tag_labels(&page, &labels, Path::new("out/page_L_tags.jpg")).unwrap();
//! ```

use ab_glyph::{FontVec, PxScale};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgb};
use imageproc::drawing::{draw_line_segment_mut, draw_text_mut};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::util::format_percent;

// ============================================================
// Constants
// ============================================================

/// Default JPEG quality for annotated output
pub const DEFAULT_JPEG_QUALITY: u8 = 50;

/// Fixed left margin for stacked tag labels
const LABEL_LEFT_MARGIN: i32 = 10;

/// Vertical position of the first label line
const LABEL_TOP_OFFSET: i32 = 30;

/// Vertical distance between label lines
const LABEL_LINE_PITCH: i32 = 30;

/// Label font size in pixels
const LABEL_SCALE: f32 = 24.0;

const LABEL_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const OUTLINE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

// ============================================================
// Error Types
// ============================================================

/// Annotation error types
#[derive(Debug, Error)]
pub enum AnnotateError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {message}")]
    Write { path: PathBuf, message: String },

    #[error("Failed to load font {path}: {message}")]
    Font { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnnotateError>;

// ============================================================
// Input Types
// ============================================================

/// One text label to stack on the page
#[derive(Debug, Clone)]
pub struct TagLabel {
    pub name: String,
    pub probability: f64,
}

impl TagLabel {
    /// The rendered label text, `"<name>: <percent to two decimals>"`
    pub fn render(&self) -> String {
        format!("{}: {}", self.name, format_percent(self.probability))
    }
}

/// One closed outline around a recognized word
#[derive(Debug, Clone)]
pub struct WordOutline {
    pub points: Vec<(f32, f32)>,
}

// ============================================================
// Main Implementation
// ============================================================

/// Renders annotation overlays and writes compressed copies
pub struct Annotator {
    font: Option<FontVec>,
    quality: u8,
}

impl Annotator {
    /// Create an annotator writing JPEGs at the given quality (clamped to 1-100)
    pub fn new(quality: u8) -> Self {
        Self {
            font: None,
            quality: quality.clamp(1, 100),
        }
    }

    /// Attach a font for label rendering
    #[must_use]
    pub fn with_font(mut self, font: FontVec) -> Self {
        self.font = Some(font);
        self
    }

    /// Whether label text can be rendered
    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Load a TrueType/OpenType font from a file
    pub fn load_font(path: &Path) -> Result<FontVec> {
        let data = std::fs::read(path).map_err(|e| AnnotateError::Font {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        FontVec::try_from_vec(data).map_err(|e| AnnotateError::Font {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Write a copy of `image` with tag labels stacked down the left margin
    ///
    /// Labels render in slice order, top to bottom. Without a font the copy
    /// is written without text.
    pub fn save_tag_labels(
        &self,
        image: &DynamicImage,
        labels: &[TagLabel],
        output: &Path,
    ) -> Result<()> {
        let mut canvas = image.to_rgb8();

        if let Some(ref font) = self.font {
            for (index, label) in labels.iter().enumerate() {
                let y = LABEL_TOP_OFFSET + index as i32 * LABEL_LINE_PITCH;
                draw_text_mut(
                    &mut canvas,
                    LABEL_COLOR,
                    LABEL_LEFT_MARGIN,
                    y,
                    PxScale::from(LABEL_SCALE),
                    font,
                    &label.render(),
                );
            }
        }

        self.write_jpeg(&canvas, output)
    }

    /// Write a copy of `image` with a closed outline per recognized word
    pub fn save_word_outlines(
        &self,
        image: &DynamicImage,
        outlines: &[WordOutline],
        output: &Path,
    ) -> Result<()> {
        let mut canvas = image.to_rgb8();

        for outline in outlines {
            let points = &outline.points;
            if points.len() < 2 {
                continue;
            }
            for pair in points.windows(2) {
                draw_line_segment_mut(&mut canvas, pair[0], pair[1], OUTLINE_COLOR);
            }
            // Close back to the first point
            if let (Some(&last), Some(&first)) = (points.last(), points.first()) {
                draw_line_segment_mut(&mut canvas, last, first, OUTLINE_COLOR);
            }
        }

        self.write_jpeg(&canvas, output)
    }

    fn write_jpeg(&self, canvas: &image::RgbImage, output: &Path) -> Result<()> {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| AnnotateError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let file = std::fs::File::create(output).map_err(|e| AnnotateError::Write {
            path: output.to_path_buf(),
            message: e.to_string(),
        })?;
        let mut writer = std::io::BufWriter::new(file);
        JpegEncoder::new_with_quality(&mut writer, self.quality)
            .encode_image(canvas)
            .map_err(|e| AnnotateError::Write {
                path: output.to_path_buf(),
                message: e.to_string(),
            })?;
        writer.flush()?;
        Ok(())
    }
}

// ============================================================
// Tests
// ============================================================
