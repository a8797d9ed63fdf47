//! Orientation normalization
//!
//! Decodes a scanned page file and undoes any EXIF orientation so every
//! downstream consumer sees top-left-origin pixel data.
//!
//! # Features
//!
//! - All 8 standard EXIF orientations (identity, flips, 90/180/270 rotations,
//!   transpose/transverse combinations)
//! - Identity orientation is a pass-through with no reallocation
//! - Missing or unreadable EXIF data is treated as identity
//!
//! # Example
//!
//! ```rust,no_run
//! use journal_scan::orient::OrientationNormalizer;
//! use std::path::Path;
//!
//! let page = OrientationNormalizer::load(Path::new("scan_0001.jpg")).unwrap();
//! println!("{}x{} ({})", page.image.width(), page.image.height(),
//!     OrientationNormalizer::describe(page.orientation));
//! ```

use image::DynamicImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================
// Constants
// ============================================================

/// EXIF orientation value meaning "already top-left"
pub const IDENTITY_ORIENTATION: u32 = 1;

// ============================================================
// Error Types
// ============================================================

/// Orientation normalization error types
#[derive(Debug, Error)]
pub enum OrientError {
    #[error("Image not found: {0}")]
    ImageNotFound(PathBuf),

    #[error("Failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OrientError>;

// ============================================================
// Result Types
// ============================================================

/// A decoded image guaranteed to be top-left oriented
#[derive(Debug)]
pub struct NormalizedImage {
    /// Pixel data with any stored orientation already undone
    pub image: DynamicImage,
    /// Orientation tag found in the file (1 when absent or unreadable)
    pub orientation: u32,
}

// ============================================================
// Main Implementation
// ============================================================

/// Decodes files and undoes embedded orientation
pub struct OrientationNormalizer;

impl OrientationNormalizer {
    /// Load a file and return its top-left-normalized pixels
    pub fn load(path: &Path) -> Result<NormalizedImage> {
        if !path.exists() {
            return Err(OrientError::ImageNotFound(path.to_path_buf()));
        }

        let bytes = std::fs::read(path)?;
        let orientation = Self::read_orientation(&bytes);
        let decoded = image::load_from_memory(&bytes).map_err(|e| OrientError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok(NormalizedImage {
            image: Self::undo_orientation(decoded, orientation),
            orientation,
        })
    }

    /// Read the EXIF orientation tag from encoded image bytes
    ///
    /// Absent, malformed, or out-of-range metadata all read as identity.
    pub fn read_orientation(bytes: &[u8]) -> u32 {
        let mut cursor = std::io::Cursor::new(bytes);
        exif::Reader::new()
            .read_from_container(&mut cursor)
            .ok()
            .and_then(|data| {
                data.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
                    .and_then(|field| field.value.get_uint(0))
            })
            .unwrap_or(IDENTITY_ORIENTATION)
    }

    /// Apply the transform that undoes a stored EXIF orientation
    ///
    /// Identity (and any unknown value) moves the buffer through untouched.
    pub fn undo_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
        match orientation {
            2 => img.fliph(),
            3 => img.rotate180(),
            4 => img.flipv(),
            5 => img.rotate90().fliph(),
            6 => img.rotate90(),
            7 => img.rotate270().fliph(),
            8 => img.rotate270(),
            _ => img,
        }
    }

    /// Human-readable description of an orientation tag
    pub fn describe(orientation: u32) -> &'static str {
        match orientation {
            1 => "top-left (identity)",
            2 => "mirrored horizontally",
            3 => "rotated 180",
            4 => "mirrored vertically",
            5 => "transposed (mirrored + rotated 90 CW)",
            6 => "rotated 90 CW",
            7 => "transversed (mirrored + rotated 90 CCW)",
            8 => "rotated 90 CCW",
            _ => "unknown",
        }
    }
}

// ============================================================
// Tests
// ============================================================
