//! Spread splitting
//!
//! Turns a normalized spread into one full page or a left/right pair around a
//! binder gutter. Half width truncates, so when `width - gutter` is odd the
//! right page is one column wider; the gutter columns belong to neither page.
//!
//! # Example
//!
//! ```rust
//! use image::DynamicImage;
//! use journal_scan::split::{PageSide, PageSplitter};
//!
//! let spread = DynamicImage::new_rgb8(101, 50);
//! let pages = PageSplitter::split(spread, true, 0).unwrap();
//! assert_eq!(pages[0].side, PageSide::Left);
//! assert_eq!(pages[0].image.width(), 50);
//! assert_eq!(pages[1].image.width(), 51);
//! ```

use image::DynamicImage;
use thiserror::Error;

// ============================================================
// Constants
// ============================================================

/// Default binder gutter width in pixels
pub const DEFAULT_GUTTER_WIDTH: u32 = 0;

// ============================================================
// Error Types
// ============================================================

/// Split geometry error types
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("Spread width {width}px cannot be split around a {gutter}px gutter")]
    TooNarrow { width: u32, gutter: u32 },
}

pub type Result<T> = std::result::Result<T, GeometryError>;

// ============================================================
// Page Types
// ============================================================

/// Which part of a spread a page came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSide {
    /// Whole unsplit spread
    Full,
    /// Left half of a split spread
    Left,
    /// Right half of a split spread
    Right,
}

impl PageSide {
    /// File-name suffix for this side
    pub fn suffix(&self) -> &'static str {
        match self {
            PageSide::Full => "",
            PageSide::Left => "_L",
            PageSide::Right => "_R",
        }
    }
}

/// One logical page cut from a spread
///
/// The image is always independently owned; split pages never alias the
/// source spread's buffer.
#[derive(Debug)]
pub struct Page {
    pub image: DynamicImage,
    pub side: PageSide,
}

impl Page {
    /// File-name suffix for this page (`""`, `"_L"`, or `"_R"`)
    pub fn suffix(&self) -> &'static str {
        self.side.suffix()
    }
}

// ============================================================
// Main Implementation
// ============================================================

/// Cuts spreads into pages
pub struct PageSplitter;

impl PageSplitter {
    /// Produce the ordered pages of a spread
    ///
    /// With `split` false the spread moves through as a single [`PageSide::Full`]
    /// page. With `split` true, `half = (width - gutter) / 2`; the left page is
    /// columns `[0, half)` and the right page is columns `[half + gutter, width)`,
    /// always in left-then-right order.
    pub fn split(image: DynamicImage, split: bool, gutter: u32) -> Result<Vec<Page>> {
        if !split {
            return Ok(vec![Page {
                image,
                side: PageSide::Full,
            }]);
        }

        let width = image.width();
        let height = image.height();
        if gutter >= width {
            return Err(GeometryError::TooNarrow { width, gutter });
        }

        let half = (width - gutter) / 2;
        let right_start = half + gutter;
        if half == 0 || right_start >= width {
            return Err(GeometryError::TooNarrow { width, gutter });
        }

        let left = image.crop_imm(0, 0, half, height);
        let right = image.crop_imm(right_start, 0, width - right_start, height);

        Ok(vec![
            Page {
                image: left,
                side: PageSide::Left,
            },
            Page {
                image: right,
                side: PageSide::Right,
            },
        ])
    }
}

// ============================================================
// Tests
// ============================================================
