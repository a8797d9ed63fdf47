//! Input enumeration
//!
//! Builds the batch's ordered entry list from either a directory of scans or
//! a JSON manifest. A directory contributes every top-level `.jpg`/`.jpeg`
//! (case-insensitive) as an implicitly split spread, sorted by file name. A
//! manifest (`.json`) is an ordered array of `{ "path", "split" }` records
//! whose relative paths resolve against the manifest's own directory.
//!
//! # Example
//!
//! ```rust,no_run
//! use journal_scan::entries;
//! use std::path::Path;
//!
//! let discovered = entries::discover(Path::new("images")).unwrap();
//! for entry in &discovered.entries {
//!     println!("{} (split: {})", entry.path.display(), entry.split);
//! }
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================
// Error Types
// ============================================================

/// Entry enumeration error types
#[derive(Debug, Error)]
pub enum EntryError {
    #[error("Input not found: {0}")]
    InputNotFound(PathBuf),

    #[error("Failed to read manifest {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse manifest {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EntryError>;

// ============================================================
// Entry Types
// ============================================================

/// One image to process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    /// Resolvable path to the image file
    pub path: PathBuf,
    /// Whether the image is a two-page spread to split
    pub split: bool,
}

/// Enumerated entries plus the directory that anchors the output folder
#[derive(Debug)]
pub struct Discovered {
    pub entries: Vec<ImageEntry>,
    /// Directory the `image_out` folder is created under
    pub root: PathBuf,
}

/// Manifest record; the original tooling emitted PascalCase keys
#[derive(Debug, Deserialize)]
struct ManifestRecord {
    #[serde(alias = "Path")]
    path: PathBuf,
    #[serde(alias = "Split")]
    split: bool,
}

// ============================================================
// Discovery
// ============================================================

/// Enumerate batch entries from a directory or manifest path
pub fn discover(input: &Path) -> Result<Discovered> {
    if input.is_dir() {
        scan_directory(input)
    } else if input.is_file() && is_manifest(input) {
        read_manifest(input)
    } else {
        Err(EntryError::InputNotFound(input.to_path_buf()))
    }
}

fn is_manifest(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"))
        .unwrap_or(false)
}

fn scan_directory(dir: &Path) -> Result<Discovered> {
    let mut paths = Vec::new();
    for dir_entry in std::fs::read_dir(dir)? {
        let path = dir_entry?.path();
        if path.is_file() && has_image_extension(&path) {
            paths.push(path);
        }
    }
    // Directory enumeration order is OS-defined; sort for a stable batch order
    paths.sort();

    let entries = paths
        .into_iter()
        .map(|path| ImageEntry { path, split: true })
        .collect();

    Ok(Discovered {
        entries,
        root: dir.to_path_buf(),
    })
}

fn read_manifest(manifest: &Path) -> Result<Discovered> {
    let text = std::fs::read_to_string(manifest).map_err(|source| EntryError::ManifestRead {
        path: manifest.to_path_buf(),
        source,
    })?;
    let records: Vec<ManifestRecord> =
        serde_json::from_str(&text).map_err(|source| EntryError::ManifestParse {
            path: manifest.to_path_buf(),
            source,
        })?;

    let root = manifest
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let entries = records
        .into_iter()
        .map(|record| ImageEntry {
            path: if record.path.is_relative() {
                root.join(record.path)
            } else {
                record.path
            },
            split: record.split,
        })
        .collect();

    Ok(Discovered { entries, root })
}

// ============================================================
// Tests
// ============================================================
