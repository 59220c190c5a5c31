//! Output directory layout and the resume watermark.
//!
//! ```text
//! raw/                  # untouched downloads, keyed by manifest name
//! │   └── 1f600.png
//! emoji/                # numbered training pairs
//!     ├── img1.png
//!     └── img1.txt
//! ```
//!
//! The processed directory doubles as the run's progress record: the highest
//! `img<N>.png` on disk is the last index written, so the next run starts at
//! `N + 1` and skips the first `N` manifest entries. Only images are
//! inspected; labels missing next to an existing image are reported by
//! [`OutputLayout::orphaned_labels`].

use crate::naming::{self, InvalidIndex};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default directory for untouched downloads.
pub const DEFAULT_RAW_DIR: &str = "raw";
/// Default directory for numbered image/label pairs.
pub const DEFAULT_EMOJI_DIR: &str = "emoji";

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    InvalidIndex(#[from] InvalidIndex),
    #[error("img{highest}.png leaves no index for the next image")]
    IndexExhausted { highest: u32 },
}

impl LayoutError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// The two output directories of a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub raw_dir: PathBuf,
    pub emoji_dir: PathBuf,
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self::new(DEFAULT_RAW_DIR, DEFAULT_EMOJI_DIR)
    }
}

impl OutputLayout {
    pub fn new(raw_dir: impl Into<PathBuf>, emoji_dir: impl Into<PathBuf>) -> Self {
        Self {
            raw_dir: raw_dir.into(),
            emoji_dir: emoji_dir.into(),
        }
    }

    /// Both directories under a common root (`<root>/raw`, `<root>/emoji`).
    pub fn under(root: &Path) -> Self {
        Self::new(root.join(DEFAULT_RAW_DIR), root.join(DEFAULT_EMOJI_DIR))
    }

    /// Create both directories if they do not exist yet.
    pub fn ensure_directories(&self) -> Result<(), LayoutError> {
        for dir in [&self.raw_dir, &self.emoji_dir] {
            fs::create_dir_all(dir).map_err(|e| LayoutError::io(dir, e))?;
        }
        Ok(())
    }

    /// Indices of every `img<N>.png` in the processed directory.
    ///
    /// A missing processed directory counts as empty. Any `img*.png` whose
    /// middle is not a number aborts the scan.
    pub fn scan_images(&self) -> Result<BTreeSet<u32>, LayoutError> {
        let entries = match fs::read_dir(&self.emoji_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(e) => return Err(LayoutError::io(&self.emoji_dir, e)),
        };

        let mut images = BTreeSet::new();
        for entry in entries {
            let entry = entry.map_err(|e| LayoutError::io(&self.emoji_dir, e))?;
            let file_name = entry.file_name();
            if let Some(index) = naming::parse_image_index(&file_name.to_string_lossy())? {
                images.insert(index);
            }
        }
        Ok(images)
    }

    /// Next unused processed index: highest `img<N>.png` plus one, or 1.
    pub fn next_index(&self) -> Result<u32, LayoutError> {
        next_index_after(&self.scan_images()?)
    }

    /// Scanned images whose label does not exist.
    ///
    /// These are left behind when a run stops between writing the image and
    /// the label; the watermark alone would skip them forever.
    pub fn orphaned_labels(&self, images: &BTreeSet<u32>) -> Vec<u32> {
        images
            .iter()
            .copied()
            .filter(|&index| !self.label_path(index).exists())
            .collect()
    }

    pub fn raw_path(&self, name: &str) -> PathBuf {
        self.raw_dir.join(naming::raw_file_name(name))
    }

    pub fn image_path(&self, index: u32) -> PathBuf {
        self.emoji_dir.join(naming::image_file_name(index))
    }

    pub fn label_path(&self, index: u32) -> PathBuf {
        self.emoji_dir.join(naming::label_file_name(index))
    }
}

/// Watermark for a set of scanned image indices.
pub fn next_index_after(images: &BTreeSet<u32>) -> Result<u32, LayoutError> {
    match images.last() {
        None => Ok(1),
        Some(&highest) => highest
            .checked_add(1)
            .ok_or(LayoutError::IndexExhausted { highest }),
    }
}
