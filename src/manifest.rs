//! Emoji manifest loading.
//!
//! The manifest is a JSON array; each entry names one emoji to download:
//!
//! ```json
//! [
//!   {"link": "https://example.com/1f600.png", "name": "1f600", "processed": "grinning face"},
//!   {"link": "https://example.com/1f602.png", "name": "1f602", "processed": "face with tears of joy"}
//! ]
//! ```
//!
//! Array order is load-bearing: the entry at position `p` becomes processed
//! index `p + 1`. Entries missing a field (or with a non-string value) reject
//! the whole manifest; unknown keys are ignored.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default manifest file name, resolved against the working directory.
pub const DEFAULT_MANIFEST: &str = "emojisPruned.json";

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read manifest {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed manifest {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One emoji to fetch and label.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmojiRecord {
    /// Base name of the raw download (`raw/<name>.png`).
    pub name: String,
    /// Training label written to `img<N>.txt`.
    pub processed: String,
    /// Image URL.
    pub link: String,
}

/// Parse manifest JSON, preserving entry order.
pub fn parse_manifest(json: &str) -> Result<Vec<EmojiRecord>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Read and parse the manifest at `path`.
pub fn load_manifest(path: &Path) -> Result<Vec<EmojiRecord>, ManifestError> {
    let content = fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_manifest(&content).map_err(|source| ManifestError::Json {
        path: path.display().to_string(),
        source,
    })
}
