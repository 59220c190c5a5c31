//! Shared test utilities for the emoji-dataset test suite.
//!
//! Builds manifests, in-memory PNGs and ready-made output layouts so tests
//! can exercise the pipeline against a [`MockFetcher`] without a network.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let records = records(&["a", "b"]);
//! let manifest = write_manifest(tmp.path(), &records);
//! let fetcher = serve_all(&records).with_status("http://x/b.png", 404);
//! ```

use std::path::{Path, PathBuf};

use image::{ImageFormat, Rgba, RgbaImage};

use crate::fetch::tests::MockFetcher;
use crate::layout::OutputLayout;
use crate::manifest::EmojiRecord;

// =========================================================================
// Images
// =========================================================================

/// PNG bytes of a `width`×`height` image filled with one RGBA colour.
pub fn rgba_png(width: u32, height: u32, fill: Rgba<u8>) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, fill);
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

// =========================================================================
// Manifests
// =========================================================================

/// A record whose link is `http://x/<name>.png`.
pub fn record(name: &str, label: &str) -> EmojiRecord {
    EmojiRecord {
        name: name.to_string(),
        processed: label.to_string(),
        link: format!("http://x/{name}.png"),
    }
}

/// One record per name, labelled `label <name>`.
pub fn records(names: &[&str]) -> Vec<EmojiRecord> {
    names
        .iter()
        .map(|name| record(name, &format!("label {name}")))
        .collect()
}

/// Write `records` as `manifest.json` under `dir` and return its path.
pub fn write_manifest(dir: &Path, records: &[EmojiRecord]) -> PathBuf {
    let entries: Vec<serde_json::Value> = records
        .iter()
        .map(|r| {
            serde_json::json!({
                "link": r.link,
                "name": r.name,
                "processed": r.processed,
            })
        })
        .collect();
    let path = dir.join("manifest.json");
    std::fs::write(&path, serde_json::to_string_pretty(&entries).unwrap()).unwrap();
    path
}

// =========================================================================
// Fixtures
// =========================================================================

/// A fetcher answering every record's link with a small transparent PNG.
pub fn serve_all(records: &[EmojiRecord]) -> MockFetcher {
    records.iter().fold(MockFetcher::new(), |fetcher, r| {
        fetcher.with_body(&r.link, rgba_png(2, 2, Rgba([40, 80, 120, 64])))
    })
}

/// `<root>/raw` and `<root>/emoji`, created.
pub fn ready_layout(root: &Path) -> OutputLayout {
    let layout = OutputLayout::under(root);
    layout.ensure_directories().unwrap();
    layout
}
