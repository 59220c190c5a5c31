//! Downloading and normalizing the manifest into the dataset.
//!
//! ## Per-record work
//!
//! [`process_record`] handles one manifest entry at a pre-assigned index:
//!
//! ```text
//! GET link ──► raw/<name>.png          (bytes as received)
//!          └─► normalize ──► emoji/img<N>.png
//!                            emoji/img<N>.txt   (label, verbatim)
//! ```
//!
//! The three writes are not transactional. A failed download writes nothing;
//! a failed decode leaves the raw file behind.
//!
//! ## Run
//!
//! [`run`] prepares the layout, reads the resume watermark, loads the
//! manifest and fans the remaining records out over a dedicated rayon pool.
//! Indices are fixed before dispatch (position + 1), so workers never share
//! a file. Each worker sends its [`ItemOutcome`] back over a channel that the
//! calling thread drains as results arrive; a failed record is reported and
//! the run carries on.
//!
//! Progress is reported through an optional [`ProcessEvent`] channel so the
//! CLI can print while workers are still running.

use crate::fetch::{FetchError, Fetcher};
use crate::imaging::{self, NormalizeError};
use crate::layout::{LayoutError, OutputLayout, next_index_after};
use crate::manifest::{self, EmojiRecord, ManifestError};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Why a single record failed.
#[derive(Error, Debug)]
pub enum ItemErrorKind {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ItemErrorKind {
    fn stage(&self) -> &'static str {
        match self {
            Self::Fetch(_) => "download",
            Self::Normalize(_) | Self::Io { .. } => "process",
        }
    }
}

/// A failed record, with enough context to find it in the manifest.
#[derive(Error, Debug)]
#[error("Failed to {} {label}: {kind}", .kind.stage())]
pub struct ItemError {
    pub index: u32,
    pub name: String,
    pub label: String,
    #[source]
    pub kind: ItemErrorKind,
}

/// A record that made it to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReport {
    pub index: u32,
    pub name: String,
    pub label: String,
    /// Size of the raw download.
    pub raw_bytes: usize,
}

pub type ItemOutcome = Result<ItemReport, ItemError>;

/// Progress events emitted while a run is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    Started {
        start_index: u32,
        pending: usize,
        total: usize,
        workers: usize,
    },
    LabelRepaired {
        index: u32,
        label: String,
    },
    ItemCompleted {
        index: u32,
        label: String,
        raw_bytes: usize,
    },
    ItemFailed {
        index: u32,
        label: String,
        cause: String,
    },
}

/// Knobs for [`run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Worker threads in the pool. Zero is treated as one.
    pub workers: usize,
    /// Rewrite missing labels for already-processed indices from the manifest.
    pub repair_labels: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            workers: crate::config::effective_workers(&Default::default()),
            repair_labels: true,
        }
    }
}

/// What a run did.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Watermark at startup; the first index handed out.
    pub start_index: u32,
    pub manifest_len: usize,
    pub dispatched: usize,
    pub succeeded: usize,
    /// Failed records in completion order.
    pub failed: Vec<ItemError>,
    pub repaired_labels: Vec<u32>,
}

impl RunSummary {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} downloaded, {} failed, {} dispatched from img{}",
            self.succeeded,
            self.failed.len(),
            self.dispatched,
            self.start_index
        )?;
        if !self.repaired_labels.is_empty() {
            write!(f, ", {} labels repaired", self.repaired_labels.len())?;
        }
        Ok(())
    }
}

/// Dataset state without touching the network or the disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub manifest_len: usize,
    pub next_index: u32,
    pub pending: usize,
    pub orphaned_labels: Vec<u32>,
}

/// Records still to do, paired with their processed index.
///
/// Position `p` maps to index `p + 1`; everything below `start_index` is
/// assumed done. Entries past `u32::MAX` have no file name and are never
/// handed out.
pub fn pending_records(records: &[EmojiRecord], start_index: u32) -> Vec<(u32, &EmojiRecord)> {
    let skip = usize::try_from(start_index.saturating_sub(1)).unwrap_or(usize::MAX);
    (1..=u32::MAX)
        .zip(records)
        .skip(skip)
        .collect()
}

/// Fetch, persist and normalize one record.
pub fn process_record<F: Fetcher + ?Sized>(
    fetcher: &F,
    layout: &OutputLayout,
    record: &EmojiRecord,
    index: u32,
) -> ItemOutcome {
    let fail = |kind: ItemErrorKind| ItemError {
        index,
        name: record.name.clone(),
        label: record.processed.clone(),
        kind,
    };
    let write = |path: PathBuf, contents: &[u8]| {
        fs::write(&path, contents).map_err(|source| fail(ItemErrorKind::Io { path, source }))
    };

    let bytes = fetcher
        .fetch(&record.link)
        .map_err(|e| fail(e.into()))?;

    write(layout.raw_path(&record.name), &bytes)?;

    let png = imaging::normalize(&bytes)
        .and_then(|img| imaging::encode_png(&img))
        .map_err(|e| fail(e.into()))?;
    write(layout.image_path(index), &png)?;

    write(layout.label_path(index), record.processed.as_bytes())?;

    tracing::debug!(index, name = %record.name, bytes = bytes.len(), "record written");
    Ok(ItemReport {
        index,
        name: record.name.clone(),
        label: record.processed.clone(),
        raw_bytes: bytes.len(),
    })
}

/// Download every record past the watermark into `layout`.
///
/// Setup failures (directories, index scan, manifest) abort before anything
/// is fetched. Per-record failures are collected in the summary.
pub fn run<F: Fetcher + ?Sized>(
    fetcher: &F,
    layout: &OutputLayout,
    manifest_path: &Path,
    options: &RunOptions,
    progress: Option<Sender<ProcessEvent>>,
) -> Result<RunSummary, RunError> {
    layout.ensure_directories()?;
    let images = layout.scan_images()?;
    let start_index = next_index_after(&images)?;
    let records = manifest::load_manifest(manifest_path)?;

    let emit = |event: ProcessEvent| {
        if let Some(tx) = &progress {
            // The receiver going away only silences progress.
            tx.send(event).ok();
        }
    };

    let repaired_labels = if options.repair_labels {
        repair_orphaned_labels(layout, &records, &images, &emit)?
    } else {
        Vec::new()
    };

    let jobs = pending_records(&records, start_index);
    let workers = options.workers.max(1);
    tracing::info!(
        start_index,
        pending = jobs.len(),
        total = records.len(),
        workers,
        "starting download"
    );
    emit(ProcessEvent::Started {
        start_index,
        pending: jobs.len(),
        total: records.len(),
        workers,
    });

    let mut summary = RunSummary {
        start_index,
        manifest_len: records.len(),
        dispatched: jobs.len(),
        repaired_labels,
        ..Default::default()
    };

    if jobs.is_empty() {
        return Ok(summary);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("fetch-{i}"))
        .build()?;

    let (tx, rx) = mpsc::channel::<ItemOutcome>();
    pool.in_place_scope(|scope| {
        for &(index, record) in &jobs {
            let tx = tx.clone();
            scope.spawn(move |_| {
                tx.send(process_record(fetcher, layout, record, index)).ok();
            });
        }
        drop(tx);

        for outcome in rx {
            match outcome {
                Ok(report) => {
                    summary.succeeded += 1;
                    emit(ProcessEvent::ItemCompleted {
                        index: report.index,
                        label: report.label,
                        raw_bytes: report.raw_bytes,
                    });
                }
                Err(err) => {
                    tracing::warn!(index = err.index, name = %err.name, error = %err, "record failed");
                    emit(ProcessEvent::ItemFailed {
                        index: err.index,
                        label: err.label.clone(),
                        cause: err.kind.to_string(),
                    });
                    summary.failed.push(err);
                }
            }
        }
    });

    tracing::info!(
        succeeded = summary.succeeded,
        failed = summary.failed.len(),
        "download finished"
    );
    Ok(summary)
}

/// Rewrite `img<N>.txt` for processed images whose label never landed.
fn repair_orphaned_labels(
    layout: &OutputLayout,
    records: &[EmojiRecord],
    images: &BTreeSet<u32>,
    emit: &impl Fn(ProcessEvent),
) -> Result<Vec<u32>, RunError> {
    let mut repaired = Vec::new();
    for index in layout.orphaned_labels(images) {
        let position = index.checked_sub(1).map(|p| p as usize);
        let Some(record) = position.and_then(|p| records.get(p)) else {
            tracing::warn!(index, "image has no label and no manifest entry");
            continue;
        };
        let path = layout.label_path(index);
        fs::write(&path, record.processed.as_bytes())
            .map_err(|source| RunError::Io { path, source })?;
        tracing::warn!(index, "label repaired from manifest");
        emit(ProcessEvent::LabelRepaired {
            index,
            label: record.processed.clone(),
        });
        repaired.push(index);
    }
    Ok(repaired)
}

/// Report what a run would do, without fetching or writing anything.
pub fn status(layout: &OutputLayout, manifest_path: &Path) -> Result<StatusReport, RunError> {
    let images = layout.scan_images()?;
    let next_index = next_index_after(&images)?;
    let records = manifest::load_manifest(manifest_path)?;
    Ok(StatusReport {
        manifest_len: records.len(),
        next_index,
        pending: pending_records(&records, next_index).len(),
        orphaned_labels: layout.orphaned_labels(&images),
    })
}
