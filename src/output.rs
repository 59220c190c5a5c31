//! CLI output formatting.
//!
//! Each record is identified the way the dataset identifies it: processed
//! index first, label second.
//!
//! # Output Format
//!
//! ## Run
//!
//! ```text
//! Downloading 3 of 5 emoji from img3 (8 workers)
//! 003 smiling face (2114 bytes)
//! 005 FAILED face with tears of joy
//!     Status 404
//! 004 thumbs up (1876 bytes)
//! 2 downloaded, 1 failed, 3 dispatched from img3
//! ```
//!
//! Lines arrive in completion order, not index order.
//!
//! ## Status
//!
//! ```text
//! Manifest: 5 entries
//! Next index: img3
//! Pending: 3
//! Missing labels: img1
//! ```
//!
//! # Architecture
//!
//! `format_*` functions return `Vec<String>` and are pure; `print_*` wrappers
//! write to stdout.

use crate::process::{ProcessEvent, RunSummary, StatusReport};

/// Format a processed index as 3-digit zero-padded.
fn format_index(index: u32) -> String {
    format!("{:0>3}", index)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Labels can span lines; only the first is shown.
fn label_line(label: &str) -> &str {
    label.lines().next().unwrap_or("")
}

/// Format a single progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::Started {
            start_index,
            pending,
            total,
            workers,
        } => {
            if *pending == 0 {
                vec![format!(
                    "Nothing to download: all {} emoji done (next index img{})",
                    total, start_index
                )]
            } else {
                vec![format!(
                    "Downloading {} of {} emoji from img{} ({} workers)",
                    pending, total, start_index, workers
                )]
            }
        }
        ProcessEvent::LabelRepaired { index, label } => {
            vec![format!(
                "{} {} (label repaired)",
                format_index(*index),
                label_line(label)
            )]
        }
        ProcessEvent::ItemCompleted {
            index,
            label,
            raw_bytes,
        } => {
            vec![format!(
                "{} {} ({} bytes)",
                format_index(*index),
                label_line(label),
                raw_bytes
            )]
        }
        ProcessEvent::ItemFailed {
            index,
            label,
            cause,
        } => {
            vec![
                format!("{} FAILED {}", format_index(*index), label_line(label)),
                format!("{}{}", indent(1), cause),
            ]
        }
    }
}

/// Format the closing line of a run.
pub fn format_run_summary(summary: &RunSummary) -> Vec<String> {
    vec![summary.to_string()]
}

/// Format a `status` report.
pub fn format_status(report: &StatusReport) -> Vec<String> {
    let mut lines = vec![
        format!("Manifest: {} entries", report.manifest_len),
        format!("Next index: img{}", report.next_index),
        format!("Pending: {}", report.pending),
    ];
    if !report.orphaned_labels.is_empty() {
        let names: Vec<String> = report
            .orphaned_labels
            .iter()
            .map(|i| format!("img{i}"))
            .collect();
        lines.push(format!("Missing labels: {}", names.join(", ")));
    }
    lines
}

pub fn print_process_event(event: &ProcessEvent) {
    for line in format_process_event(event) {
        println!("{}", line);
    }
}

pub fn print_run_summary(summary: &RunSummary) {
    for line in format_run_summary(summary) {
        println!("{}", line);
    }
}

pub fn print_status(report: &StatusReport) {
    for line in format_status(report) {
        println!("{}", line);
    }
}
