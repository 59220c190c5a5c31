//! # emoji-dataset
//!
//! Turns a JSON list of emoji links into a labelled image dataset. Each
//! emoji is downloaded once, kept verbatim, flattened onto white, and stored
//! next to its text label under a running index.
//!
//! # Pipeline
//!
//! ```text
//! emojisPruned.json ──► fetch ──► raw/<name>.png        (as downloaded)
//!                            └──► normalize ──► emoji/img<N>.png (opaque, on white)
//!                                               emoji/img<N>.txt (label)
//! ```
//!
//! Runs are resumable: the highest `img<N>.png` already on disk is the
//! watermark, and only manifest entries past it are fetched. Appending to the
//! manifest and running again extends the dataset without renumbering it.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`manifest`] | Loads the ordered list of `{link, name, processed}` records |
//! | [`naming`] | The `img<N>.png` / `img<N>.txt` filename convention |
//! | [`layout`] | Output directories, resume watermark, missing-label detection |
//! | [`imaging`] | Decode, composite onto white, encode PNG |
//! | [`fetch`] | The [`fetch::Fetcher`] seam and its HTTP implementation |
//! | [`process`] | Per-record work and the parallel run over the manifest |
//! | [`config`] | Optional `emoji-dataset.toml` settings |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Indices Are Assigned Before Dispatch
//!
//! Manifest position `p` always becomes index `p + 1`. Workers therefore own
//! disjoint file names from the start and need no locking, and a rerun can
//! tell which entries are done from the directory listing alone.
//!
//! ## Failures Stay Local
//!
//! A broken link or undecodable image fails that record only. The run
//! reports it and finishes the rest; since nothing is written for a failed
//! download, a failure at the end of the manifest is retried by the next run.
//! Failures in the middle leave a gap that the watermark moves past.

pub mod config;
pub mod fetch;
pub mod imaging;
pub mod layout;
pub mod manifest;
pub mod naming;
pub mod output;
pub mod process;

#[cfg(test)]
pub(crate) mod test_helpers;
