//! Dataset configuration.
//!
//! Every setting has a default, and the defaults reproduce a bare
//! `emoji-dataset` invocation: read `emojisPruned.json`, write to `raw/` and
//! `emoji/` in the working directory.
//!
//! ## Config File Location
//!
//! `emoji-dataset.toml` in the working directory is picked up when present.
//! `--config <path>` points elsewhere (and then the file must exist).
//! Command-line flags override file values.
//!
//! ## Configuration Options
//!
//! ```toml
//! manifest = "emojisPruned.json"  # JSON manifest to download
//! raw_dir = "raw"                 # Untouched downloads
//! emoji_dir = "emoji"             # Numbered image/label pairs
//!
//! [processing]
//! max_workers = 16                # Parallel downloads (omit for auto = CPU cores)
//! repair_labels = true            # Rewrite missing img<N>.txt from the manifest
//!
//! [fetch]
//! timeout_secs = 30               # Per-request timeout (omit for none)
//! user_agent = "emoji-dataset/0.1.0"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::fetch::{HttpOptions, default_user_agent};
use crate::layout::{DEFAULT_EMOJI_DIR, DEFAULT_RAW_DIR, OutputLayout};
use crate::manifest::DEFAULT_MANIFEST;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "emoji-dataset.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatasetConfig {
    /// JSON manifest of emoji to download.
    pub manifest: PathBuf,
    /// Directory for untouched downloads.
    pub raw_dir: PathBuf,
    /// Directory for numbered image/label pairs.
    pub emoji_dir: PathBuf,
    /// Worker pool settings.
    pub processing: ProcessingConfig,
    /// HTTP settings.
    pub fetch: FetchConfig,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from(DEFAULT_MANIFEST),
            raw_dir: PathBuf::from(DEFAULT_RAW_DIR),
            emoji_dir: PathBuf::from(DEFAULT_EMOJI_DIR),
            processing: ProcessingConfig::default(),
            fetch: FetchConfig::default(),
        }
    }
}

impl DatasetConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.max_workers == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_workers must be at least 1".into(),
            ));
        }
        if self.fetch.timeout_secs == Some(0) {
            return Err(ConfigError::Validation(
                "fetch.timeout_secs must be at least 1 (omit it for no timeout)".into(),
            ));
        }
        if self.fetch.user_agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "fetch.user_agent must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn layout(&self) -> OutputLayout {
        OutputLayout::new(&self.raw_dir, &self.emoji_dir)
    }
}

/// Worker pool settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel downloads.
    /// When absent or null, defaults to the number of CPU cores.
    pub max_workers: Option<usize>,
    /// Rewrite labels missing next to already-processed images.
    pub repair_labels: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_workers: None,
            repair_labels: true,
        }
    }
}

/// Resolve the effective worker count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `n` as given; workers mostly wait on the network, so the
///   core count is not a ceiling
pub fn effective_workers(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_workers.unwrap_or(cores).max(1)
}

/// HTTP settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    /// Whole-request timeout in seconds. Absent means wait indefinitely.
    pub timeout_secs: Option<u64>,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            user_agent: default_user_agent(),
        }
    }
}

impl FetchConfig {
    pub fn http_options(&self) -> HttpOptions {
        HttpOptions {
            timeout: self.timeout_secs.map(Duration::from_secs),
            user_agent: self.user_agent.clone(),
        }
    }
}

/// Load and validate a config file. The file must exist.
pub fn load_config(path: &Path) -> Result<DatasetConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: DatasetConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Load `path` if it exists, otherwise return the defaults.
pub fn load_config_or_default(path: &Path) -> Result<DatasetConfig, ConfigError> {
    if !path.exists() {
        return Ok(DatasetConfig::default());
    }
    load_config(path)
}

/// Returns a fully-commented stock config file with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# emoji-dataset configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# JSON manifest: an array of {"link", "name", "processed"} objects.
# Array order decides the img<N> index of each entry.
manifest = "emojisPruned.json"

# Untouched downloads, saved as <name>.png.
raw_dir = "raw"

# Numbered training pairs: img<N>.png (on white) + img<N>.txt (label).
emoji_dir = "emoji"

# ---------------------------------------------------------------------------
# Worker pool
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel downloads. Omit to use one worker per CPU core.
# max_workers = 16

# When an img<N>.png exists without its img<N>.txt, rewrite the label from
# the manifest before downloading.
repair_labels = true

# ---------------------------------------------------------------------------
# HTTP
# ---------------------------------------------------------------------------
[fetch]
# Per-request timeout in seconds. Omit to wait indefinitely.
# timeout_secs = 30

# User-Agent header. Defaults to emoji-dataset/<version>.
# user_agent = "emoji-dataset"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_bare_invocation() {
        let config = DatasetConfig::default();
        assert_eq!(config.manifest, PathBuf::from("emojisPruned.json"));
        assert_eq!(config.raw_dir, PathBuf::from("raw"));
        assert_eq!(config.emoji_dir, PathBuf::from("emoji"));
        assert_eq!(config.processing.max_workers, None);
        assert!(config.processing.repair_labels);
        assert_eq!(config.fetch.timeout_secs, None);
    }

    #[test]
    fn default_layout() {
        assert_eq!(DatasetConfig::default().layout(), OutputLayout::default());
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let config: DatasetConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, DatasetConfig::default());
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let config: DatasetConfig = toml::from_str(
            r#"
emoji_dir = "dataset"

[processing]
max_workers = 32
"#,
        )
        .unwrap();
        assert_eq!(config.emoji_dir, PathBuf::from("dataset"));
        assert_eq!(config.raw_dir, PathBuf::from("raw"));
        assert_eq!(config.processing.max_workers, Some(32));
        assert!(config.processing.repair_labels);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<DatasetConfig, _> = toml::from_str(
            r#"
[processing]
max_processes = 4
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn zero_workers_is_invalid() {
        let config = DatasetConfig {
            processing: ProcessingConfig {
                max_workers: Some(0),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let mut config = DatasetConfig::default();
        config.fetch.timeout_secs = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn blank_user_agent_is_invalid() {
        let mut config = DatasetConfig::default();
        config.fetch.user_agent = "  ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn effective_workers_auto() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_workers(&ProcessingConfig::default()), cores);
    }

    #[test]
    fn effective_workers_not_clamped_to_cores() {
        let config = ProcessingConfig {
            max_workers: Some(512),
            ..Default::default()
        };
        assert_eq!(effective_workers(&config), 512);
    }

    #[test]
    fn http_options_from_fetch_config() {
        let config = FetchConfig {
            timeout_secs: Some(12),
            user_agent: "bot".into(),
        };
        let options = config.http_options();
        assert_eq!(options.timeout, Some(Duration::from_secs(12)));
        assert_eq!(options.user_agent, "bot");
    }

    #[test]
    fn load_config_or_default_without_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config_or_default(&tmp.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        assert_eq!(config, DatasetConfig::default());
    }

    #[test]
    fn load_config_requires_file() {
        let tmp = TempDir::new().unwrap();
        let result = load_config(&tmp.path().join("missing.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn load_config_validates() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "[processing]\nmax_workers = 0\n").unwrap();
        assert!(matches!(
            load_config(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn load_config_reads_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "manifest = \"list.json\"\n[fetch]\ntimeout_secs = 5\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.manifest, PathBuf::from("list.json"));
        assert_eq!(config.fetch.timeout_secs, Some(5));
    }
}
