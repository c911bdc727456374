//! Run configuration module.
//!
//! Handles loading and validating `artsync.toml`. Every key is optional —
//! the stock defaults mirror the PokéAPI sprites repository the tool was
//! built around, so a bare `artsync sync` works with no config file at all.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [remote]
//! manifest_url = "https://api.github.com/repos/PokeAPI/sprites/git/trees/master?recursive=1"
//! content_base = "https://raw.githubusercontent.com/PokeAPI/sprites/master"
//! path_prefix = "sprites/pokemon/other/official-artwork/"
//! request_timeout_secs = 30   # Per-request timeout; a timeout fails the asset
//!
//! # One table per output variant. Each produces one file per asset.
//! [[variants]]
//! edge = 400                  # Output is square, edge x edge
//! quality = 60                # WebP quality (0-100)
//! output_root = "artwork/webp/400x400"
//!
//! [[variants]]
//! edge = 128
//! quality = 60
//! output_root = "artwork/webp/128x128"
//!
//! [processing]
//! max_workers = 8             # Concurrent fetch/transcode workers
//!
//! [run]
//! replace_existing = false    # Regenerate outputs even when present
//! strict_exit = false         # Exit non-zero when any asset failed
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Full run configuration loaded from `artsync.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Remote manifest and content host settings.
    pub remote: RemoteConfig,
    /// Output variants, one file per asset each.
    pub variants: Vec<VariantConfig>,
    /// Worker pool settings.
    pub processing: ProcessingConfig,
    /// Run policy (replace mode, exit status).
    pub run: RunConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            remote: RemoteConfig::default(),
            variants: default_variants(),
            processing: ProcessingConfig::default(),
            run: RunConfig::default(),
        }
    }
}

impl SyncConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.variants.is_empty() {
            return Err(ConfigError::Validation(
                "at least one [[variants]] table is required".into(),
            ));
        }
        for variant in &self.variants {
            if variant.edge == 0 {
                return Err(ConfigError::Validation("variant edge must be > 0".into()));
            }
            if variant.quality > 100 {
                return Err(ConfigError::Validation(
                    "variant quality must be 0-100".into(),
                ));
            }
        }
        // Two variants sharing a root would overwrite each other's files
        for (i, a) in self.variants.iter().enumerate() {
            if self.variants[i + 1..].iter().any(|b| b.output_root == a.output_root) {
                return Err(ConfigError::Validation(format!(
                    "duplicate variant output_root: {}",
                    a.output_root.display()
                )));
            }
        }
        if self.processing.max_workers == 0 {
            return Err(ConfigError::Validation(
                "processing.max_workers must be >= 1".into(),
            ));
        }
        if self.remote.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "remote.request_timeout_secs must be >= 1".into(),
            ));
        }
        if self.remote.manifest_url.is_empty()
            || self.remote.content_base.is_empty()
            || self.remote.path_prefix.is_empty()
        {
            return Err(ConfigError::Validation(
                "remote.manifest_url, content_base and path_prefix must be set".into(),
            ));
        }
        Ok(())
    }
}

/// Remote manifest and content host settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemoteConfig {
    /// URL returning the full recursive tree listing as JSON.
    pub manifest_url: String,
    /// Base URL for raw content; the manifest path is appended to it.
    pub content_base: String,
    /// Only manifest entries under this prefix become assets.
    pub path_prefix: String,
    /// Per-request timeout in seconds. A timed-out fetch fails the asset;
    /// it is retried by the next run.
    pub request_timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            manifest_url:
                "https://api.github.com/repos/PokeAPI/sprites/git/trees/master?recursive=1"
                    .to_string(),
            content_base: "https://raw.githubusercontent.com/PokeAPI/sprites/master".to_string(),
            path_prefix: "sprites/pokemon/other/official-artwork/".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// One output variant: a square size, a quality, and where its files live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariantConfig {
    /// Output edge length; every file is `edge` x `edge`.
    pub edge: u32,
    /// WebP quality (0-100).
    #[serde(default = "default_quality")]
    pub quality: u32,
    /// Base directory for this variant's files.
    pub output_root: PathBuf,
}

fn default_quality() -> u32 {
    60
}

fn default_variants() -> Vec<VariantConfig> {
    vec![
        VariantConfig {
            edge: 400,
            quality: default_quality(),
            output_root: PathBuf::from("artwork/webp/400x400"),
        },
        VariantConfig {
            edge: 128,
            quality: default_quality(),
            output_root: PathBuf::from("artwork/webp/128x128"),
        },
    ]
}

/// Worker pool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Number of concurrent fetch/transcode workers. Workers are I/O-bound,
    /// so this is a remote-host courtesy rather than a CPU count; the
    /// default stays deliberately low to avoid tripping rate limits.
    pub max_workers: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self { max_workers: 8 }
    }
}

/// Run policy knobs. Both can also be switched on per-invocation with
/// `--replace` / `--strict`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Regenerate outputs even when they already exist.
    pub replace_existing: bool,
    /// Exit non-zero when any asset failed. Off by default: a batch with
    /// some failures still completes and reports them in the summary.
    pub strict_exit: bool,
}

/// Load config from `path`, falling back to stock defaults when the file
/// doesn't exist. A present-but-broken file is an error, not a fallback.
pub fn load_or_default(path: &Path) -> Result<SyncConfig, ConfigError> {
    if !path.exists() {
        return Ok(SyncConfig::default());
    }
    let content = fs::read_to_string(path)?;
    let config: SyncConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// A documented stock config file, printed by `artsync gen-config`.
pub fn stock_config_toml() -> String {
    r#"# artsync configuration. Every key is optional; the values below are
# the built-in defaults.

[remote]
# URL returning the repository's full recursive tree listing as JSON.
manifest_url = "https://api.github.com/repos/PokeAPI/sprites/git/trees/master?recursive=1"
# Base URL for raw content; manifest paths are appended to it.
content_base = "https://raw.githubusercontent.com/PokeAPI/sprites/master"
# Only manifest entries under this prefix are mirrored.
path_prefix = "sprites/pokemon/other/official-artwork/"
# Per-request timeout in seconds. A timed-out fetch fails that asset;
# the next run retries it.
request_timeout_secs = 30

# One [[variants]] table per output size. Each produces one WebP file per
# asset under its output_root: <output_root>/[subfolder/]<key>.webp
[[variants]]
edge = 400
quality = 60
output_root = "artwork/webp/400x400"

[[variants]]
edge = 128
quality = 60
output_root = "artwork/webp/128x128"

[processing]
# Concurrent fetch/transcode workers. Kept low by default so the content
# host isn't hammered.
max_workers = 8

[run]
# Regenerate outputs even when they already exist (same as --replace).
replace_existing = false
# Exit non-zero when any asset failed (same as --strict). Off by default:
# a run with failures still completes and reports them.
strict_exit = false
"#
    .to_string()
}
