//! Artwork synchronization: fetching and transcoding every pending asset.
//!
//! Stage 2 of the pipeline: takes the resolved manifest and brings the
//! local output tree up to date. Assets are strictly independent; each
//! settles as `Skipped`, `Generated`, or `Failed`, and one asset's failure
//! never aborts its siblings.
//!
//! ## Concurrency
//!
//! Pending assets fan out over the rayon worker pool (sized from
//! `processing.max_workers`; see the pool init in `main`). The `collect()`
//! on the parallel iterator is the completion barrier: the run returns only
//! after every dispatched asset has reached a terminal outcome, and the
//! summary counts always sum to the number of resolved assets. The only
//! shared resources are the network and the filesystem, and every variant
//! write lands on a distinct path, so no locking is needed.
//!
//! ## Idempotence
//!
//! Variant files are written to a temporary sibling and renamed into place,
//! so an interrupted run can never leave a truncated file where the cache
//! inspector would count it as present. Re-running against an unchanged
//! manifest and an untouched output tree fetches nothing and regenerates
//! nothing.

use crate::cache;
use crate::config::{SyncConfig, VariantConfig};
use crate::imaging::{self, Quality, TranscodeError};
use crate::manifest::{self, AssetDescriptor, ManifestError};
use crate::remote::{RemoteError, RemoteSource};
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Fatal errors that abort the whole run before or during dispatch.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("manifest resolution failed: {0}")]
    Manifest(#[from] ManifestError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Per-asset errors, caught at the asset boundary and recorded in the
/// summary instead of propagating.
#[derive(Error, Debug)]
pub enum ItemError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] RemoteError),
    #[error("transcode failed: {0}")]
    Transcode(#[from] TranscodeError),
    #[error("write failed: {0}")]
    Write(#[from] io::Error),
}

/// Terminal state of one asset. Every resolved asset ends in exactly one of
/// these; there is no transition back.
#[derive(Debug)]
pub enum ItemOutcome {
    /// Every variant output was already present; the network was untouched.
    Skipped,
    /// Every variant output was newly written.
    Generated,
    Failed(FailedAsset),
}

/// A failed asset with enough identity to diagnose and rerun selectively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedAsset {
    pub source_path: String,
    pub key: String,
    pub error: String,
}

/// Aggregated outcomes of a run.
#[derive(Debug, Default)]
pub struct Summary {
    pub skipped: usize,
    pub generated: usize,
    pub failures: Vec<FailedAsset>,
}

impl Summary {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn total(&self) -> usize {
        self.skipped + self.generated + self.failed()
    }
}

/// Progress events emitted while a run advances. The CLI drains these on a
/// printer thread; library callers can pass `None` and rely on the summary.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// Manifest resolved and cache inspected; dispatch is about to start.
    Resolved {
        total: usize,
        pending: usize,
        skipped: usize,
    },
    Skipped {
        key: String,
    },
    Generated {
        key: String,
        replaced: bool,
    },
    Failed {
        key: String,
        error: String,
    },
}

fn emit(progress: &Option<Sender<SyncEvent>>, event: SyncEvent) {
    if let Some(tx) = progress {
        // A hung-up receiver is not our problem; the run carries on
        let _ = tx.send(event);
    }
}

/// Run the full pipeline: resolve, inspect, fan out, settle, summarize.
///
/// Fatal only on manifest failure or inability to create the output roots.
/// Per-asset failures are collected into the summary; deciding whether they
/// make the process exit non-zero is the caller's policy.
pub fn run(
    remote: &impl RemoteSource,
    config: &SyncConfig,
    replace: bool,
    progress: Option<Sender<SyncEvent>>,
) -> Result<Summary, SyncError> {
    for variant in &config.variants {
        fs::create_dir_all(&variant.output_root)?;
    }

    let assets = manifest::resolve(remote, &config.remote.path_prefix)?;
    let total = assets.len();

    let (pending, skipped): (Vec<_>, Vec<_>) = assets
        .into_iter()
        .partition(|asset| cache::needs_work(asset, &config.variants, replace));

    emit(
        &progress,
        SyncEvent::Resolved {
            total,
            pending: pending.len(),
            skipped: skipped.len(),
        },
    );
    for asset in &skipped {
        emit(
            &progress,
            SyncEvent::Skipped {
                key: asset.display_key(),
            },
        );
    }

    let outcomes: Vec<ItemOutcome> = pending
        .par_iter()
        .map(|asset| {
            match process_asset(remote, asset, &config.variants) {
                Ok(()) => {
                    emit(
                        &progress,
                        SyncEvent::Generated {
                            key: asset.display_key(),
                            replaced: replace,
                        },
                    );
                    ItemOutcome::Generated
                }
                Err(error) => {
                    emit(
                        &progress,
                        SyncEvent::Failed {
                            key: asset.display_key(),
                            error: error.to_string(),
                        },
                    );
                    ItemOutcome::Failed(FailedAsset {
                        source_path: asset.source_path.clone(),
                        key: asset.display_key(),
                        error: error.to_string(),
                    })
                }
            }
        })
        .collect();

    let mut summary = Summary {
        skipped: skipped.len(),
        ..Summary::default()
    };
    for outcome in outcomes {
        match outcome {
            ItemOutcome::Skipped => summary.skipped += 1,
            ItemOutcome::Generated => summary.generated += 1,
            ItemOutcome::Failed(failure) => summary.failures.push(failure),
        }
    }
    Ok(summary)
}

/// Fetch one asset and write every configured variant.
///
/// The source is fetched and decoded exactly once; all variants render from
/// the same decoded image, so an asset's variants can never disagree about
/// which source bytes they came from.
pub fn process_asset(
    remote: &impl RemoteSource,
    asset: &AssetDescriptor,
    variants: &[VariantConfig],
) -> Result<(), ItemError> {
    let bytes = remote.fetch_bytes(&asset.source_path)?;
    let decoded = imaging::decode(&bytes)?;

    for variant in variants {
        let dest = cache::output_path(variant, asset);
        if let Some(dir) = dest.parent() {
            // Races with sibling assets sharing a subfolder are harmless
            fs::create_dir_all(dir)?;
        }
        let encoded =
            imaging::render_variant(&decoded, variant.edge, Quality::new(variant.quality))?;
        write_atomic(&dest, &encoded)?;
    }
    Ok(())
}

/// Write bytes via a temporary sibling and rename into place. Rename within
/// one directory is atomic on POSIX, so a later run sees either the whole
/// file or no file — never a truncated one.
fn write_atomic(dest: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut tmp = dest.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, dest)
}
