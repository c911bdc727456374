//! # artsync
//!
//! Mirrors a remote artwork repository into a local cache of resized WebP
//! variants. One run enumerates the remote manifest, skips everything the
//! local tree already has, and fetches + transcodes the rest — thousands of
//! independent items, any of which may fail without taking the batch down.
//!
//! # Architecture: One Pass, Four Stages
//!
//! ```text
//! 1. Resolve   manifest URL   →  asset descriptors   (one request)
//! 2. Inspect   output tree    →  pending vs cached   (pure existence checks)
//! 3. Transcode pending assets →  WebP variants       (bounded worker pool)
//! 4. Settle    outcomes       →  summary + exit code
//! ```
//!
//! Items are strictly independent, so the pipeline needs no cross-item
//! coordination: the worker pool joins every dispatched asset before the
//! run reports completion, and the summary counts always sum to the
//! manifest size.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`manifest`] | Resolves the remote tree listing into asset descriptors (key + subfolder derivation) |
//! | [`cache`] | Pure delta detection: destination paths and needs-work checks |
//! | [`remote`] | Network seam: [`remote::RemoteSource`] trait + blocking HTTP implementation |
//! | [`imaging`] | Decode once, render square WebP variants at configured quality |
//! | [`sync`] | The run itself: fan-out, per-asset failure isolation, summary |
//! | [`config`] | `artsync.toml` loading, validation, stock config generation |
//! | [`output`] | CLI output formatting — progress lines and the final summary |
//!
//! # Design Decisions
//!
//! ## Rerun Is the Retry
//!
//! There is no in-run retry loop. A failed asset is logged, counted, and
//! left incomplete on disk; the next run's cache inspection finds the
//! missing outputs and redoes exactly those assets. This keeps the worker
//! trivial and makes every run idempotent: unchanged manifest + untouched
//! output tree = zero fetches.
//!
//! ## One Fetch Feeds Every Variant
//!
//! When any variant of an asset is missing, all of its variants regenerate
//! from a single fresh fetch and a single decode. Slightly more transcoding
//! than strictly necessary, in exchange for a simple invariant: sibling
//! variants always derive from the same source bytes.
//!
//! ## Bounded Fan-Out
//!
//! Pending assets are dispatched across a fixed-size rayon pool
//! (`processing.max_workers`, default 8) instead of all at once. The bound
//! exists for the remote host's benefit, not the CPU's; blasting a
//! thousand-request burst at a public content host is how you get rate
//! limited. Completion is structural — the parallel iterator's `collect()`
//! returns only when every asset has settled — so the process can never
//! exit with work still in flight.
//!
//! ## Atomic Variant Writes
//!
//! Outputs are written to a temp sibling and renamed into place. Existence
//! of a destination file is the cache key, so a truncated file at the final
//! path would poison every later run; rename makes that state unreachable.

pub mod cache;
pub mod config;
pub mod imaging;
pub mod manifest;
pub mod output;
pub mod remote;
pub mod sync;

#[cfg(test)]
pub(crate) mod test_helpers;
