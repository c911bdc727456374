//! CLI output formatting for sync runs.
//!
//! Each display has a `format_*` function (pure, returns strings, unit
//! tested) and a `print_*` wrapper that writes to stdout. The per-asset
//! vocabulary is one word per terminal state: `cached` (already present),
//! `encoded` (newly written), `failed`.
//!
//! ```text
//! Manifest: 1025 assets (3 pending, 1022 cached)
//!     25: encoded
//!     shiny/25: encoded
//!     133: failed: fetch failed: ...
//! Synced 1025 assets: 1022 cached, 2 encoded, 1 failed
//!     failed: sprites/pokemon/other/official-artwork/133.png: fetch failed: ...
//! ```

use crate::sync::{Summary, SyncEvent};

/// Format one progress event as a display line.
pub fn format_sync_event(event: &SyncEvent) -> String {
    match event {
        SyncEvent::Resolved {
            total,
            pending,
            skipped,
        } => format!("Manifest: {total} assets ({pending} pending, {skipped} cached)"),
        SyncEvent::Skipped { key } => format!("    {key}: cached"),
        SyncEvent::Generated {
            key,
            replaced: false,
        } => format!("    {key}: encoded"),
        SyncEvent::Generated {
            key,
            replaced: true,
        } => format!("    {key}: re-encoded"),
        SyncEvent::Failed { key, error } => format!("    {key}: failed: {error}"),
    }
}

/// Format the final summary: one totals line, then one line per failure so
/// failed assets can be diagnosed and rerun.
pub fn format_summary(summary: &Summary) -> Vec<String> {
    let mut lines = vec![format!(
        "Synced {} assets: {} cached, {} encoded, {} failed",
        summary.total(),
        summary.skipped,
        summary.generated,
        summary.failed()
    )];
    for failure in &summary.failures {
        lines.push(format!(
            "    failed: {}: {}",
            failure.source_path, failure.error
        ));
    }
    lines
}

pub fn print_summary(summary: &Summary) {
    for line in format_summary(summary) {
        println!("{line}");
    }
}

/// Format one asset line of `artsync plan`.
pub fn format_plan_line(key: &str, pending: bool) -> String {
    if pending {
        format!("    {key}: pending")
    } else {
        format!("    {key}: cached")
    }
}

/// Format the closing line of `artsync plan`.
pub fn format_plan_summary(total: usize, pending: usize) -> String {
    format!("Plan: {pending} of {total} assets need work")
}
