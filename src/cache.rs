//! Delta detection against the local output tree.
//!
//! The cache key is the output path itself: an asset's variant is "done"
//! exactly when its destination file exists. No manifest file, no content
//! hashing — a rerun after a failure or a partial delete simply finds the
//! missing files and redoes those assets.
//!
//! An asset needs work when *any* of its variant outputs is missing, or
//! when replace mode forces regeneration. All variants then regenerate from
//! one fresh fetch, so sibling variants of the same asset always come from
//! the same source bytes.

use crate::config::VariantConfig;
use crate::imaging::OUTPUT_EXT;
use crate::manifest::AssetDescriptor;
use std::path::PathBuf;

/// Destination path for one (asset, variant) pair:
/// `output_root/[subfolder/]key.webp`.
///
/// Deterministic in its inputs — reruns and restarts always arrive at the
/// same path.
pub fn output_path(variant: &VariantConfig, asset: &AssetDescriptor) -> PathBuf {
    let mut path = variant.output_root.clone();
    if let Some(sub) = &asset.subfolder {
        path.push(sub);
    }
    path.push(format!("{}.{}", asset.key, OUTPUT_EXT));
    path
}

/// Whether an asset has to be fetched and transcoded. Pure existence
/// checks; never touches the network.
pub fn needs_work(asset: &AssetDescriptor, variants: &[VariantConfig], replace: bool) -> bool {
    replace || variants.iter().any(|v| !output_path(v, asset).exists())
}
