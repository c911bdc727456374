//! Manifest resolution, the first stage of the sync pipeline.
//!
//! One request fetches the remote repository's full recursive tree listing;
//! entries under the configured artwork prefix become [`AssetDescriptor`]s.
//! Everything else about a run (cache inspection, fetching, transcoding) is
//! keyed off the descriptors produced here.
//!
//! ## Key derivation
//!
//! The part of the path after the prefix is split on `/`: the final
//! segment's stem becomes the asset key, any intermediate segments become
//! the subfolder. Both are preserved verbatim in output paths, so the
//! mapping from remote path to local file is deterministic across runs:
//!
//! ```text
//! sprites/pokemon/other/official-artwork/25.png        → key "25"
//! sprites/pokemon/other/official-artwork/shiny/25.png  → subfolder "shiny", key "25"
//! ```
//!
//! Entries whose final segment has no extension (directory nodes in the
//! tree listing) are dropped, as are paths outside the prefix.

use crate::remote::{RemoteError, RemoteSource};
use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("manifest request failed: {0}")]
    Remote(#[from] RemoteError),
    #[error("manifest payload is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One entry of the tree listing. Listings carry mode/type/sha fields too;
/// only the path matters here and unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
}

/// Identifies one source image in the remote repository.
///
/// Created once per run by [`resolve`], immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDescriptor {
    /// Full path under the remote repository root.
    pub source_path: String,
    /// Path segments between the artwork prefix and the filename, if any.
    pub subfolder: Option<String>,
    /// Filename stem; names every output file for this asset.
    pub key: String,
}

impl AssetDescriptor {
    /// Key with the subfolder prefix, for display: `shiny/25`.
    pub fn display_key(&self) -> String {
        match &self.subfolder {
            Some(sub) => format!("{}/{}", sub, self.key),
            None => self.key.clone(),
        }
    }
}

/// Derive a descriptor from one manifest path, or None if the path is
/// outside the prefix or not a file-like entry.
fn descriptor_from_path(path: &str, prefix: &str) -> Option<AssetDescriptor> {
    let rel = path.strip_prefix(prefix)?.trim_start_matches('/');
    if rel.is_empty() {
        return None;
    }

    let mut segments: Vec<&str> = rel.split('/').collect();
    let file = segments.pop()?;
    let (stem, ext) = file.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }

    let subfolder = if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    };

    Some(AssetDescriptor {
        source_path: path.to_string(),
        subfolder,
        key: stem.to_string(),
    })
}

/// Resolve the remote manifest into asset descriptors, in manifest order.
///
/// Fatal on a failed request or an unparseable payload — nothing else can
/// proceed without a manifest. Two source paths that differ only in
/// extension would collide on the same output file, so duplicate
/// (subfolder, key) pairings are dropped first-wins; every returned
/// descriptor owns a distinct set of output paths.
pub fn resolve(
    remote: &impl RemoteSource,
    prefix: &str,
) -> Result<Vec<AssetDescriptor>, ManifestError> {
    let payload = remote.fetch_manifest()?;
    let listing: TreeResponse = serde_json::from_str(&payload)?;

    let mut seen = HashSet::new();
    let mut assets = Vec::new();
    for entry in listing.tree {
        if let Some(asset) = descriptor_from_path(&entry.path, prefix)
            && seen.insert((asset.subfolder.clone(), asset.key.clone()))
        {
            assets.push(asset);
        }
    }
    Ok(assets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::tests::MockSource;
    use crate::test_helpers::tree_json;
    use std::collections::HashMap;

    const PREFIX: &str = "sprites/pokemon/other/official-artwork/";

    #[test]
    fn flat_path_derives_key_without_subfolder() {
        let asset =
            descriptor_from_path("sprites/pokemon/other/official-artwork/25.png", PREFIX).unwrap();

        assert_eq!(asset.key, "25");
        assert_eq!(asset.subfolder, None);
        assert_eq!(
            asset.source_path,
            "sprites/pokemon/other/official-artwork/25.png"
        );
        assert_eq!(asset.display_key(), "25");
    }

    #[test]
    fn subfolder_is_preserved() {
        let asset = descriptor_from_path(
            "sprites/pokemon/other/official-artwork/shiny/25.png",
            PREFIX,
        )
        .unwrap();

        assert_eq!(asset.key, "25");
        assert_eq!(asset.subfolder.as_deref(), Some("shiny"));
        assert_eq!(asset.display_key(), "shiny/25");
    }

    #[test]
    fn nested_subfolders_join_into_one() {
        let asset = descriptor_from_path(
            "sprites/pokemon/other/official-artwork/shiny/female/25.png",
            PREFIX,
        )
        .unwrap();

        assert_eq!(asset.subfolder.as_deref(), Some("shiny/female"));
        assert_eq!(asset.key, "25");
    }

    #[test]
    fn paths_outside_prefix_are_dropped() {
        assert!(descriptor_from_path("sprites/pokemon/25.png", PREFIX).is_none());
        assert!(descriptor_from_path("README.md", PREFIX).is_none());
    }

    #[test]
    fn directory_entries_are_dropped() {
        // Tree listings include the directory nodes themselves
        assert!(descriptor_from_path("sprites/pokemon/other/official-artwork", PREFIX).is_none());
        assert!(
            descriptor_from_path("sprites/pokemon/other/official-artwork/shiny", PREFIX).is_none()
        );
    }

    #[test]
    fn dotfiles_and_extensionless_names_are_dropped() {
        assert!(
            descriptor_from_path("sprites/pokemon/other/official-artwork/.keep", PREFIX).is_none()
        );
        assert!(
            descriptor_from_path("sprites/pokemon/other/official-artwork/LICENSE", PREFIX)
                .is_none()
        );
    }

    #[test]
    fn multi_dot_filename_keeps_inner_dots_in_key() {
        let asset =
            descriptor_from_path("sprites/pokemon/other/official-artwork/25.back.png", PREFIX)
                .unwrap();
        assert_eq!(asset.key, "25.back");
    }

    #[test]
    fn resolve_filters_and_preserves_manifest_order() {
        let manifest = tree_json(&[
            "sprites/pokemon/1.png",
            "sprites/pokemon/other/official-artwork/3.png",
            "sprites/pokemon/other/official-artwork/shiny",
            "sprites/pokemon/other/official-artwork/1.png",
            "sprites/pokemon/other/official-artwork/shiny/1.png",
        ]);
        let source = MockSource::new(manifest, HashMap::new());

        let assets = resolve(&source, PREFIX).unwrap();

        let keys: Vec<String> = assets.iter().map(|a| a.display_key()).collect();
        assert_eq!(keys, vec!["3", "1", "shiny/1"]);
    }

    #[test]
    fn resolve_tolerates_extra_entry_fields() {
        let manifest = r#"{
            "sha": "abc123",
            "tree": [
                {"path": "sprites/pokemon/other/official-artwork/7.png",
                 "mode": "100644", "type": "blob", "sha": "def", "size": 1234}
            ],
            "truncated": false
        }"#;
        let source = MockSource::new(manifest, HashMap::new());

        let assets = resolve(&source, PREFIX).unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].key, "7");
    }

    #[test]
    fn resolve_dedupes_colliding_keys_first_wins() {
        let manifest = tree_json(&[
            "sprites/pokemon/other/official-artwork/25.png",
            "sprites/pokemon/other/official-artwork/25.jpg",
            "sprites/pokemon/other/official-artwork/shiny/25.png",
        ]);
        let source = MockSource::new(manifest, HashMap::new());

        let assets = resolve(&source, PREFIX).unwrap();

        assert_eq!(assets.len(), 2);
        assert_eq!(
            assets[0].source_path,
            "sprites/pokemon/other/official-artwork/25.png"
        );
        assert_eq!(assets[1].display_key(), "shiny/25");
    }

    #[test]
    fn resolve_unparseable_payload_is_fatal() {
        let source = MockSource::new("surprise, not json", HashMap::new());
        let result = resolve(&source, PREFIX);
        assert!(matches!(result, Err(ManifestError::Parse(_))));
    }

    #[test]
    fn resolve_empty_tree_yields_no_assets() {
        let source = MockSource::new(tree_json(&[]), HashMap::new());
        assert!(resolve(&source, PREFIX).unwrap().is_empty());
    }
}
