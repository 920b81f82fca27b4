//! Manifest diffing
//!
//! Decides which dependencies actually changed versus the target manifest.
//! A name counts as changed when its discovered version differs from the
//! recorded one by raw string OR by parsed value; a raw-string-only change
//! (e.g. `1.2` recorded, `1.2.0` discovered) still counts, so formatting
//! drift is surfaced rather than hidden. Names absent from the manifest are
//! always changed.
//!
//! Only changed names get their artifacts fetched; an unchanged module's
//! recorded URL and checksum are assumed current too.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{Version, VersionCandidate};
use crate::manifest::ManifestState;

/// Names whose discovered version differs from the manifest
pub fn diff(
    manifest: &ManifestState,
    resolved: &BTreeMap<String, VersionCandidate>,
) -> BTreeSet<String> {
    let mut changed = BTreeSet::new();

    for (name, candidate) in resolved {
        let Some(current) = manifest.version(name) else {
            changed.insert(name.clone());
            continue;
        };

        if current != candidate.raw {
            changed.insert(name.clone());
            continue;
        }

        match current.parse::<Version>() {
            Ok(current_version) if current_version == candidate.version => {}
            _ => {
                changed.insert(name.clone());
            }
        }
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn manifest(yaml: &str) -> ManifestState {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("m.yml");
        fs::write(&path, yaml).unwrap();
        ManifestState::load(&path, Some("runtime")).unwrap()
    }

    fn resolved(entries: &[(&str, &str)]) -> BTreeMap<String, VersionCandidate> {
        entries
            .iter()
            .map(|(name, raw)| (name.to_string(), VersionCandidate::parse(raw).unwrap()))
            .collect()
    }

    const MANIFEST: &str = r#"
runtime-version: "24.08"
modules:
  - name: app
    sources:
      - url: https://example.com/app-1.0.tar.gz
        sha256: aa
"#;

    #[test]
    fn test_new_version_is_changed() {
        let changed = diff(&manifest(MANIFEST), &resolved(&[("app", "1.1")]));
        assert_eq!(changed.into_iter().collect::<Vec<_>>(), vec!["app"]);
    }

    #[test]
    fn test_same_version_is_unchanged() {
        let changed = diff(&manifest(MANIFEST), &resolved(&[("app", "1.0")]));
        assert!(changed.is_empty());
    }

    #[test]
    fn test_diff_is_idempotent_when_nothing_changed() {
        let state = manifest(MANIFEST);
        let same = resolved(&[("app", "1.0"), ("runtime", "24.08")]);
        assert!(diff(&state, &same).is_empty());
        assert!(diff(&state, &same).is_empty());
    }

    #[test]
    fn test_raw_string_change_counts_as_changed() {
        // parsed values are equal ("1.0" == "1.0.0"), but the raw strings
        // differ; the conservative policy reports this as a change
        let changed = diff(&manifest(MANIFEST), &resolved(&[("app", "1.0.0")]));
        assert_eq!(changed.len(), 1);
    }

    #[test]
    fn test_name_missing_from_manifest_is_changed() {
        let changed = diff(&manifest(MANIFEST), &resolved(&[("newmod", "0.1")]));
        assert!(changed.contains("newmod"));
    }

    #[test]
    fn test_runtime_participates() {
        let changed = diff(&manifest(MANIFEST), &resolved(&[("runtime", "25.08")]));
        assert!(changed.contains("runtime"));
    }
}
