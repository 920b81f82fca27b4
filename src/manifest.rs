//! Target manifest state
//!
//! Reads the versions currently recorded in a Flatpak-style manifest (JSON or
//! YAML, chosen by extension). The manifest is a read-only input: the runtime
//! version comes from the `runtime-version` key, and each module's version is
//! recovered from its first source's tarball URL. Recorded sha256 values are
//! kept so unchanged modules never need a re-download.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::ManifestError;

/// Version/checksum facts currently recorded for one name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Version string as recorded in the manifest
    pub version: String,
    /// sha256 recorded for the module's first source, when present
    pub sha256: Option<String>,
}

/// Current per-name state of the target manifest
#[derive(Debug, Clone, Default)]
pub struct ManifestState {
    entries: BTreeMap<String, ManifestEntry>,
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(rename = "runtime-version")]
    runtime_version: Option<String>,
    #[serde(default)]
    modules: Vec<RawModuleEntry>,
}

/// Flatpak manifests may list modules inline or as include-path strings;
/// includes carry no version information and are skipped.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawModuleEntry {
    Inline(RawModule),
    Include(String),
}

#[derive(Debug, Deserialize)]
struct RawModule {
    name: String,
    #[serde(default)]
    sources: Vec<RawSource>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    url: Option<String>,
    sha256: Option<String>,
}

/// Matches `-<version>.tar.<ext>` at the end of a source URL
fn tarball_version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-([0-9.]+)\.tar\.(?:gz|xz|bz2)$").unwrap())
}

impl ManifestState {
    /// Load manifest state from a JSON or YAML file
    ///
    /// `runtime_name` keys the `runtime-version` entry so it lines up with
    /// the rule file's runtime descriptor.
    pub fn load(path: &Path, runtime_name: Option<&str>) -> Result<Self, ManifestError> {
        if !path.exists() {
            return Err(ManifestError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;

        let raw: RawManifest = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| ManifestError::ParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        } else {
            serde_yaml_ng::from_str(&content).map_err(|e| ManifestError::ParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        };

        Ok(Self::from_raw(raw, runtime_name))
    }

    fn from_raw(raw: RawManifest, runtime_name: Option<&str>) -> Self {
        let mut entries = BTreeMap::new();

        if let (Some(name), Some(version)) = (runtime_name, raw.runtime_version) {
            entries.insert(
                name.to_string(),
                ManifestEntry {
                    version,
                    sha256: None,
                },
            );
        }

        for entry in raw.modules {
            let module = match entry {
                RawModuleEntry::Inline(module) => module,
                RawModuleEntry::Include(_) => continue,
            };
            let Some(source) = module.sources.first() else {
                continue;
            };
            let Some(url) = source.url.as_deref() else {
                continue;
            };
            let Some(captures) = tarball_version_regex().captures(url) else {
                continue;
            };
            entries.insert(
                module.name,
                ManifestEntry {
                    version: captures[1].to_string(),
                    sha256: source.sha256.clone(),
                },
            );
        }

        Self { entries }
    }

    /// Looks up the recorded entry for a name
    pub fn get(&self, name: &str) -> Option<&ManifestEntry> {
        self.entries.get(name)
    }

    /// Recorded version string for a name
    pub fn version(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|e| e.version.as_str())
    }

    /// Recorded sha256 for a name
    pub fn sha256(&self, name: &str) -> Option<&str> {
        self.entries.get(name).and_then(|e| e.sha256.as_deref())
    }

    /// Number of names with recorded state
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no state was recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
