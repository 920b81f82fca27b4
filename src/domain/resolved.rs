//! Resolved dependency facts
//!
//! A `ResolvedDependency` is the final per-descriptor fact set persisted into
//! template variables: chosen version, concrete source URL, artifact checksum,
//! and optionally the version's publish date.

use serde::Serialize;

/// The chosen version of one dependency plus its derived artifact facts
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedDependency {
    /// Descriptor name
    pub name: String,
    /// Chosen version string
    pub version: String,
    /// Concrete download URL, when the descriptor has a source template
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// Hex sha256 of the artifact, when one was fetched or inherited
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    /// Publish/tag date as `YYYY-MM-DD`, when the checker recorded one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_date: Option<String>,
}

impl ResolvedDependency {
    /// Creates a resolved dependency with only the version known
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            source_url: None,
            sha256: None,
            version_date: None,
        }
    }

    /// Template variables for this dependency, each key prefixed `{name}_`
    ///
    /// Optional facts that were never resolved produce no variable at all,
    /// so a template referencing them fails loudly instead of rendering
    /// blanks.
    pub fn template_vars(&self) -> Vec<(String, String)> {
        let mut vars = vec![(format!("{}_version", self.name), self.version.clone())];
        if let Some(ref url) = self.source_url {
            vars.push((format!("{}_source_url", self.name), url.clone()));
        }
        if let Some(ref sha256) = self.sha256 {
            vars.push((format!("{}_sha256", self.name), sha256.clone()));
        }
        if let Some(ref date) = self.version_date {
            vars.push((format!("{}_version_date", self.name), date.clone()));
        }
        vars
    }
}
