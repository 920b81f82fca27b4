//! Source descriptors loaded from the rule file
//!
//! A descriptor identifies one dependency (the runtime or a module), names
//! the strategy used to discover its versions, and optionally carries a URL
//! template for downloading the chosen version's artifact.

use serde::Deserialize;

/// One dependency's configuration entry
#[derive(Debug, Clone, Deserialize)]
pub struct SourceDescriptor {
    /// Unique name; also the prefix for this dependency's template variables
    pub name: String,
    /// How to discover candidate versions
    pub get_version: CheckerSpec,
    /// URL template for the source artifact (see `resolver`); absent for
    /// entries that have nothing to download, such as the runtime
    #[serde(default)]
    pub source_url: Option<String>,
}

/// Checker strategy, dispatched by the rule file's `type` key
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckerSpec {
    /// Fetch a page and extract versions with a regex
    Scrape {
        /// Page to fetch
        url: String,
        /// Pattern with exactly one capture group yielding the version
        regex: String,
    },
    /// List GitHub releases (or tags) of a project
    GithubReleases {
        /// `owner/repo`
        project: String,
        /// List tags instead of releases
        #[serde(default)]
        tags: bool,
        /// Ordered literal replacements applied to each name before parsing
        #[serde(default)]
        substitutions: Vec<(String, String)>,
        /// Record the publish/tag date of the winning candidate
        #[serde(default)]
        set_date: bool,
    },
    /// List GitHub branches of a project and match their names
    GithubBranches {
        /// `owner/repo`
        project: String,
        /// Pattern with exactly one capture group, anchored at the branch
        /// name's start
        regex: String,
    },
}
