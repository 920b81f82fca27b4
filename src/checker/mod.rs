//! Version discovery strategies
//!
//! This module provides:
//! - The `VersionChecker` async trait implemented once per checker kind
//! - Closed dispatch from a descriptor's declared `type` to its checker
//! - scrape, github_releases, and github_branches implementations

mod github_branches;
mod github_releases;
mod scrape;

pub use github_branches::GithubBranchesChecker;
pub use github_releases::GithubReleasesChecker;
pub use scrape::ScrapeChecker;

use async_trait::async_trait;

use crate::domain::{CheckerSpec, SourceDescriptor, VersionCandidate};
use crate::error::{CheckError, ConfigError};
use crate::net::HttpClient;

/// Default base URL for the GitHub REST API
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";

/// Strategy that discovers candidate version strings from an external source
#[async_trait]
pub trait VersionChecker: Send + Sync {
    /// The checker kind label (`scrape`, `github_releases`, `github_branches`)
    fn kind(&self) -> &'static str;

    /// Discover candidate versions
    ///
    /// Returns every parseable candidate; the caller reduces to the winner.
    /// An empty vec means the source answered but nothing parsed.
    async fn check(&self) -> Result<Vec<VersionCandidate>, CheckError>;
}

/// Build the checker for a descriptor's declared kind
///
/// Fails only on invalid checker regexes, which `UpdateConfig::load` has
/// normally rejected already.
pub fn create_checker(
    descriptor: &SourceDescriptor,
    client: HttpClient,
    github_api: &str,
) -> Result<Box<dyn VersionChecker>, ConfigError> {
    let name = descriptor.name.clone();
    match &descriptor.get_version {
        CheckerSpec::Scrape { url, regex } => {
            Ok(Box::new(ScrapeChecker::new(name, url, regex, client)?))
        }
        CheckerSpec::GithubReleases {
            project,
            tags,
            substitutions,
            set_date,
        } => Ok(Box::new(GithubReleasesChecker::new(
            name,
            project,
            *tags,
            substitutions.clone(),
            *set_date,
            client,
            github_api,
        ))),
        CheckerSpec::GithubBranches { project, regex } => Ok(Box::new(
            GithubBranchesChecker::new(name, project, regex, client, github_api)?,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(yaml: &str) -> SourceDescriptor {
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    #[test]
    fn test_create_checker_dispatch() {
        let client = HttpClient::new().unwrap();

        let scrape = descriptor(
            r#"
name: a
get_version:
  type: scrape
  url: https://example.com
  regex: ([0-9.]+)
"#,
        );
        let checker = create_checker(&scrape, client.clone(), DEFAULT_GITHUB_API).unwrap();
        assert_eq!(checker.kind(), "scrape");

        let releases = descriptor(
            r#"
name: b
get_version:
  type: github_releases
  project: o/r
"#,
        );
        let checker = create_checker(&releases, client.clone(), DEFAULT_GITHUB_API).unwrap();
        assert_eq!(checker.kind(), "github_releases");

        let branches = descriptor(
            r#"
name: c
get_version:
  type: github_branches
  project: o/r
  regex: stable-([0-9.]+)
"#,
        );
        let checker = create_checker(&branches, client, DEFAULT_GITHUB_API).unwrap();
        assert_eq!(checker.kind(), "github_branches");
    }

    #[test]
    fn test_create_checker_rejects_bad_regex() {
        let client = HttpClient::new().unwrap();
        let bad = descriptor(
            r#"
name: a
get_version:
  type: scrape
  url: https://example.com
  regex: "(["
"#,
        );
        assert!(create_checker(&bad, client, DEFAULT_GITHUB_API).is_err());
    }
}
