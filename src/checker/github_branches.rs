//! GitHub branches checker
//!
//! For projects that keep one long-lived branch per release series, lists the
//! project's branches and extracts versions from branch names with a regex.
//! The pattern must match at the start of the branch name; non-matching
//! branches are discarded.

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;

use crate::checker::VersionChecker;
use crate::config::validate_capture_regex;
use crate::domain::VersionCandidate;
use crate::error::{CheckError, ConfigError};
use crate::net::HttpClient;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

const PER_PAGE: usize = 100;

/// Checker that derives versions from branch names
pub struct GithubBranchesChecker {
    name: String,
    project: String,
    regex: Regex,
    client: HttpClient,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct Branch {
    name: String,
}

impl GithubBranchesChecker {
    /// Create a new branches checker, compiling and validating the regex
    pub fn new(
        name: String,
        project: &str,
        pattern: &str,
        client: HttpClient,
        api_base: &str,
    ) -> Result<Self, ConfigError> {
        let regex = validate_capture_regex(&name, pattern)?;
        Ok(Self {
            name,
            project: project.to_string(),
            regex,
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn list_url(&self) -> String {
        format!(
            "{}/repos/{}/branches?per_page={}",
            self.api_base, self.project, PER_PAGE
        )
    }
}

#[async_trait]
impl VersionChecker for GithubBranchesChecker {
    fn kind(&self) -> &'static str {
        "github_branches"
    }

    async fn check(&self) -> Result<Vec<VersionCandidate>, CheckError> {
        let branches: Vec<Branch> = self
            .client
            .get_json(&self.list_url(), Some(GITHUB_ACCEPT))
            .await
            .map_err(|e| CheckError::network(&self.name, e))?;

        let mut candidates = Vec::new();
        for branch in branches {
            let Some(captures) = self.regex.captures(&branch.name) else {
                continue;
            };
            // the pattern anchors at the start of the branch name
            if captures.get(0).map(|m| m.start()) != Some(0) {
                continue;
            }
            // the capture group may be optional and absent from this match
            let Some(capture) = captures.get(1) else {
                continue;
            };
            if let Some(candidate) = VersionCandidate::parse(capture.as_str()) {
                candidates.push(candidate);
            }
        }

        Ok(candidates)
    }
}
