//! GitHub releases/tags checker
//!
//! Lists a project's releases (or tags, when `tags: true`) via the GitHub
//! REST API. Each name passes through the configured ordered substitutions
//! before the dotted-numeric parse; names that still fail to parse are
//! discarded, not fatal. With `set_date: true` the publish date is attached
//! to the winning candidate only — for releases it is `published_at`, for
//! tags it requires following the tag's commit URL, which is why losers are
//! never looked up.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

use crate::checker::VersionChecker;
use crate::domain::VersionCandidate;
use crate::error::{CheckError, HttpError};
use crate::net::HttpClient;

/// Accept header for the GitHub REST API
const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Page size for list endpoints
const PER_PAGE: usize = 100;

/// Checker that lists GitHub releases or tags
pub struct GithubReleasesChecker {
    name: String,
    project: String,
    tags: bool,
    substitutions: Vec<(String, String)>,
    set_date: bool,
    client: HttpClient,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct Release {
    name: Option<String>,
    tag_name: Option<String>,
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Tag {
    name: String,
    commit: TagCommit,
}

#[derive(Debug, Deserialize)]
struct TagCommit {
    url: String,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    commit: CommitInfo,
}

#[derive(Debug, Deserialize)]
struct CommitInfo {
    committer: Option<CommitSignature>,
}

#[derive(Debug, Deserialize)]
struct CommitSignature {
    date: String,
}

/// Applies ordered literal replace-all substitutions to a discovered name
pub fn apply_substitutions(name: &str, substitutions: &[(String, String)]) -> String {
    let mut result = name.to_string();
    for (from, to) in substitutions {
        result = result.replace(from.as_str(), to.as_str());
    }
    result
}

fn parse_github_date(timestamp: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(timestamp)
        .ok()
        .map(|dt| dt.date_naive())
}

impl GithubReleasesChecker {
    /// Create a new releases/tags checker
    pub fn new(
        name: String,
        project: &str,
        tags: bool,
        substitutions: Vec<(String, String)>,
        set_date: bool,
        client: HttpClient,
        api_base: &str,
    ) -> Self {
        Self {
            name,
            project: project.to_string(),
            tags,
            substitutions,
            set_date,
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    fn list_url(&self) -> String {
        let endpoint = if self.tags { "tags" } else { "releases" };
        format!(
            "{}/repos/{}/{}?per_page={}",
            self.api_base, self.project, endpoint, PER_PAGE
        )
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, CheckError> {
        self.client
            .get_json(url, Some(GITHUB_ACCEPT))
            .await
            .map_err(|e| CheckError::network(&self.name, e))
    }

    /// Index of the winning candidate, keeping the first on ties
    fn winner_index(candidates: &[VersionCandidate]) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, candidate) in candidates.iter().enumerate() {
            match best {
                Some(b) if candidate.version <= candidates[b].version => {}
                _ => best = Some(i),
            }
        }
        best
    }

    async fn check_releases(&self) -> Result<Vec<VersionCandidate>, CheckError> {
        let releases: Vec<Release> = self.get_json(&self.list_url()).await?;

        let mut candidates = Vec::new();
        let mut dates = Vec::new();
        for release in releases {
            let raw_name = match release.name.filter(|n| !n.is_empty()).or(release.tag_name) {
                Some(n) => n,
                None => continue,
            };
            let substituted = apply_substitutions(&raw_name, &self.substitutions);
            if let Some(candidate) = VersionCandidate::parse(&substituted) {
                candidates.push(candidate);
                dates.push(release.published_at);
            }
        }

        if self.set_date {
            if let Some(winner) = Self::winner_index(&candidates) {
                if let Some(date) = dates[winner].as_deref().and_then(parse_github_date) {
                    candidates[winner].date = Some(date);
                }
            }
        }

        Ok(candidates)
    }

    async fn check_tags(&self) -> Result<Vec<VersionCandidate>, CheckError> {
        let tags: Vec<Tag> = self.get_json(&self.list_url()).await?;

        let mut candidates = Vec::new();
        let mut commit_urls = Vec::new();
        for tag in tags {
            let substituted = apply_substitutions(&tag.name, &self.substitutions);
            if let Some(candidate) = VersionCandidate::parse(&substituted) {
                candidates.push(candidate);
                commit_urls.push(tag.commit.url);
            }
        }

        if self.set_date {
            if let Some(winner) = Self::winner_index(&candidates) {
                let detail: CommitDetail = self.get_json(&commit_urls[winner]).await?;
                let date = detail
                    .commit
                    .committer
                    .map(|c| c.date)
                    .as_deref()
                    .and_then(parse_github_date)
                    .ok_or_else(|| {
                        CheckError::network(
                            &self.name,
                            HttpError::InvalidResponse {
                                url: commit_urls[winner].clone(),
                                message: "commit has no committer date".to_string(),
                            },
                        )
                    })?;
                candidates[winner].date = Some(date);
            }
        }

        Ok(candidates)
    }
}

#[async_trait]
impl VersionChecker for GithubReleasesChecker {
    fn kind(&self) -> &'static str {
        "github_releases"
    }

    async fn check(&self) -> Result<Vec<VersionCandidate>, CheckError> {
        if self.tags {
            self.check_tags().await
        } else {
            self.check_releases().await
        }
    }
}
