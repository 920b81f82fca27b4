//! Update orchestrator for coordinating the entire workflow
//!
//! This module provides:
//! - Workflow coordination: load config + manifest → check → diff → fetch → render
//! - Concurrent fan-out of version checks, one task per descriptor
//! - Lazy artifact fetches: only changed modules are downloaded
//! - Error handling with partial continuation: one descriptor's failure never
//!   cancels its siblings; all failures are collected and reported together
//!   after the join

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::checker::{create_checker, DEFAULT_GITHUB_API};
use crate::config::UpdateConfig;
use crate::differ;
use crate::domain::{select_latest, ResolvedDependency, VersionCandidate};
use crate::error::{AppError, CheckError};
use crate::fetcher::{ArtifactFetcher, FetchOptions};
use crate::manifest::ManifestState;
use crate::net::HttpClient;
use crate::progress::Progress;
use crate::render;
use crate::resolver;

/// Default number of concurrent network tasks
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Configuration for one orchestrator run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Rule file path
    pub config_path: PathBuf,
    /// Target manifest path
    pub manifest_path: PathBuf,
    /// Directory of `*.j2` templates; `None` skips rendering
    pub template_dir: Option<PathBuf>,
    /// Artifact fetch behavior
    pub fetch: FetchOptions,
    /// GitHub API base URL
    pub github_api: String,
    /// Concurrency cap for network tasks
    pub concurrency: usize,
    /// Report changes without fetching artifacts or writing files
    pub dry_run: bool,
}

impl RunOptions {
    /// Options with defaults for everything beyond the three paths
    pub fn new(config_path: PathBuf, manifest_path: PathBuf, template_dir: Option<PathBuf>) -> Self {
        Self {
            config_path,
            manifest_path,
            template_dir,
            fetch: FetchOptions::default(),
            github_api: DEFAULT_GITHUB_API.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            dry_run: false,
        }
    }
}

/// One descriptor's recorded failure
#[derive(Debug, Clone, Serialize)]
pub struct DescriptorFailure {
    /// Descriptor name
    pub name: String,
    /// Human-readable cause
    pub message: String,
}

/// Outcome of one orchestrator run
#[derive(Debug, Serialize)]
pub struct RunReport {
    /// Successfully resolved dependencies, in rule-file order
    pub resolved: Vec<ResolvedDependency>,
    /// Versions currently recorded in the manifest
    pub current: BTreeMap<String, String>,
    /// Names whose version changed
    pub changed: BTreeSet<String>,
    /// Rendered output files
    pub rendered: Vec<PathBuf>,
    /// Per-descriptor failures, surfaced together after the join
    pub failures: Vec<DescriptorFailure>,
    /// Non-fatal warnings (e.g. cache write problems)
    pub warnings: Vec<String>,
    /// Whether this was a dry run
    pub dry_run: bool,
}

impl RunReport {
    /// True when every descriptor resolved
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// True when at least one dependency changed
    pub fn has_changes(&self) -> bool {
        !self.changed.is_empty()
    }
}

/// Attach pending descriptor failures to a fatal render error
fn render_error_with_failures(
    error: crate::error::RenderError,
    failures: &[DescriptorFailure],
) -> AppError {
    if failures.is_empty() {
        return AppError::Render(error);
    }
    let details = failures
        .iter()
        .map(|f| format!("{}: {}", f.name, f.message))
        .collect::<Vec<_>>()
        .join("; ");
    AppError::RenderWithFailures {
        source: error,
        count: failures.len(),
        details,
    }
}

/// Orchestrator driving the whole update workflow
pub struct Orchestrator {
    options: RunOptions,
    client: HttpClient,
}

impl Orchestrator {
    /// Create a new orchestrator with a default HTTP client
    pub fn new(options: RunOptions) -> Result<Self, AppError> {
        let client = HttpClient::new().map_err(|e| {
            AppError::Fetch(crate::error::FetchError::network(e))
        })?;
        Ok(Self { options, client })
    }

    /// Create an orchestrator with a custom HTTP client (for testing)
    pub fn with_client(options: RunOptions, client: HttpClient) -> Self {
        Self { options, client }
    }

    /// Run the workflow
    pub async fn run(&self, show_progress: bool) -> Result<RunReport, AppError> {
        let mut progress = Progress::new(show_progress);

        progress.spinner("Loading configuration...");
        let config = UpdateConfig::load(&self.options.config_path)?;
        let manifest = ManifestState::load(&self.options.manifest_path, config.runtime_name())?;
        progress.finish_and_clear();

        let mut failures = Vec::new();
        let mut warnings = Vec::new();

        // fan out one check task per descriptor, fan in when all are done
        let check_results = self
            .check_all(&config, &mut progress, &mut failures)
            .await?;

        let mut candidates: BTreeMap<String, VersionCandidate> = BTreeMap::new();
        for (name, result) in check_results {
            match result {
                Ok(all) => match select_latest(all) {
                    Some(winner) => {
                        candidates.insert(name, winner);
                    }
                    None => failures.push(DescriptorFailure {
                        message: CheckError::empty_candidates(&name).to_string(),
                        name,
                    }),
                },
                Err(e) => failures.push(DescriptorFailure {
                    name,
                    message: e.to_string(),
                }),
            }
        }

        let changed = differ::diff(&manifest, &candidates);

        let fetched = if self.options.dry_run {
            BTreeMap::new()
        } else {
            self.fetch_changed(&config, &candidates, &changed, &mut progress, &mut failures, &mut warnings)
                .await?
        };

        // assemble resolved facts in rule-file order
        let mut resolved = Vec::new();
        for descriptor in config.descriptors() {
            let Some(candidate) = candidates.get(&descriptor.name) else {
                continue;
            };
            let mut dependency =
                ResolvedDependency::new(&descriptor.name, candidate.version.to_string());
            dependency.version_date = candidate.date.map(|d| d.format("%Y-%m-%d").to_string());

            if let Some(template) = &descriptor.source_url {
                dependency.source_url = Some(resolver::resolve(template, &candidate.version)?);
            }

            dependency.sha256 = match fetched.get(&descriptor.name) {
                Some(sha256) => Some(sha256.clone()),
                None if !changed.contains(&descriptor.name) => {
                    manifest.sha256(&descriptor.name).map(str::to_string)
                }
                None => None,
            };

            resolved.push(dependency);
        }

        let rendered = if changed.is_empty() || self.options.dry_run {
            Vec::new()
        } else if let Some(template_dir) = &self.options.template_dir {
            progress.spinner("Rendering templates...");
            let variables: BTreeMap<String, String> = resolved
                .iter()
                .flat_map(|dep| dep.template_vars())
                .collect();
            // a failed descriptor contributes no variables; its failure must
            // survive a fatal render error, so fold the pending failures in
            let written = render::render_dir(template_dir, &variables)
                .map_err(|e| render_error_with_failures(e, &failures))?;
            progress.finish_and_clear();
            written
        } else {
            Vec::new()
        };

        let current = candidates
            .keys()
            .filter_map(|name| {
                manifest
                    .version(name)
                    .map(|v| (name.clone(), v.to_string()))
            })
            .collect();

        Ok(RunReport {
            resolved,
            current,
            changed,
            rendered,
            failures,
            warnings,
            dry_run: self.options.dry_run,
        })
    }

    /// Run every descriptor's checker concurrently and join all results
    async fn check_all(
        &self,
        config: &UpdateConfig,
        progress: &mut Progress,
        failures: &mut Vec<DescriptorFailure>,
    ) -> Result<Vec<(String, Result<Vec<VersionCandidate>, CheckError>)>, AppError> {
        let descriptors: Vec<_> = config.descriptors().cloned().collect();
        progress.start(descriptors.len() as u64, "Checking versions");

        let semaphore = Arc::new(Semaphore::new(self.options.concurrency.max(1)));
        let mut tasks: JoinSet<(String, Result<Vec<VersionCandidate>, CheckError>)> =
            JoinSet::new();

        for descriptor in descriptors {
            let checker =
                match create_checker(&descriptor, self.client.clone(), &self.options.github_api) {
                    Ok(checker) => checker,
                    Err(e) => {
                        failures.push(DescriptorFailure {
                            name: descriptor.name.clone(),
                            message: e.to_string(),
                        });
                        progress.inc();
                        continue;
                    }
                };
            let name = descriptor.name.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.unwrap();
                let result = checker.check().await;
                (name, result)
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(pair) => results.push(pair),
                Err(e) => failures.push(DescriptorFailure {
                    name: "<task>".to_string(),
                    message: format!("check task failed: {}", e),
                }),
            }
            progress.inc();
        }
        progress.finish_and_clear();

        Ok(results)
    }

    /// Fetch artifacts for the changed modules concurrently
    ///
    /// Unchanged modules are skipped entirely; their recorded checksum is
    /// reused by the caller.
    async fn fetch_changed(
        &self,
        config: &UpdateConfig,
        candidates: &BTreeMap<String, VersionCandidate>,
        changed: &BTreeSet<String>,
        progress: &mut Progress,
        failures: &mut Vec<DescriptorFailure>,
        warnings: &mut Vec<String>,
    ) -> Result<BTreeMap<String, String>, AppError> {
        // resolve URLs up front; a broken URL template is fatal
        let mut to_fetch = Vec::new();
        for descriptor in config.descriptors() {
            if !changed.contains(&descriptor.name) {
                continue;
            }
            let (Some(template), Some(candidate)) =
                (&descriptor.source_url, candidates.get(&descriptor.name))
            else {
                continue;
            };
            let url = resolver::resolve(template, &candidate.version)?;
            to_fetch.push((descriptor.name.clone(), url));
        }

        if to_fetch.is_empty() {
            return Ok(BTreeMap::new());
        }

        progress.start(to_fetch.len() as u64, "Fetching artifacts");
        let semaphore = Arc::new(Semaphore::new(self.options.concurrency.max(1)));
        let mut tasks: JoinSet<(
            String,
            Result<crate::fetcher::FetchedArtifact, crate::error::FetchError>,
        )> = JoinSet::new();

        for (name, url) in to_fetch {
            let fetcher = ArtifactFetcher::new(self.client.clone(), self.options.fetch.clone());
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.unwrap();
                let result = fetcher.fetch(&url).await;
                (name, result)
            });
        }

        let mut checksums = BTreeMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((name, Ok(artifact))) => {
                    if let Some(warning) = artifact.cache_warning {
                        warnings.push(format!("{}: {}", name, warning));
                    }
                    checksums.insert(name, artifact.sha256);
                }
                Ok((name, Err(e))) => failures.push(DescriptorFailure {
                    name,
                    message: e.to_string(),
                }),
                Err(e) => failures.push(DescriptorFailure {
                    name: "<task>".to_string(),
                    message: format!("fetch task failed: {}", e),
                }),
            }
            progress.inc();
        }
        progress.finish_and_clear();

        Ok(checksums)
    }
}
