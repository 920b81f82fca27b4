//! CLI argument parsing module for flatup

use clap::Parser;
use std::path::PathBuf;

use crate::checker::DEFAULT_GITHUB_API;
use crate::fetcher::FetchOptions;
use crate::orchestrator::{RunOptions, DEFAULT_CONCURRENCY};

/// Upstream version resolver and manifest updater
#[derive(Parser, Debug, Clone)]
#[command(name = "flatup", version, about = "Resolve upstream versions and update manifest templates")]
pub struct CliArgs {
    /// Configuration file with version-check rules
    #[arg(short, long)]
    pub config: PathBuf,

    /// Current manifest recording the versions in use
    #[arg(short, long)]
    pub manifest: PathBuf,

    /// Directory with .j2 templates to render
    #[arg(short, long)]
    pub template_dir: Option<PathBuf>,

    /// Artifact cache directory
    #[arg(long, default_value = ".cache")]
    pub cache_dir: PathBuf,

    /// Disable the artifact cache entirely
    #[arg(long)]
    pub no_cache: bool,

    /// Re-download artifacts even when a cache entry exists
    #[arg(long)]
    pub revalidate_cache: bool,

    /// GitHub API base URL
    #[arg(long, default_value = DEFAULT_GITHUB_API, hide = true)]
    pub github_api: String,

    /// Maximum concurrent network operations
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Report changes without fetching artifacts or writing files
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long)]
    pub quiet: bool,
}

impl CliArgs {
    /// Build run options from the parsed arguments
    pub fn run_options(&self) -> RunOptions {
        let fetch = if self.no_cache {
            FetchOptions {
                cache_dir: None,
                trust_cache: false,
            }
        } else {
            FetchOptions {
                cache_dir: Some(self.cache_dir.clone()),
                trust_cache: !self.revalidate_cache,
            }
        };

        RunOptions {
            config_path: self.config.clone(),
            manifest_path: self.manifest.clone(),
            template_dir: self.template_dir.clone(),
            fetch,
            github_api: self.github_api.clone(),
            concurrency: self.concurrency,
            dry_run: self.dry_run,
        }
    }

    /// Whether progress display should be shown
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.json
    }
}
