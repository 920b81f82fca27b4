//! Rule file loading and validation
//!
//! The rule file is YAML with an optional `runtime` descriptor plus a list of
//! `modules` descriptors. Loading validates up front that every configured
//! regex compiles and carries exactly one capture group, so a typo fails the
//! run before any network traffic.

use std::collections::HashSet;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::domain::{CheckerSpec, SourceDescriptor};
use crate::error::ConfigError;

/// The declarative rule set driving one run
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateConfig {
    /// Platform/runtime entry; has a version but usually nothing to download
    #[serde(default)]
    pub runtime: Option<SourceDescriptor>,
    /// Dependency modules
    #[serde(default)]
    pub modules: Vec<SourceDescriptor>,
}

impl UpdateConfig {
    /// Load and validate a rule file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;

        let config: UpdateConfig =
            serde_yaml_ng::from_str(&content).map_err(|e| ConfigError::YamlParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// All descriptors for one run: the runtime entry first, then modules
    pub fn descriptors(&self) -> impl Iterator<Item = &SourceDescriptor> {
        self.runtime.iter().chain(self.modules.iter())
    }

    /// Name of the runtime descriptor, if one is configured
    pub fn runtime_name(&self) -> Option<&str> {
        self.runtime.as_ref().map(|r| r.name.as_str())
    }

    /// Validate descriptor names and regexes
    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for descriptor in self.descriptors() {
            if !seen.insert(descriptor.name.as_str()) {
                return Err(ConfigError::DuplicateName {
                    name: descriptor.name.clone(),
                });
            }
            match &descriptor.get_version {
                CheckerSpec::Scrape { regex, .. } | CheckerSpec::GithubBranches { regex, .. } => {
                    validate_capture_regex(&descriptor.name, regex)?;
                }
                CheckerSpec::GithubReleases { .. } => {}
            }
        }
        Ok(())
    }
}

/// Compiles `pattern` and checks it has exactly one capture group
pub fn validate_capture_regex(name: &str, pattern: &str) -> Result<Regex, ConfigError> {
    let regex = Regex::new(pattern).map_err(|e| ConfigError::BadRegex {
        name: name.to_string(),
        message: e.to_string(),
    })?;

    // captures_len counts the implicit whole-match group 0
    let groups = regex.captures_len() - 1;
    if groups != 1 {
        return Err(ConfigError::BadCaptureCount {
            name: name.to_string(),
            found: groups,
        });
    }

    Ok(regex)
}
