//! Dotted-numeric version values
//!
//! Upstream projects in this domain version themselves as plain sequences of
//! integers separated by dots, with no fixed component count (`2`, `2.1`,
//! `2.1.3.4`). This module provides:
//! - A `Version` type parsing such strings, rejecting anything non-numeric
//! - Component-wise numeric ordering with missing trailing components as `0`
//! - `select_latest` for reducing a candidate set to the winning entry

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::VersionCandidate;

/// A raw string that could not be parsed as a dotted-numeric version
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unparsable version string '{raw}'")]
pub struct VersionParseError {
    /// The offending input
    pub raw: String,
}

/// A dotted-numeric version, e.g. `1.10.3`
///
/// Only integers and dots are allowed; alpha/beta/prerelease suffixes do not
/// parse. Ordering is component-wise and numeric, with a missing trailing
/// component treated as `0`, so `1.2` compares equal to `1.2.0` and `1.10`
/// sorts above `1.9`.
#[derive(Debug, Clone, Eq)]
pub struct Version {
    parts: Vec<u64>,
}

impl Version {
    /// Returns the version components
    pub fn parts(&self) -> &[u64] {
        &self.parts
    }

    /// Returns component `index`, or `None` past the end
    pub fn component(&self, index: usize) -> Option<u64> {
        self.parts.get(index).copied()
    }

    /// Returns the number of components the raw string carried
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Returns true if the version has no components
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.is_empty() {
            return Err(VersionParseError {
                raw: raw.to_string(),
            });
        }

        let parts = raw
            .split('.')
            .map(|p| p.parse::<u64>())
            .collect::<Result<Vec<u64>, _>>()
            .map_err(|_| VersionParseError {
                raw: raw.to_string(),
            })?;

        Ok(Version { parts })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .parts
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{}", joined)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.parts.len().max(other.parts.len());
        for i in 0..len {
            let a = self.parts.get(i).copied().unwrap_or(0);
            let b = other.parts.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Selects the maximum candidate by version ordering
///
/// Ties (equal parsed value, different raw strings) keep the first candidate
/// encountered. Returns `None` for an empty input; callers turn that into a
/// per-descriptor `EmptyCandidates` failure.
pub fn select_latest(candidates: Vec<VersionCandidate>) -> Option<VersionCandidate> {
    let mut best: Option<VersionCandidate> = None;
    for candidate in candidates {
        match &best {
            Some(current) if candidate.version <= current.version => {}
            _ => best = Some(candidate),
        }
    }
    best
}
