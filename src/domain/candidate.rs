//! Version candidates discovered by checkers

use chrono::NaiveDate;

use super::Version;

/// One discovered, not-yet-selected version
///
/// `raw` is the string the checker extracted (after any substitutions);
/// `version` is its parsed value. The date is only populated by checkers that
/// can associate a publish or commit date with the winning candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionCandidate {
    /// The version string as discovered
    pub raw: String,
    /// The parsed dotted-numeric value
    pub version: Version,
    /// Publish or tag date, when known
    pub date: Option<NaiveDate>,
}

impl VersionCandidate {
    /// Creates a candidate without a date
    pub fn new(raw: impl Into<String>, version: Version) -> Self {
        Self {
            raw: raw.into(),
            version,
            date: None,
        }
    }

    /// Parses `raw` and builds a candidate, or `None` if it is not a version
    pub fn parse(raw: &str) -> Option<Self> {
        raw.parse::<Version>()
            .ok()
            .map(|version| Self::new(raw, version))
    }
}
