//! Core domain models for flatup
//!
//! This module contains the fundamental types used throughout the application:
//! - Dotted-numeric version values and candidate selection
//! - Source descriptors as loaded from the rule file
//! - Discovered version candidates
//! - Resolved dependency facts and their template variables

mod candidate;
mod descriptor;
mod resolved;
mod version;

pub use candidate::VersionCandidate;
pub use descriptor::{CheckerSpec, SourceDescriptor};
pub use resolved::ResolvedDependency;
pub use version::{select_latest, Version, VersionParseError};
