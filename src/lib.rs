//! flatup - upstream version resolver and manifest updater library
//!
//! This library provides the core functionality for keeping a declarative
//! manifest in sync with its upstream dependencies:
//! - Version discovery (page scraping, GitHub releases/tags, GitHub branches)
//! - Dotted-numeric version comparison and latest-candidate selection
//! - Artifact download with streaming sha256 and a URL-keyed cache
//! - Manifest diffing and template rendering

pub mod checker;
pub mod cli;
pub mod config;
pub mod differ;
pub mod domain;
pub mod error;
pub mod fetcher;
pub mod manifest;
pub mod net;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod render;
pub mod resolver;
