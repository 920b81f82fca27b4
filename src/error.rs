//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ConfigError: rule file loading and validation
//! - ManifestError: target manifest parsing
//! - CheckError: version discovery failures, recorded per descriptor
//! - FetchError: artifact download and cache I/O
//! - TemplateError: source URL template substitution
//! - RenderError: template directory rendering
//!
//! `HttpError` is the shared transport-level error produced by `net::HttpClient`
//! and wrapped with descriptor context by the consumers.

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Rule file related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Target manifest related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Version discovery errors
    #[error(transparent)]
    Check(#[from] CheckError),

    /// Artifact fetch errors
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// URL template errors
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Template rendering errors
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Rendering aborted while per-descriptor failures were still pending;
    /// the failures ride along so they are never lost to the fatal error
    #[error("{source}; {count} descriptor(s) failed earlier in this run: {details}")]
    RenderWithFailures {
        #[source]
        source: RenderError,
        count: usize,
        details: String,
    },
}

/// Transport-level HTTP errors shared by checkers and the artifact fetcher
#[derive(Error, Debug)]
pub enum HttpError {
    /// Request timed out after all retries
    #[error("timeout while fetching {url}")]
    Timeout { url: String },

    /// Non-success status code
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Rate limit still exceeded after retries
    #[error("rate limit exceeded at {url}")]
    RateLimited { url: String },

    /// Connection-level failure
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// Body could not be decoded as the expected representation
    #[error("invalid response from {url}: {message}")]
    InvalidResponse { url: String, message: String },
}

impl HttpError {
    /// Returns the URL this error refers to
    pub fn url(&self) -> &str {
        match self {
            HttpError::Timeout { url }
            | HttpError::Status { url, .. }
            | HttpError::RateLimited { url }
            | HttpError::Transport { url, .. }
            | HttpError::InvalidResponse { url, .. } => url,
        }
    }
}

/// Errors related to the declarative rule file
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Rule file not found
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    /// Failed to read the rule file
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing error
    #[error("failed to parse config file {path}: {message}")]
    YamlParseError { path: PathBuf, message: String },

    /// A checker regex failed to compile
    #[error("invalid regex for '{name}': {message}")]
    BadRegex { name: String, message: String },

    /// A checker regex has the wrong number of capture groups
    #[error("regex for '{name}' must contain exactly one capture group, found {found}")]
    BadCaptureCount { name: String, found: usize },

    /// Two descriptors share a name
    #[error("duplicate descriptor name '{name}'")]
    DuplicateName { name: String },
}

/// Errors related to the target manifest file
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest file not found
    #[error("manifest file not found: {path}")]
    NotFound { path: PathBuf },

    /// Failed to read the manifest file
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON or YAML parsing error
    #[error("failed to parse manifest {path}: {message}")]
    ParseError { path: PathBuf, message: String },
}

/// Errors produced while discovering candidate versions for one descriptor
#[derive(Error, Debug)]
pub enum CheckError {
    /// The source was unreachable or answered with an error
    #[error("version check for '{name}' failed: {source}")]
    Network {
        name: String,
        #[source]
        source: HttpError,
    },

    /// A scrape source yielded zero regex matches
    #[error("no version match for '{name}' in {url}")]
    NoMatch { name: String, url: String },

    /// Every discovered name was discarded as unparsable
    #[error("no usable version candidates for '{name}'")]
    EmptyCandidates { name: String },
}

impl CheckError {
    /// Wraps a transport error with descriptor context
    pub fn network(name: impl Into<String>, source: HttpError) -> Self {
        CheckError::Network {
            name: name.into(),
            source,
        }
    }

    /// Creates a NoMatch error
    pub fn no_match(name: impl Into<String>, url: impl Into<String>) -> Self {
        CheckError::NoMatch {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Creates an EmptyCandidates error
    pub fn empty_candidates(name: impl Into<String>) -> Self {
        CheckError::EmptyCandidates { name: name.into() }
    }
}

/// Errors produced while downloading and checksumming an artifact
#[derive(Error, Debug)]
pub enum FetchError {
    /// Download failed
    #[error("artifact download failed: {source}")]
    Network {
        #[source]
        source: HttpError,
    },

    /// Cache or scratch file I/O failed
    #[error("artifact I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// Wraps a transport error
    pub fn network(source: HttpError) -> Self {
        FetchError::Network { source }
    }

    /// Creates an Io error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FetchError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors in the source URL template
#[derive(Error, Debug)]
pub enum TemplateError {
    /// Unbalanced braces or an unterminated placeholder
    #[error("malformed URL template '{template}': {message}")]
    Malformed { template: String, message: String },

    /// Placeholder names something other than `version`
    #[error("unknown placeholder '{{{placeholder}}}' in URL template")]
    UnknownPlaceholder { placeholder: String },

    /// Component index past the end of the version
    #[error("version component index {index} out of range for '{version}'")]
    ComponentOutOfRange { index: usize, version: String },
}

impl TemplateError {
    /// Creates a Malformed error
    pub fn malformed(template: impl Into<String>, message: impl Into<String>) -> Self {
        TemplateError::Malformed {
            template: template.into(),
            message: message.into(),
        }
    }
}

/// Errors while rendering the template directory
#[derive(Error, Debug)]
pub enum RenderError {
    /// A template references a variable that was never resolved
    #[error("template {path} references undefined variable '{variable}'")]
    MissingVariable { path: PathBuf, variable: String },

    /// Failed to read a template file
    #[error("failed to read template {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a rendered file
    #[error("failed to write rendered file {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Template directory could not be listed
    #[error("failed to list template directory {path}: {source}")]
    ListError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RenderError {
    /// Creates a MissingVariable error
    pub fn missing_variable(path: impl Into<PathBuf>, variable: impl Into<String>) -> Self {
        RenderError::MissingVariable {
            path: path.into(),
            variable: variable.into(),
        }
    }
}
