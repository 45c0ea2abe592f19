//! Error types and error handling for junban.
//!
//! This module defines the crate error type, the error categories used when
//! reporting a failed run, and the CLI exit codes.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Broad classes of failure.
///
/// Configuration errors are detected before the daemon is contacted.
/// Resolution and daemon errors are detected while a container is being
/// processed and halt the remainder of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// The configuration is invalid (parse error, unknown dependency, cycle...).
    Configuration,
    /// An image reference or existing container does not resolve as expected.
    Resolution,
    /// The daemon rejected a request or could not be reached.
    Daemon,
    /// Command output could not be produced.
    Output,
}

impl ErrorCategory {
    /// Returns the category as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::Resolution => "resolution",
            ErrorCategory::Daemon => "daemon",
            ErrorCategory::Output => "output",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// CLI exit codes.
pub mod exit_code {
    /// Success
    pub const SUCCESS: i32 = 0;
    /// General error
    pub const GENERAL_ERROR: i32 = 1;
    /// Configuration error
    pub const CONFIG_ERROR: i32 = 2;
    /// Image or container resolution error
    pub const RESOLUTION_ERROR: i32 = 3;
    /// Daemon error
    pub const DAEMON_ERROR: i32 = 4;
    /// Command line argument error
    pub const CLI_ERROR: i32 = 64;
}

/// The main error type for junban.
#[derive(Debug, Error)]
pub enum JunbanError {
    /// Configuration file is invalid or cannot be loaded.
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Two containers share the same name.
    #[error("Duplicate container name '{name}'")]
    DuplicateName { name: String },

    /// A dependency or mount-from entry names a container that is not configured.
    #[error("Dependency '{target}' for container '{source_name}' does not exist")]
    UnknownDependency { source_name: String, target: String },

    /// A container lists itself as a dependency.
    #[error("Container '{name}' depends on itself")]
    SelfDependency { name: String },

    /// The dependency relation contains at least one cycle.
    #[error("Cycle detected among: {}", participants.join(", "))]
    Cycle { participants: Vec<String> },

    /// The image reference does not resolve to a local image.
    #[error("No such image ({image})")]
    NoSuchImage { image: String },

    /// An existing container was created from a different image.
    #[error(
        "Container '{name}' exists, but is not using the correct image (using: {actual}, expected: {expected})"
    )]
    ImageMismatch {
        name: String,
        actual: String,
        expected: String,
    },

    /// The start phase found no container; the create phase has not run.
    #[error("Container '{name}' not found, did you run `junban create`?")]
    MissingContainer { name: String },

    /// The daemon rejected a request or could not be reached.
    #[error("Daemon error: {message}")]
    Daemon {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl JunbanError {
    /// Returns the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            JunbanError::Config { .. }
            | JunbanError::DuplicateName { .. }
            | JunbanError::UnknownDependency { .. }
            | JunbanError::SelfDependency { .. }
            | JunbanError::Cycle { .. } => ErrorCategory::Configuration,
            JunbanError::NoSuchImage { .. }
            | JunbanError::ImageMismatch { .. }
            | JunbanError::MissingContainer { .. } => ErrorCategory::Resolution,
            JunbanError::Daemon { .. } => ErrorCategory::Daemon,
            JunbanError::Json(_) => ErrorCategory::Output,
        }
    }

    /// Returns the CLI exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Configuration => exit_code::CONFIG_ERROR,
            ErrorCategory::Resolution => exit_code::RESOLUTION_ERROR,
            ErrorCategory::Daemon => exit_code::DAEMON_ERROR,
            ErrorCategory::Output => exit_code::GENERAL_ERROR,
        }
    }

    /// Creates a configuration error with a message.
    pub fn config(message: impl Into<String>) -> Self {
        JunbanError::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a configuration error with a message and source.
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        JunbanError::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a daemon error with a message.
    pub fn daemon(message: impl Into<String>) -> Self {
        JunbanError::Daemon {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a daemon error with a message and source.
    pub fn daemon_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        JunbanError::Daemon {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Result type alias for junban operations.
pub type Result<T> = std::result::Result<T, JunbanError>;
