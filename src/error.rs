use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the study planner
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error(
        "IO error{}: {source}",
        .path.as_ref().map(|p| format!(" at {}", p.display())).unwrap_or_default()
    )]
    Io {
        source: std::io::Error,
        path: Option<PathBuf>,
    },

    #[error("Schedule validation failed: {message}")]
    Validation { message: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Unknown feedback label: {label}")]
    UnknownFeedback { label: String },

    #[error("Corrupt policy state in {path}: {message}")]
    CorruptPolicy { message: String, path: PathBuf },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),
}

impl PlannerError {
    /// Create a new IO error with path context
    pub fn io_error(err: std::io::Error, path: Option<impl Into<PathBuf>>) -> Self {
        Self::Io {
            source: err,
            path: path.map(|p| p.into()),
        }
    }

    /// Create a new structural validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn unknown_feedback(label: impl Into<String>) -> Self {
        Self::UnknownFeedback {
            label: label.into(),
        }
    }

    /// Create a new corrupt policy error
    pub fn corrupt_policy(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::CorruptPolicy {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Whether the error came from a malformed schedule shape
    pub fn is_validation(&self) -> bool {
        matches!(self, PlannerError::Validation { .. })
    }
}

impl From<std::io::Error> for PlannerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            source: err,
            path: None,
        }
    }
}

impl From<serde_json::Error> for PlannerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for PlannerError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for PlannerError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for PlannerError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;
