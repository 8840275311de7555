//! Failures of a sweep, from config parsing to status aggregation.
//!
//! Every failure carries an [`ErrorInfo`] so the CLI can print one line that
//! names the offending run directory or parameter and, where one exists, the
//! config key to change.

use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What went wrong and where in the sweep it happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Snake-case code such as `run_dir_exists` or `sequence_step`.
    pub code: String,
    /// Human-readable description of the failure.
    pub message: String,
    /// Locators like `path` or `parameter`, sorted so output is stable.
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Usually the config key or file to fix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates an error with a code and message and no context or hint.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context locator.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Records the run directory, config file or artifact involved.
    pub fn with_path(self, path: impl AsRef<Path>) -> Self {
        let shown = path.as_ref().display().to_string();
        self.with_context("path", shown)
    }

    /// Records the sweep parameter being built or rendered.
    pub fn with_parameter(self, name: impl Into<String>) -> Self {
        self.with_context("parameter", name)
    }

    /// Sets the hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        let mut pairs = self.context.iter();
        if let Some((key, value)) = pairs.next() {
            write!(f, " | context: [{key}={value}")?;
            for (key, value) in pairs {
                write!(f, ", {key}={value}")?;
            }
            f.write_str("]")?;
        }
        match &self.hint {
            Some(hint) => write!(f, " | hint: {hint}"),
            None => Ok(()),
        }
    }
}

/// Error type of every fallible runm operation.
///
/// Serialized as `{"family": .., "detail": ErrorInfo}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum RunmError {
    /// Bad config file or sweep tree. Raised before any run directory exists.
    #[error("configuration error: {0}")]
    Config(ErrorInfo),
    /// A run directory already exists or its parent is blocked.
    #[error("directory error: {0}")]
    Directory(ErrorInfo),
    /// The submit command could not be spawned or its worker was lost.
    #[error("submission error: {0}")]
    Submission(ErrorInfo),
    /// Filesystem failure.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// A `runm_status.json` record is unreadable or holds an unknown state.
    #[error("status error: {0}")]
    Status(ErrorInfo),
    /// Serialization or deserialization failure.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl RunmError {
    /// The error details.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            RunmError::Config(info)
            | RunmError::Directory(info)
            | RunmError::Submission(info)
            | RunmError::Io(info)
            | RunmError::Status(info)
            | RunmError::Serde(info) => info,
        }
    }

    /// The serialized `family` tag, used as a tracing field.
    pub fn family(&self) -> &'static str {
        match self {
            RunmError::Config(_) => "Config",
            RunmError::Directory(_) => "Directory",
            RunmError::Submission(_) => "Submission",
            RunmError::Io(_) => "Io",
            RunmError::Status(_) => "Status",
            RunmError::Serde(_) => "Serde",
        }
    }

    /// Configuration error with the given code and message.
    pub fn config(code: impl Into<String>, message: impl Into<String>) -> Self {
        RunmError::Config(ErrorInfo::new(code, message))
    }

    /// Filesystem failure on `path`, keeping the OS message.
    pub fn io(code: impl Into<String>, path: impl AsRef<Path>, err: impl ToString) -> Self {
        RunmError::Io(ErrorInfo::new(code, err.to_string()).with_path(path))
    }
}
