//! On-disk status records and the job-side hooks that advance them.
//!
//! The orchestrator only ever writes `SUBMITTED`. `RUNNING`, `DONE`, and
//! `ERROR` come exclusively from the launched job calling the hooks, so a
//! submit command that fails before reaching them leaves the record at
//! `SUBMITTED` for good; callers own that follow-up.

use std::fmt;
use std::fs;
use std::path::Path;

use runm_core::errors::{ErrorInfo, RunmError};
use serde::{Deserialize, Serialize};

use crate::serde::{from_json_slice, write_json_atomic};

/// File name of the status record inside a run directory.
pub const STATUS_FILE: &str = "runm_status.json";

/// Lifecycle state recorded for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    /// Written by the orchestrator when the run is handed to the submit command.
    Submitted,
    /// Job started.
    Running,
    /// Job finished successfully.
    Done,
    /// Job reported a failure.
    Error,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RunStatus::Submitted => "SUBMITTED",
            RunStatus::Running => "RUNNING",
            RunStatus::Done => "DONE",
            RunStatus::Error => "ERROR",
        })
    }
}

/// Contents of `runm_status.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    /// Current state.
    pub status: RunStatus,
    /// Optional failure detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StatusRecord {
    /// Record written at submission time.
    pub fn submitted() -> Self {
        Self::plain(RunStatus::Submitted)
    }

    /// Record written when a job starts.
    pub fn running() -> Self {
        Self::plain(RunStatus::Running)
    }

    /// Record written when a job ends cleanly.
    pub fn done() -> Self {
        Self::plain(RunStatus::Done)
    }

    /// Record written when a job fails.
    pub fn error(message: Option<String>) -> Self {
        Self {
            status: RunStatus::Error,
            message,
        }
    }

    fn plain(status: RunStatus) -> Self {
        Self {
            status,
            message: None,
        }
    }
}

/// Replaces the status record in `dir`.
pub fn write_status(dir: &Path, record: &StatusRecord) -> Result<(), RunmError> {
    write_json_atomic(&dir.join(STATUS_FILE), record)
}

/// Reads and classifies the status record in `dir`.
pub fn read_status(dir: &Path) -> Result<StatusRecord, RunmError> {
    let path = dir.join(STATUS_FILE);
    let status_error = |code: &str, err: String| {
        RunmError::Status(ErrorInfo::new(code, err).with_path(&path))
    };
    let bytes = fs::read(&path).map_err(|err| status_error("status_read", err.to_string()))?;
    from_json_slice(&bytes).map_err(|err| status_error("status_parse", err.info().message.clone()))
}

/// Hook: the job in `dir` has started.
pub fn mark_running(dir: &Path) -> Result<(), RunmError> {
    write_status(dir, &StatusRecord::running())
}

/// Hook: the job in `dir` has finished.
pub fn mark_done(dir: &Path) -> Result<(), RunmError> {
    write_status(dir, &StatusRecord::done())
}

/// Hook: the job in `dir` has failed, optionally with a message.
pub fn mark_error(dir: &Path, message: Option<&str>) -> Result<(), RunmError> {
    write_status(dir, &StatusRecord::error(message.map(str::to_string)))
}
