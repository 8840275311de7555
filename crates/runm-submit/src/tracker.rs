use std::fmt::Write as _;
use std::io::Write;
use std::path::{Path, PathBuf};

use runm_core::errors::{ErrorInfo, RunmError};
use walkdir::WalkDir;

use crate::status::{read_status, RunStatus, StatusRecord, STATUS_FILE};

/// Outcome of reading one status record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusReading {
    /// Record parsed into a known status.
    Record(StatusRecord),
    /// Record missing, malformed, or carrying an unknown status.
    Unreadable(String),
}

/// One status-bearing directory found during a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// Directory containing the record.
    pub dir: PathBuf,
    /// What was found there.
    pub reading: StatusReading,
}

impl StatusEntry {
    /// Human readable one-line description of the entry's state.
    pub fn describe(&self) -> String {
        match &self.reading {
            StatusReading::Record(record) => match (record.status, &record.message) {
                (RunStatus::Submitted, _) => "Waiting.".to_string(),
                (RunStatus::Running, _) => "Running.".to_string(),
                (RunStatus::Done, _) => "Successful.".to_string(),
                (RunStatus::Error, Some(message)) => format!("Error: {message}"),
                (RunStatus::Error, None) => "Error.".to_string(),
            },
            StatusReading::Unreadable(_) => "Unable to read status".to_string(),
        }
    }
}

/// Counts per status across a walked tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusSummary {
    /// Records at `SUBMITTED`.
    pub submitted: usize,
    /// Records at `RUNNING`.
    pub running: usize,
    /// Records at `DONE`.
    pub done: usize,
    /// Records at `ERROR`.
    pub error: usize,
    /// Records that could not be classified.
    pub unreadable: usize,
}

impl StatusSummary {
    /// Adds one reading to the counts.
    pub fn record(&mut self, reading: &StatusReading) {
        match reading {
            StatusReading::Record(record) => match record.status {
                RunStatus::Submitted => self.submitted += 1,
                RunStatus::Running => self.running += 1,
                RunStatus::Done => self.done += 1,
                RunStatus::Error => self.error += 1,
            },
            StatusReading::Unreadable(_) => self.unreadable += 1,
        }
    }

    /// Number of status-bearing directories, unreadable ones included.
    pub fn total(&self) -> usize {
        self.submitted + self.running + self.done + self.error + self.unreadable
    }

    /// Share of `count` in the total, or `None` when nothing was found.
    pub fn percent(&self, count: usize) -> Option<f64> {
        match self.total() {
            0 => None,
            total => Some(100.0 * count as f64 / total as f64),
        }
    }

    /// Summary table, or `No runs found.` for an empty tree.
    pub fn render(&self) -> String {
        let total = self.total();
        if total == 0 {
            return "No runs found.\n".to_string();
        }
        let width = total.to_string().len();
        let mut rows = vec![
            ("Successful:", self.done),
            ("Error:", self.error),
            ("Waiting:", self.submitted),
            ("Running:", self.running),
        ];
        if self.unreadable > 0 {
            rows.push(("Unreadable:", self.unreadable));
        }
        let mut out = String::new();
        for (label, count) in rows {
            let percent = format!("({:.0}%)", self.percent(count).unwrap_or_default());
            let _ = writeln!(out, "{label:>11} {count:>width$} {percent:>6}");
        }
        let _ = writeln!(out, "{}", "-".repeat(12 + width + 7));
        let _ = writeln!(out, "{:>11} {total:>width$} (100%)", "Total:");
        out
    }
}

/// Result of walking a results tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusScan {
    /// Status-bearing directories in walk order.
    pub entries: Vec<StatusEntry>,
    /// Aggregated counts.
    pub summary: StatusSummary,
}

/// Walks a results tree and aggregates per-run status records.
#[derive(Debug, Clone)]
pub struct StatusTracker {
    root: PathBuf,
}

impl StatusTracker {
    /// Tracker rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root being walked.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Visits every directory below the root (root included) in file name
    /// order. Unreadable records are counted, never fatal.
    pub fn scan(&self) -> Result<StatusScan, RunmError> {
        if !self.root.is_dir() {
            return Err(RunmError::Io(
                ErrorInfo::new("status_root", "status root is not a directory")
                    .with_path(&self.root),
            ));
        }
        let mut scan = StatusScan::default();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable directory");
                    continue;
                }
            };
            if !entry.file_type().is_dir() || !entry.path().join(STATUS_FILE).exists() {
                continue;
            }
            let reading = match read_status(entry.path()) {
                Ok(record) => StatusReading::Record(record),
                Err(err) => {
                    tracing::warn!(
                        path = %entry.path().display(),
                        family = err.family(),
                        error = %err,
                        "unreadable status record"
                    );
                    StatusReading::Unreadable(err.info().message.clone())
                }
            };
            scan.summary.record(&reading);
            scan.entries.push(StatusEntry {
                dir: entry.into_path(),
                reading,
            });
        }
        Ok(scan)
    }

    /// Scans and prints per-directory lines followed by the summary table.
    pub fn report(&self, out: &mut dyn Write) -> Result<StatusSummary, RunmError> {
        let scan = self.scan()?;
        let write_err = |err: std::io::Error| RunmError::io("status_report", &self.root, err);
        for entry in &scan.entries {
            writeln!(out, "{}", entry.dir.display()).map_err(write_err)?;
            writeln!(out, "{}", entry.describe()).map_err(write_err)?;
            writeln!(out, "---").map_err(write_err)?;
        }
        out.write_all(scan.summary.render().as_bytes())
            .map_err(write_err)?;
        Ok(scan.summary)
    }
}
