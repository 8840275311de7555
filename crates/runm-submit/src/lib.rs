//! Run planning, bounded-concurrency submission, and status tracking for
//! runm parameter sweeps.

#![deny(missing_docs)]

/// Sweep configuration and its file loader.
pub mod config;
/// Bounded-concurrency submission engine.
pub mod dispatch;
/// Environment contract for launched commands.
pub mod env;
/// Parameter dictionaries and parameter files.
pub mod params;
/// Run directory planning.
pub mod paths;
/// Worker pool with per-job result handles.
pub mod pool;
/// Re-invocation of existing runs.
pub mod resubmit;
/// Config and record (de)serialization helpers.
pub mod serde;
/// Shell invocation and captured artifacts.
pub mod shell;
/// Status records and job hooks.
pub mod status;
/// Tree-wide status aggregation.
pub mod tracker;

pub use config::{load_config, Config, ConfigOverrides, ParametersFormat};
pub use dispatch::{JobOutcome, RunJob, RunState, SubmissionEngine, SubmissionReport};
pub use env::EnvMap;
pub use paths::{PathPlanner, RunPaths};
pub use resubmit::{resubmit, resubmit_with_env};
pub use shell::CommandOutput;
pub use status::{mark_done, mark_error, mark_running, read_status, RunStatus, StatusRecord};
pub use tracker::{StatusEntry, StatusReading, StatusScan, StatusSummary, StatusTracker};
