//! Bounded-concurrency submission of every planned run.
//!
//! Runs are dispatched in enumeration order and their results are drained
//! from a FIFO in that same order, so a slow early job holds back reporting
//! of faster later ones.

use std::collections::VecDeque;
use std::fmt::Display;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use runm_core::errors::{ErrorInfo, RunmError};
use runm_core::rng::SeedGenerator;
use runm_sweep::ParameterAssignment;

use crate::config::Config;
use crate::env::{self, EnvMap, FreshRun};
use crate::params::{merged_parameters, write_parameters};
use crate::paths::{PathPlanner, RunPaths};
use crate::pool::{JobHandle, WorkerPool};
use crate::shell::{clear_submit_artifacts, run_submit_command, CommandOutput};
use crate::status::{write_status, StatusRecord};

/// Identity of one launched unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunJob {
    /// Name derived from the parameter assignment.
    pub base_job_name: String,
    /// 1-based run index, `None` for single-run sweeps.
    pub run_index: Option<usize>,
    /// Zero-padded run number written to the parameter file.
    pub run_number: String,
    /// Job identifier used in reports and `RUNM_RUN_NAME`.
    pub job_id: String,
    /// Absolute run directory.
    pub run_path: PathBuf,
    /// Generated seed.
    pub seed: String,
}

/// Lifecycle of a run inside one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Directory and artifacts prepared; final state of a dry run.
    DirCreated,
    /// Handed to the worker pool.
    Dispatched,
    /// Submit command exited with zero.
    ResultOk,
    /// Submit command exited with the given nonzero code.
    ResultNonzero(i32),
}

/// Final state of one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    /// The run.
    pub job: RunJob,
    /// Where it ended up.
    pub state: RunState,
}

/// Everything one submission did, in submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReport {
    /// Submission root directory.
    pub root: PathBuf,
    /// Per-run outcomes.
    pub jobs: Vec<JobOutcome>,
}

impl SubmissionReport {
    /// Outcomes whose submit command exited nonzero.
    pub fn failures(&self) -> impl Iterator<Item = &JobOutcome> {
        self.jobs
            .iter()
            .filter(|outcome| matches!(outcome.state, RunState::ResultNonzero(_)))
    }
}

type PendingJob = (usize, JobHandle<Result<CommandOutput, RunmError>>);

/// Plans, prepares, and dispatches every run of a sweep.
pub struct SubmissionEngine<R = OsRng> {
    config: Config,
    seeds: SeedGenerator<R>,
    base_env: EnvMap,
    pool: WorkerPool,
}

impl SubmissionEngine<OsRng> {
    /// Engine seeded from the operating system.
    pub fn new(config: Config) -> Result<Self, RunmError> {
        Self::with_seed_source(config, SeedGenerator::os())
    }
}

impl<R: RngCore + CryptoRng> SubmissionEngine<R> {
    /// Engine drawing seeds from `seeds`. Validates the config and spins up
    /// the worker pool.
    pub fn with_seed_source(config: Config, seeds: SeedGenerator<R>) -> Result<Self, RunmError> {
        config.validate()?;
        let pool = WorkerPool::new(config.thread_count)?;
        Ok(Self {
            config,
            seeds,
            base_env: env::inherited(),
            pool,
        })
    }

    /// Replaces the inherited environment every job starts from.
    pub fn with_base_env(mut self, base_env: EnvMap) -> Self {
        self.base_env = base_env;
        self
    }

    /// Configuration being submitted.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Submits into a fresh root derived from the config and the current time.
    pub fn run(&mut self, out: &mut dyn Write) -> Result<SubmissionReport, RunmError> {
        let root = self.config.root_dir(Local::now())?;
        self.submit_into(&root, out)
    }

    /// Submits every run below `root`, printing the report to `out`.
    ///
    /// Fails on the first directory that cannot be created; runs already
    /// handed to the pool keep going but are no longer reported.
    pub fn submit_into(
        &mut self,
        root: &Path,
        out: &mut dyn Write,
    ) -> Result<SubmissionReport, RunmError> {
        let planner = PathPlanner::new(root, self.config.runs);
        tracing::info!(
            name = %self.config.name,
            root = %root.display(),
            dry = self.config.dry,
            threads = self.pool.size(),
            "starting submission"
        );

        let mut jobs = Vec::new();
        let mut pending: VecDeque<PendingJob> = VecDeque::new();
        let sweep = self.config.sweep.clone();
        for assignment in sweep.enumerate() {
            let base = assignment.job_name();
            for index in 1..=self.config.runs {
                let paths = planner.plan(&base, index);
                self.create_run_dir(&paths.run_path)?;
                let job = self.prepare(&base, paths, &assignment)?;
                emit(out, root, format_args!("Submitting job {}...", job.job_id))?;
                let state = if self.config.dry {
                    RunState::DirCreated
                } else {
                    pending.push_back((jobs.len(), self.dispatch(&job, &assignment)));
                    RunState::Dispatched
                };
                jobs.push(JobOutcome { job, state });
            }
        }

        emit(out, root, "---")?;
        emit(out, root, "Waiting for submission to complete...")?;
        emit(out, root, "---")?;
        while let Some((slot, handle)) = pending.pop_front() {
            let output = handle.wait()??;
            let outcome = &mut jobs[slot];
            emit(out, root, format_args!("Completed submission {}", outcome.job.job_id))?;
            outcome.state = if output.success() {
                RunState::ResultOk
            } else {
                tracing::warn!(
                    job = %outcome.job.job_id,
                    code = output.exit_code,
                    "submit command failed"
                );
                emit(
                    out,
                    root,
                    format_args!("ERROR: submission returned nonzero code {}", output.exit_code),
                )?;
                RunState::ResultNonzero(output.exit_code)
            };
            for captured in [&output.stdout, &output.stderr] {
                if !captured.is_empty() {
                    out.write_all(captured).map_err(|err| report_error(root, err))?;
                    if !captured.ends_with(b"\n") {
                        emit(out, root, "")?;
                    }
                }
            }
            emit(out, root, "---")?;
        }
        emit(out, root, "Submission complete.")?;
        tracing::info!(jobs = jobs.len(), "submission complete");

        Ok(SubmissionReport {
            root: root.to_path_buf(),
            jobs,
        })
    }

    fn create_run_dir(&self, run_path: &Path) -> Result<(), RunmError> {
        let directory_error = |err: std::io::Error| {
            RunmError::Directory(
                ErrorInfo::new("run_directory", err.to_string())
                    .with_path(run_path)
                    .with_hint("remove the directory or set useExistingDirectories"),
            )
        };
        if let Some(parent) = run_path.parent() {
            fs::create_dir_all(parent).map_err(directory_error)?;
        }
        match fs::create_dir(run_path) {
            Ok(()) => Ok(()),
            Err(err)
                if err.kind() == ErrorKind::AlreadyExists
                    && self.config.use_existing_directories =>
            {
                tracing::warn!(path = %run_path.display(), "reusing existing run directory");
                // Artifacts of an earlier attempt would misreport this one.
                clear_submit_artifacts(run_path)
            }
            Err(err) => Err(directory_error(err)),
        }
    }

    /// Seed, parameter file, and `SUBMITTED` record for a created directory.
    fn prepare(
        &mut self,
        base: &str,
        paths: RunPaths,
        assignment: &ParameterAssignment,
    ) -> Result<RunJob, RunmError> {
        let seed = self.seeds.generate(self.config.random_seed_bits)?;
        let params = merged_parameters(&self.config, assignment, &paths.run_number, &seed);
        write_parameters(
            &paths.run_path.join(&self.config.parameters_filename),
            self.config.parameters_format,
            &params,
        )?;
        write_status(&paths.run_path, &StatusRecord::submitted())?;
        Ok(RunJob {
            base_job_name: base.to_string(),
            run_index: paths.run_index,
            run_number: paths.run_number,
            job_id: paths.job_id,
            run_path: paths.run_path,
            seed,
        })
    }

    fn dispatch(
        &self,
        job: &RunJob,
        assignment: &ParameterAssignment,
    ) -> JobHandle<Result<CommandOutput, RunmError>> {
        let env = env::fresh_submission(
            &self.base_env,
            &self.config,
            FreshRun {
                job_id: &job.job_id,
                run_path: &job.run_path,
                run_number: job.run_index.map(|_| job.run_number.as_str()),
                seed: &job.seed,
                assignment,
            },
        );
        let command = self.config.submit_command.clone().unwrap_or_default();
        let run_path = job.run_path.clone();
        tracing::debug!(job = %job.job_id, "dispatching submit command");
        self.pool
            .submit(move || run_submit_command(&command, &run_path, &env))
    }
}

fn report_error(root: &Path, err: std::io::Error) -> RunmError {
    RunmError::io("report_write", root, err)
}

fn emit(out: &mut dyn Write, root: &Path, line: impl Display) -> Result<(), RunmError> {
    writeln!(out, "{line}").map_err(|err| report_error(root, err))
}
