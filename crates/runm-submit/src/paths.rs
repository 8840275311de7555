use std::path::{Path, PathBuf};

/// Location and identity of one run inside a submission root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    /// Job identifier, the base job name plus the run number for multi-run sweeps.
    pub job_id: String,
    /// Directory owned by the run.
    pub run_path: PathBuf,
    /// Zero-padded 1-based run number.
    pub run_number: String,
    /// Run index, present only when the sweep repeats combinations.
    pub run_index: Option<usize>,
}

/// Maps `(base job name, run index)` pairs to run directories.
#[derive(Debug, Clone)]
pub struct PathPlanner {
    root: PathBuf,
    runs: usize,
    width: usize,
}

impl PathPlanner {
    /// Planner for `runs` repetitions under `root`.
    pub fn new(root: impl Into<PathBuf>, runs: usize) -> Self {
        Self {
            root: root.into(),
            runs,
            width: runs.to_string().len(),
        }
    }

    /// Submission root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Paths for the `index`-th (1-based) run of the combination named `base`.
    pub fn plan(&self, base: &str, index: usize) -> RunPaths {
        let run_number = format!("{index:0width$}", width = self.width);
        let base_path = self.root.join(base);
        if self.runs == 1 {
            RunPaths {
                job_id: base.to_string(),
                run_path: base_path,
                run_number,
                run_index: None,
            }
        } else {
            RunPaths {
                job_id: format!("{base}-{run_number}"),
                run_path: base_path.join(&run_number),
                run_number,
                run_index: Some(index),
            }
        }
    }
}
