use std::error::Error;
use std::io;
use std::path::PathBuf;

use clap::Args;
use runm_submit::{load_config, ConfigOverrides, SubmissionEngine};

#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Sweep configuration (JSON with `//` comments, or YAML).
    pub config: PathBuf,
    /// Prepare run directories without launching the submit command.
    #[arg(long)]
    pub dry: bool,
}

pub fn run(args: &SubmitArgs) -> Result<(), Box<dyn Error>> {
    let config = load_config(&args.config, ConfigOverrides { dry: args.dry })?;
    let mut engine = SubmissionEngine::new(config)?;
    let stdout = io::stdout();
    let report = engine.run(&mut stdout.lock())?;
    let failed = report.failures().count();
    if failed > 0 {
        tracing::warn!(failed, total = report.jobs.len(), "some submissions returned nonzero");
    }
    Ok(())
}
