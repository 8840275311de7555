use std::error::Error;
use std::io;
use std::path::PathBuf;

use clap::Args;
use runm_submit::{load_config, resubmit, ConfigOverrides};

#[derive(Args, Debug)]
pub struct ResubmitArgs {
    /// Sweep configuration the run was created from.
    pub config: PathBuf,
    /// Existing run directory to re-invoke.
    pub run_dir: PathBuf,
}

pub fn run(args: &ResubmitArgs) -> Result<(), Box<dyn Error>> {
    let config = load_config(&args.config, ConfigOverrides::default())?;
    let stdout = io::stdout();
    resubmit(&config, &args.run_dir, &mut stdout.lock())?;
    Ok(())
}
