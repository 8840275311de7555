use std::error::Error;
use std::io;
use std::path::PathBuf;

use clap::Args;
use runm_submit::StatusTracker;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Root of the results tree.
    #[arg(default_value = ".")]
    pub dir: PathBuf,
}

pub fn run(args: &StatusArgs) -> Result<(), Box<dyn Error>> {
    let stdout = io::stdout();
    StatusTracker::new(&args.dir).report(&mut stdout.lock())?;
    Ok(())
}
