use std::error::Error;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use runm_submit::{mark_done, mark_error, mark_running};

#[derive(Args, Debug)]
pub struct JobArgs {
    /// Run directory holding the status record; defaults to the working
    /// directory the job was launched in.
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,
    #[command(subcommand)]
    pub hook: JobHook,
}

#[derive(Subcommand, Debug)]
pub enum JobHook {
    /// Mark the run as running.
    Start,
    /// Mark the run as done.
    End,
    /// Mark the run as failed.
    Error {
        /// Optional failure detail.
        message: Option<String>,
    },
}

pub fn run(args: &JobArgs) -> Result<(), Box<dyn Error>> {
    let dir = match &args.dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    match &args.hook {
        JobHook::Start => mark_running(&dir)?,
        JobHook::End => mark_done(&dir)?,
        JobHook::Error { message } => mark_error(&dir, message.as_deref())?,
    }
    Ok(())
}
