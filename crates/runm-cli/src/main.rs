use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    job::{self, JobArgs},
    resubmit::{self, ResubmitArgs},
    status::{self, StatusArgs},
    submit::{self, SubmitArgs},
};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "runm", about = "Parameter sweep launcher", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Enumerate a sweep and launch one submit command per run.
    Submit(SubmitArgs),
    /// Re-run the submit command for one existing run directory.
    Resubmit(ResubmitArgs),
    /// Summarize run status records below a directory.
    Status(StatusArgs),
    /// Status hooks called from inside a launched job.
    Job(JobArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("runm=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Submit(args) => submit::run(&args),
        Command::Resubmit(args) => resubmit::run(&args),
        Command::Status(args) => status::run(&args),
        Command::Job(args) => job::run(&args),
    }
}
