use std::io;

use clap::{Parser, Subcommand};
use placement_engine::config::AppConfig;
use placement_engine::error::AppError;
use placement_engine::telemetry;
use tracing::debug;

use crate::demo::{run_demo, DemoArgs};
use crate::report::{run_applicants, run_match, ApplicantsArgs, MatchArgs};

#[derive(Parser, Debug)]
#[command(
    name = "placement",
    about = "Score candidates against courses and jobs and run admission workflows",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the open offerings a candidate qualifies for, best match first
    Match(MatchArgs),
    /// Rank verified candidates who qualify for an offering
    Applicants(ApplicantsArgs),
    /// Run an end-to-end matching and admissions demo against in-memory stores
    Demo(DemoArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    debug!(environment = ?config.environment, command = ?cli.command, "placement cli starting");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Command::Match(args) => run_match(&mut out, args, &config.engine),
        Command::Applicants(args) => run_applicants(&mut out, args, &config.engine),
        Command::Demo(args) => run_demo(&mut out, args, &config.engine),
    }
}
