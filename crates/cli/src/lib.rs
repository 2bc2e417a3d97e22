//! `jtl` command line: run transformations and inspect the instruction set.

pub mod commands;
pub mod util;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::commands::instructions::InstructionsArgs;
use crate::commands::transform::TransformArgs;
use crate::util::CliResult;

#[derive(Parser, Debug)]
#[command(name = "jtl", version, about = "Transform JSON documents with JTL programs")]
pub struct Cli {
    /// Raise log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a transformation program over an input document.
    Transform(TransformArgs),
    /// List the instructions of the built-in language.
    Instructions(InstructionsArgs),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub fn run() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = match &cli.command {
        Command::Transform(args) => commands::transform::run(args, &mut io::stdin().lock())?,
        Command::Instructions(args) => commands::instructions::run(args)?,
    };

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{output}")?;
    Ok(())
}

/// The line printed to stderr when a command fails, independent of logging.
pub fn error_report(error: &anyhow::Error) -> String {
    format!("jtl: {error:#}")
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).try_init();
}
