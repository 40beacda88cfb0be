mod commands;
mod config;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use commands::{build, init, parse, sync, BuildArgs, InitArgs, ParseArgs, SyncArgs};
use tracing_subscriber::EnvFilter;

/// stateweave - keep an aggregate State module in sync with its reducers
#[derive(Parser, Debug)]
#[command(name = "stateweave")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a stateweave.config.json
    Init(InitArgs),

    /// Aggregate one child module into a target module
    Sync(SyncArgs),

    /// Aggregate every child of the project into its target module
    Build(BuildArgs),

    /// Show what a module imports and exports
    Parse(ParseArgs),
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("Cannot get current directory")?;

    match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Sync(args) => sync(args, &cwd),
        Command::Build(args) => build(args, &cwd),
        Command::Parse(args) => parse(args, &cwd),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
