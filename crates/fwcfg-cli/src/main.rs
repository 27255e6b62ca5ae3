//! fwcfg CLI
//!
//! Resolves a firmware overlay against its defaults catalog and emits the
//! final configuration.

mod cli;
mod commands;
mod context;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Init => {
            let root = context::project_root(&cli)?;
            commands::run_init(&root)
        }
        Commands::Resolve { format, output } => {
            let project = context::open_project(&cli)?;
            commands::run_resolve(&project, format.map(Into::into), output.as_deref())
        }
        Commands::Check => commands::run_check(&context::open_project(&cli)?),
        Commands::Report { json } => commands::run_report(&context::open_project(&cli)?, *json),
        Commands::Explain { setting, json } => {
            commands::run_explain(&context::open_project(&cli)?, setting, *json)
        }
        Commands::List { groups, json } => {
            commands::run_list(&context::open_project(&cli)?, *groups, *json)
        }
    }
}

/// Log to stderr so emitted headers on stdout stay clean
fn init_tracing(verbose: bool) {
    let result = if verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    };

    if result.is_err() {
        eprintln!("{}: tracing subscriber already set", "warn".yellow());
    }
    tracing::debug!("Verbose mode enabled");
}
