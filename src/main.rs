mod cli;
mod commands;
mod config;
mod paths;
mod progress;
mod state;
#[cfg(test)]
mod testutil;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;
use std::path::PathBuf;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    /// Spec file in use
    pub spec: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        spec: paths::spec_file(cli.spec.as_deref()),
    };
    log::debug!("helmwright {} (verbosity {})", env!("CARGO_PKG_VERSION"), ctx.verbose);

    match cli.command {
        Command::Apply(args) => commands::run::apply(&ctx, &args),
        Command::Diff(args) => commands::run::diff(&ctx, &args),
        Command::Template(args) => commands::run::template(&ctx, &args),
        Command::Destroy => commands::run::destroy(&ctx),
        Command::Build(args) => commands::run::build(&ctx, &args),
        Command::Version => commands::run::version(&ctx),
        Command::Plan => commands::plan::run(&ctx),
        Command::Validate => commands::validate::run(&ctx),
        Command::Cleanup { path } => commands::cleanup::run(&ctx, path.as_deref()),
        Command::Completions { shell } => {
            generate(shell, &mut Cli::command(), "helmwright", &mut io::stdout());
            Ok(())
        }
    }
}
