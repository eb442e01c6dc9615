//! bw - declarative configuration management
//!
//! Reads nodes, groups and bundles of items from a repository of YAML files,
//! compares every item with the actual state of a node and fixes differences
//! by running shell commands locally or over SSH.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod error;
mod hash;
mod items;
mod metadata;
mod node;
mod operations;
mod path_utils;
mod repo;
mod resolver;
mod ui;

#[cfg(test)]
mod test_fixtures;

use cli::{Cli, Commands};

/// Log to stderr; `RUST_LOG` wins over `--verbose`
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let repo = cli.repo.as_path();
    let result = match &cli.command {
        Commands::Nodes(args) => commands::listing::run_nodes(repo, args),
        Commands::Groups(args) => commands::listing::run_groups(repo, args),
        Commands::Metadata(args) => commands::metadata::run(repo, args),
        Commands::Items(args) => commands::items::run(repo, args),
        Commands::Hash(args) => commands::hash::run(repo, args),
        Commands::Run(args) => commands::run::run(repo, args),
        Commands::Verify(args) => commands::verify::run(repo, args),
        Commands::Apply(args) => commands::apply::run(repo, args),
        Commands::Test => commands::test::run(repo),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
