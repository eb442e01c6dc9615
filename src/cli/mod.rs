//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - listing: nodes and groups listings
//! - inspect: metadata, items and hash of a node
//! - run: ad-hoc commands on nodes
//! - apply: apply and verify
//! - completions: completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod apply;
pub mod completions;
pub mod inspect;
pub mod listing;
pub mod run;

pub use apply::{ApplyArgs, VerifyArgs};
pub use completions::CompletionsArgs;
pub use inspect::{HashArgs, ItemsArgs, MetadataArgs};
pub use listing::{GroupsArgs, NodesArgs};
pub use run::RunArgs;

/// bw - declarative configuration management
///
/// Bring nodes in line with the items, groups and metadata of a repository.
#[derive(Parser, Debug)]
#[command(
    name = "bw",
    author,
    version,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Declarative configuration management for fleets of nodes",
    long_about = "bw reads nodes, groups and bundles of items from a repository of YAML files, \
                  compares every item with the actual state of a node and fixes the differences \
                  by running shell commands locally or over SSH.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  bw nodes --groups                \x1b[90m# List nodes with their groups\x1b[0m\n   \
                  bw metadata web1                 \x1b[90m# Show merged metadata of a node\x1b[0m\n   \
                  bw items web1                    \x1b[90m# List items in apply order\x1b[0m\n   \
                  bw verify webservers             \x1b[90m# Check all nodes of a group\x1b[0m\n   \
                  bw apply web1 --interactive      \x1b[90m# Fix items, asking first\x1b[0m\n   \
                  bw run webservers 'uptime'       \x1b[90m# Run a command on a group\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Repository directory (defaults to current directory)
    #[arg(long, short = 'r', global = true, env = "BW_REPO_PATH", default_value = ".")]
    pub repo: PathBuf,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List nodes
    Nodes(NodesArgs),

    /// List groups
    Groups(GroupsArgs),

    /// Show merged metadata of a node
    Metadata(MetadataArgs),

    /// List items of a node in apply order
    Items(ItemsArgs),

    /// Hash the configured state of a node or item
    Hash(HashArgs),

    /// Run a command on a node or group
    Run(RunArgs),

    /// Check items without fixing them
    Verify(VerifyArgs),

    /// Fix items on a node or group
    Apply(ApplyArgs),

    /// Load the repository and validate every node's items
    Test,

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
