//! Error types and handling for bw
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`repo`]: Repository lookups (nodes, groups, bundles)
//! - [`config`]: Configuration file errors
//! - [`metadata`]: Metadata merging and processors
//! - [`item`]: Item validation and dependency errors
//! - [`node`]: Command execution on nodes
//! - [`fs`]: File system errors

pub mod config;
pub mod fs;
pub mod item;
pub mod metadata;
pub mod node;
pub mod repo;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for bw operations
#[derive(Error, Diagnostic, Debug)]
pub enum BwError {
    // Repository errors
    #[error("No repository found at: {path}")]
    #[diagnostic(
        code(bw::repo::not_found),
        help("Pass --repo or set BW_REPO_PATH to a directory containing nodes.yaml")
    )]
    RepositoryNotFound { path: String },

    #[error("No such node: {name}")]
    #[diagnostic(code(bw::repo::no_such_node))]
    NoSuchNode { name: String },

    #[error("No such group: {name}")]
    #[diagnostic(code(bw::repo::no_such_group))]
    NoSuchGroup { name: String },

    #[error("No such bundle: {name}")]
    #[diagnostic(
        code(bw::repo::no_such_bundle),
        help("Bundles live in bundles/<name>/items.yaml")
    )]
    NoSuchBundle { name: String },

    #[error("No such node or group: {name}")]
    #[diagnostic(code(bw::repo::no_such_target))]
    NoSuchTarget { name: String },

    #[error("No such item on {node}: {item}")]
    #[diagnostic(
        code(bw::repo::no_such_item),
        help("Use `bw items <node>` to list the items of a node")
    )]
    NoSuchItem { node: String, item: String },

    #[error("Group loop detected: {chain}")]
    #[diagnostic(
        code(bw::repo::group_loop),
        help("A group must not be its own (indirect) subgroup")
    )]
    GroupLoop { chain: String },

    // Configuration errors
    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(code(bw::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(bw::config::invalid))]
    ConfigInvalid { message: String },

    #[error("Failed to read configuration file: {path}: {reason}")]
    #[diagnostic(code(bw::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    // Metadata errors
    #[error("Invalid metadata: {message}")]
    #[diagnostic(code(bw::metadata::invalid))]
    MetadataInvalid { message: String },

    #[error("Unknown metadata processor '{name}'")]
    #[diagnostic(
        code(bw::metadata::unknown_processor),
        help("Built-in processors: node_name, group_names, dedup_lists; or use exec:<command>")
    )]
    UnknownMetadataProcessor { name: String },

    #[error("Metadata processor '{name}' failed for node '{node}': {reason}")]
    #[diagnostic(code(bw::metadata::processor_failed))]
    MetadataProcessorFailed {
        name: String,
        node: String,
        reason: String,
    },

    // Item errors
    #[error("{message}")]
    #[diagnostic(code(bw::item::invalid))]
    BundleError { message: String },

    #[error("Duplicate definition of {item} in bundles '{bundle1}' and '{bundle2}'")]
    #[diagnostic(code(bw::item::duplicate))]
    DuplicateItem {
        item: String,
        bundle1: String,
        bundle2: String,
    },

    #[error("{item} in bundle '{bundle}' depends on unknown item {dependency}")]
    #[diagnostic(code(bw::item::missing_dependency))]
    MissingDependency {
        item: String,
        bundle: String,
        dependency: String,
    },

    #[error("Redundant dependency of {item} in bundle '{bundle}' on {dependency}")]
    #[diagnostic(
        code(bw::item::redundant_dependency),
        help("Remove the repeated entry; static and automatic dependencies are added for you")
    )]
    RedundantDependency {
        item: String,
        bundle: String,
        dependency: String,
    },

    #[error("Item dependency loop detected: {chain}")]
    #[diagnostic(
        code(bw::item::dependency_loop),
        help("Check the needs/needed_by attributes of the items involved")
    )]
    DependencyLoop { chain: String },

    #[error("{failed} of {total} items failed")]
    #[diagnostic(code(bw::item::failed))]
    ItemsFailed { failed: usize, total: usize },

    // Node errors
    #[error("Command failed on {node}: {command} (exit code {code}): {stderr}")]
    #[diagnostic(code(bw::node::command_failed))]
    CommandFailed {
        node: String,
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("Failed to reach {node}: {reason}")]
    #[diagnostic(
        code(bw::node::transport_failed),
        help("Check that the node is reachable and ssh is configured")
    )]
    TransportFailed { node: String, reason: String },

    // File system errors
    #[error("Failed to read file: {path}: {reason}")]
    #[diagnostic(code(bw::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(bw::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for BwError {
    fn from(err: std::io::Error) -> Self {
        BwError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for BwError {
    fn from(err: serde_yaml::Error) -> Self {
        BwError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for BwError {
    fn from(err: serde_json::Error) -> Self {
        BwError::MetadataInvalid {
            message: err.to_string(),
        }
    }
}

impl From<regex::Error> for BwError {
    fn from(err: regex::Error) -> Self {
        BwError::ConfigInvalid {
            message: err.to_string(),
        }
    }
}

impl From<inquire::InquireError> for BwError {
    fn from(err: inquire::InquireError) -> Self {
        BwError::IoError {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, BwError>;
