//! Command implementations for the bw CLI
//!
//! Every command opens the repository given by `--repo` itself, so commands
//! that do not need one (version, completions) work anywhere.

pub mod apply;
pub mod completions;
pub mod hash;
pub mod items;
pub mod listing;
pub mod metadata;
pub mod run;
pub mod verify;
pub mod version;
