//! Metadata command: print a node's merged metadata as JSON

use std::path::Path;

use console::Style;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::cli::MetadataArgs;
use crate::error::{BwError, Result};
use crate::metadata::Metadata;
use crate::repo::Repository;

/// Run metadata command
pub fn run(repo_path: &Path, args: &MetadataArgs) -> Result<()> {
    let repo = Repository::open(repo_path)?;
    let node = match repo.get_node(&args.node) {
        Ok(node) => node,
        Err(BwError::NoSuchNode { name }) => {
            println!("{} No such node: {name}", Style::new().red().apply_to("!!!"));
            std::process::exit(1);
        }
        Err(e) => return Err(e),
    };

    let metadata = repo.node_metadata(&node)?;
    println!("{}", to_json(&metadata)?);
    Ok(())
}

/// JSON with four spaces of indentation
fn to_json(metadata: &Metadata) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    metadata.serialize(&mut serializer)?;
    String::from_utf8(buf).map_err(|e| crate::error::metadata::invalid(e.to_string()))
}
