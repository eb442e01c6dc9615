//! Items command: list a node's items in apply order

use std::path::Path;

use crate::cli::ItemsArgs;
use crate::error::Result;
use crate::items::{Item, ItemGraph};
use crate::repo::Repository;

/// Run items command
pub fn run(repo_path: &Path, args: &ItemsArgs) -> Result<()> {
    let repo = Repository::open(repo_path)?;
    let node = repo.get_node(&args.node)?;
    let graph = ItemGraph::for_node(&repo, &node)?;
    for id in graph.items().iter().map(Item::id) {
        println!("{id}");
    }
    Ok(())
}
