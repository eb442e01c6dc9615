//! Hash command: BLAKE3 hash of configured state

use std::path::Path;

use crate::cli::HashArgs;
use crate::error::Result;
use crate::hash::{hash_item, hash_items};
use crate::items::ItemGraph;
use crate::repo::Repository;

/// Run hash command
pub fn run(repo_path: &Path, args: &HashArgs) -> Result<()> {
    let repo = Repository::open(repo_path)?;
    println!("{}", node_hash(&repo, &args.node, args.item.as_deref())?);
    Ok(())
}

fn node_hash(repo: &Repository, node_name: &str, item_id: Option<&str>) -> Result<String> {
    let node = repo.get_node(node_name)?;
    let graph = ItemGraph::for_node(repo, &node)?;
    match item_id {
        Some(id) => graph
            .get(id)
            .map(hash_item)
            .ok_or_else(|| crate::error::repo::no_such_item(node_name, id)),
        None => Ok(hash_items(graph.items())),
    }
}
