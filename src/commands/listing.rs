//! Nodes and groups listings

use std::path::Path;

use console::Style;

use crate::cli::{GroupsArgs, NodesArgs};
use crate::error::Result;
use crate::repo::Repository;

/// Run nodes command
pub fn run_nodes(repo_path: &Path, args: &NodesArgs) -> Result<()> {
    let repo = Repository::open(repo_path)?;
    for line in node_lines(&repo, args.groups)? {
        println!("{line}");
    }
    Ok(())
}

/// Run groups command
pub fn run_groups(repo_path: &Path, args: &GroupsArgs) -> Result<()> {
    let repo = Repository::open(repo_path)?;
    for line in group_lines(&repo, args.nodes)? {
        println!("{line}");
    }
    Ok(())
}

fn node_lines(repo: &Repository, with_groups: bool) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for name in repo.node_names() {
        if with_groups {
            let node = repo.get_node(&name)?;
            lines.push(format!(
                "{}: {}",
                Style::new().bold().apply_to(&name),
                node.groups.join(", ")
            ));
        } else {
            lines.push(name);
        }
    }
    Ok(lines)
}

fn group_lines(repo: &Repository, with_nodes: bool) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for name in repo.group_names() {
        if with_nodes {
            lines.push(format!(
                "{}: {}",
                Style::new().bold().apply_to(&name),
                repo.group_members(&name)?.join(", ")
            ));
        } else {
            lines.push(name);
        }
    }
    Ok(lines)
}
