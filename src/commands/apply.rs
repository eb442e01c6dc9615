//! Apply command: fix items on a node or every node of a group

use std::path::Path;

use crate::cli::ApplyArgs;
use crate::error::{BwError, Result};
use crate::items::ItemGraph;
use crate::node::Node;
use crate::operations::{ApplyOperation, ApplyOptions, ItemResult, Summary};
use crate::repo::Repository;
use crate::ui::{self, ProgressReporter, SilentProgressReporter};

/// Run apply command
pub fn run(repo_path: &Path, args: &ApplyArgs) -> Result<()> {
    let repo = Repository::open(repo_path)?;
    let nodes = repo.resolve_target(&args.target)?;
    let options = ApplyOptions {
        interactive: args.interactive,
        dry_run: args.dry_run,
    };

    // prompts and a progress bar do not mix
    let mut progress: Box<dyn ProgressReporter> = if options.interactive {
        Box::new(SilentProgressReporter)
    } else {
        ui::progress_reporter(nodes.len())
    };

    let totals = for_each_node(&nodes, progress.as_mut(), |node| {
        apply_node(&repo, node, options)
    });
    progress.finish();
    totals.into_result()
}

fn apply_node(repo: &Repository, node: &Node, options: ApplyOptions) -> Result<Vec<ItemResult>> {
    let graph = ItemGraph::for_node(repo, node)?;
    let runner = node.runner();
    tracing::info!(node = %node.name, items = graph.items().len(), "applying");
    let mut confirm = |question: &str| ui::confirm(question);
    ApplyOperation::new(&graph, runner.as_ref(), options).execute(&mut confirm)
}

/// Failed and total item counts over all nodes
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Totals {
    pub failed: usize,
    pub total: usize,
    /// Nodes that could not be processed at all
    pub failed_nodes: usize,
}

impl Totals {
    pub(crate) fn into_result(self) -> Result<()> {
        if self.failed > 0 || self.failed_nodes > 0 {
            return Err(BwError::ItemsFailed {
                failed: self.failed + self.failed_nodes,
                total: self.total + self.failed_nodes,
            });
        }
        Ok(())
    }
}

/// Run `work` for every node, printing results and a summary per node
///
/// A node that fails as a whole (unreachable, invalid items) is reported and
/// the remaining nodes are still processed.
pub(crate) fn for_each_node<F>(nodes: &[Node], progress: &mut dyn ProgressReporter, mut work: F) -> Totals
where
    F: FnMut(&Node) -> Result<Vec<ItemResult>>,
{
    let mut totals = Totals::default();
    for node in nodes {
        progress.start_node(&node.name);
        match work(node) {
            Ok(results) => {
                for result in &results {
                    progress.println(&ui::format_result(&node.name, result));
                }
                let summary = Summary::from_results(&results);
                progress.println(&ui::format_summary(&node.name, &summary));
                totals.failed += summary.failed;
                totals.total += summary.total();
            }
            Err(e) => {
                tracing::error!(node = %node.name, error = %e, "node failed");
                progress.println(&format!(
                    "{} {}: {e}",
                    console::Style::new().red().apply_to("!!!"),
                    node.name
                ));
                totals.failed_nodes += 1;
            }
        }
        progress.finish_node();
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NodeConfig;
    use crate::operations::ItemOutcome;

    fn node(name: &str) -> Node {
        Node::new(name, &NodeConfig::default(), Vec::new(), Vec::new())
    }

    #[test]
    fn test_for_each_node_counts() {
        let nodes = vec![node("a"), node("b"), node("c")];
        let mut progress = SilentProgressReporter;
        let totals = for_each_node(&nodes, &mut progress, |node| match node.name.as_str() {
            "a" => Ok(vec![
                ItemResult::new("pkg_apt:x", ItemOutcome::Ok),
                ItemResult::new("pkg_apt:y", ItemOutcome::Failed),
            ]),
            "b" => Err(crate::error::repo::no_such_bundle("gone")),
            _ => Ok(vec![ItemResult::new("pkg_apt:x", ItemOutcome::Fixed)]),
        });
        assert_eq!(
            totals,
            Totals {
                failed: 1,
                total: 3,
                failed_nodes: 1
            }
        );
        let err = totals.into_result().unwrap_err();
        assert_eq!(err.to_string(), "2 of 4 items failed");
    }

    #[test]
    fn test_all_good_is_ok() {
        let nodes = vec![node("a")];
        let mut progress = SilentProgressReporter;
        let totals = for_each_node(&nodes, &mut progress, |_| {
            Ok(vec![ItemResult::new("pkg_apt:x", ItemOutcome::Skipped)])
        });
        assert!(totals.into_result().is_ok());
    }
}
