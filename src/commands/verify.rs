//! Verify command: check items without fixing them

use std::path::Path;

use super::apply::for_each_node;
use crate::cli::VerifyArgs;
use crate::error::Result;
use crate::items::ItemGraph;
use crate::operations::VerifyOperation;
use crate::repo::Repository;
use crate::ui;

/// Run verify command
pub fn run(repo_path: &Path, args: &VerifyArgs) -> Result<()> {
    let repo = Repository::open(repo_path)?;
    let nodes = repo.resolve_target(&args.target)?;
    let mut progress = ui::progress_reporter(nodes.len());

    let totals = for_each_node(&nodes, progress.as_mut(), |node| {
        let graph = ItemGraph::for_node(&repo, node)?;
        let runner = node.runner();
        VerifyOperation::new(&graph, runner.as_ref()).execute()
    });
    progress.finish();
    totals.into_result()
}
