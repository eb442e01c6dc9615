//! Run command: ad-hoc shell commands on nodes

use std::path::Path;

use console::Style;

use crate::cli::RunArgs;
use crate::error::Result;
use crate::node::RunResult;
use crate::repo::Repository;

/// Run run command
pub fn run(repo_path: &Path, args: &RunArgs) -> Result<()> {
    let repo = Repository::open(repo_path)?;
    for node in repo.resolve_target(&args.target)? {
        let runner = node.runner();
        tracing::info!(node = %node.name, command = %args.command, "running command");
        let result = runner.run_may_fail(&args.command)?;
        for line in output_lines(&node.name, &result) {
            println!("{line}");
        }
    }
    Ok(())
}

/// `<node> (stdout): <line>` and `<node> (stderr): <line>`
fn output_lines(node_name: &str, result: &RunResult) -> Vec<String> {
    let node = Style::new().cyan().apply_to(node_name).to_string();
    let stdout = result
        .stdout
        .lines()
        .map(|line| format!("{node} (stdout): {line}"));
    let stderr = result
        .stderr
        .lines()
        .map(|line| format!("{node} (stderr): {line}"));
    stdout.chain(stderr).collect()
}
