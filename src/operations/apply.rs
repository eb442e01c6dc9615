//! Apply operation: fix incorrect items on a node

use std::collections::HashSet;

use super::{ItemOutcome, ItemResult};
use crate::error::{BwError, Result};
use crate::items::{Action, Item, ItemGraph};
use crate::node::CommandRunner;

/// Reason recorded for items left alone because of `--dry-run`
pub const DRY_RUN_REASON: &str = "dry run";

/// Configuration options for apply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Ask before fixing each item
    pub interactive: bool,
    /// Only report what would be fixed
    pub dry_run: bool,
}

/// Asks the user a yes/no question
pub type Confirm<'c> = dyn FnMut(&str) -> Result<bool> + 'c;

/// Applies one node's items in dependency order
pub struct ApplyOperation<'a> {
    graph: &'a ItemGraph,
    runner: &'a dyn CommandRunner,
    options: ApplyOptions,
}

/// Turn an item error into a failed result; connection problems abort
fn failed(id: &str, err: BwError) -> Result<ItemResult> {
    if matches!(err, BwError::TransportFailed { .. }) {
        return Err(err);
    }
    tracing::warn!(item = id, error = %err, "item failed");
    Ok(ItemResult::new(id, ItemOutcome::Failed).with_reason(err.to_string()))
}

impl<'a> ApplyOperation<'a> {
    pub fn new(graph: &'a ItemGraph, runner: &'a dyn CommandRunner, options: ApplyOptions) -> Self {
        Self {
            graph,
            runner,
            options,
        }
    }

    /// Apply all items, returning one result per item in apply order
    pub fn execute(&self, confirm: &mut Confirm<'_>) -> Result<Vec<ItemResult>> {
        let mut results = Vec::new();
        let mut triggered: HashSet<String> = HashSet::new();
        let mut blocked: HashSet<String> = HashSet::new();

        for item in self.graph.items() {
            let id = item.id();
            let blocking_dep = self
                .graph
                .dependencies(&id)
                .iter()
                .find(|dep| blocked.contains(*dep));

            let result = match blocking_dep {
                Some(dep) => ItemResult::new(&id, ItemOutcome::Skipped)
                    .with_reason(format!("{dep} was skipped or failed")),
                None => self.apply_item(item, &triggered, confirm)?,
            };

            let would_fix = result.reason.as_deref() == Some(DRY_RUN_REASON);
            match result.outcome {
                ItemOutcome::Fixed => triggered.extend(item.builtin.triggers.iter().cloned()),
                ItemOutcome::Skipped if would_fix => {
                    triggered.extend(item.builtin.triggers.iter().cloned());
                }
                ItemOutcome::Failed | ItemOutcome::Skipped if item.builtin.cascade_skip() => {
                    blocked.insert(id.clone());
                }
                _ => {}
            }

            tracing::debug!(node = self.runner.node_name(), item = %id, outcome = result.outcome.as_str(), "item done");
            results.push(result);
        }

        Ok(results)
    }

    fn apply_item(
        &self,
        item: &Item,
        triggered: &HashSet<String>,
        confirm: &mut Confirm<'_>,
    ) -> Result<ItemResult> {
        let id = item.id();

        if item.builtin.triggered && !triggered.contains(&id) {
            return Ok(ItemResult::new(&id, ItemOutcome::Skipped).with_reason("not triggered"));
        }

        if let Some(action) = item.action() {
            return self.run_action(item, action, confirm);
        }

        let status = match item.status(self.runner) {
            Ok(status) => status,
            Err(e) => return failed(&id, e),
        };
        if status.correct() {
            return Ok(ItemResult::new(&id, ItemOutcome::Ok));
        }

        match self.unless_succeeds(item) {
            Ok(true) => {
                return Ok(ItemResult::new(&id, ItemOutcome::Skipped).with_reason("'unless' succeeded"));
            }
            Ok(false) => {}
            Err(e) => return failed(&id, e),
        }

        if self.options.dry_run {
            return Ok(ItemResult::new(&id, ItemOutcome::Skipped)
                .with_keys(status.keys)
                .with_reason(DRY_RUN_REASON));
        }

        if self.options.interactive {
            let question = format!(
                "{}\n{}",
                crate::ui::format_status_diff(&status),
                crate::ui::question(&format!("Fix {id}?"))
            );
            if !confirm(&question)? {
                return Ok(ItemResult::new(&id, ItemOutcome::Skipped)
                    .with_keys(status.keys)
                    .with_reason("declined interactively"));
            }
        }

        if let Err(e) = item.fix(self.runner, &status) {
            return failed(&id, e).map(|r| r.with_keys(status.keys));
        }

        let after = match item.status(self.runner) {
            Ok(after) => after,
            Err(e) => return failed(&id, e),
        };
        if after.correct() {
            Ok(ItemResult::new(&id, ItemOutcome::Fixed).with_keys(status.keys))
        } else {
            Ok(ItemResult::new(&id, ItemOutcome::Failed)
                .with_keys(after.keys)
                .with_reason("still incorrect after fixing"))
        }
    }

    fn run_action(
        &self,
        item: &Item,
        action: &Action,
        confirm: &mut Confirm<'_>,
    ) -> Result<ItemResult> {
        let id = item.id();

        if action.interactive == Some(true) && !self.options.interactive {
            return Ok(ItemResult::new(&id, ItemOutcome::Skipped)
                .with_reason("interactive action in non-interactive mode"));
        }

        match self.unless_succeeds(item) {
            Ok(true) => {
                return Ok(ItemResult::new(&id, ItemOutcome::Skipped).with_reason("'unless' succeeded"));
            }
            Ok(false) => {}
            Err(e) => return failed(&id, e),
        }

        if self.options.dry_run {
            return Ok(ItemResult::new(&id, ItemOutcome::Skipped).with_reason(DRY_RUN_REASON));
        }

        if self.options.interactive && action.interactive != Some(false) {
            let question = format!(
                "  {}\n{}",
                action.command,
                crate::ui::question(&format!("Run action {id}?"))
            );
            if !confirm(&question)? {
                return Ok(ItemResult::new(&id, ItemOutcome::Skipped)
                    .with_reason("declined interactively"));
            }
        }

        tracing::info!(node = self.runner.node_name(), item = %id, "running action");
        match action.run(self.runner) {
            Ok(None) => Ok(ItemResult::new(&id, ItemOutcome::Fixed)),
            Ok(Some(reason)) => Ok(ItemResult::new(&id, ItemOutcome::Failed).with_reason(reason)),
            Err(e) => failed(&id, e),
        }
    }

    fn unless_succeeds(&self, item: &Item) -> Result<bool> {
        if item.builtin.unless.is_empty() {
            return Ok(false);
        }
        Ok(self.runner.run_may_fail(&item.builtin.unless)?.success())
    }
}
