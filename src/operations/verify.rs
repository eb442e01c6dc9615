//! Verify operation: report incorrect items without fixing them

use super::{ItemOutcome, ItemResult};
use crate::error::{BwError, Result};
use crate::items::ItemGraph;
use crate::node::CommandRunner;

pub struct VerifyOperation<'a> {
    graph: &'a ItemGraph,
    runner: &'a dyn CommandRunner,
}

impl<'a> VerifyOperation<'a> {
    pub fn new(graph: &'a ItemGraph, runner: &'a dyn CommandRunner) -> Self {
        Self { graph, runner }
    }

    /// Check every item except actions; incorrect items are reported as failed
    pub fn execute(&self) -> Result<Vec<ItemResult>> {
        let mut results = Vec::new();
        for item in self.graph.items() {
            if item.action().is_some() {
                continue;
            }
            let id = item.id();
            let result = match item.status(self.runner) {
                Ok(status) if status.correct() => ItemResult::new(&id, ItemOutcome::Ok),
                Ok(status) => ItemResult::new(&id, ItemOutcome::Failed).with_keys(status.keys),
                Err(e @ BwError::TransportFailed { .. }) => return Err(e),
                Err(e) => ItemResult::new(&id, ItemOutcome::Failed).with_reason(e.to_string()),
            };
            results.push(result);
        }
        Ok(results)
    }
}
