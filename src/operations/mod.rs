//! Operations that bring nodes in line with the repository
//!
//! - [`ApplyOperation`]: fix incorrect items, honoring triggers, `unless`
//!   and skip cascading
//! - [`VerifyOperation`]: report incorrect items without changing anything
//!
//! Both work on one node's [`ItemGraph`](crate::items::ItemGraph) through a
//! [`CommandRunner`](crate::node::CommandRunner) and return one
//! [`ItemResult`] per item.

pub mod apply;
pub mod verify;

pub use apply::{ApplyOperation, ApplyOptions};
pub use verify::VerifyOperation;

/// What happened to an item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Already correct
    Ok,
    /// Was incorrect and has been fixed, or an action succeeded
    Fixed,
    /// Could not be fixed, or an action did not meet expectations
    Failed,
    /// Not looked at (triggers, `unless`, cascading, interactive "no")
    Skipped,
}

impl ItemOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemOutcome::Ok => "ok",
            ItemOutcome::Fixed => "fixed",
            ItemOutcome::Failed => "failed",
            ItemOutcome::Skipped => "skipped",
        }
    }
}

/// Result for a single item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemResult {
    pub id: String,
    pub outcome: ItemOutcome,
    /// Keys that were (or would have been) fixed
    pub keys: Vec<String>,
    /// Why the item was skipped or failed
    pub reason: Option<String>,
}

impl ItemResult {
    pub fn new(id: impl Into<String>, outcome: ItemOutcome) -> Self {
        Self {
            id: id.into(),
            outcome,
            keys: Vec::new(),
            reason: None,
        }
    }

    #[must_use]
    pub fn with_keys(mut self, keys: Vec<String>) -> Self {
        self.keys = keys;
        self
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Outcome counts for one node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub ok: usize,
    pub fixed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Summary {
    pub fn from_results(results: &[ItemResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            match result.outcome {
                ItemOutcome::Ok => summary.ok += 1,
                ItemOutcome::Fixed => summary.fixed += 1,
                ItemOutcome::Failed => summary.failed += 1,
                ItemOutcome::Skipped => summary.skipped += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.ok + self.fixed + self.failed + self.skipped
    }
}
