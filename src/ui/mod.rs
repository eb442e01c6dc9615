//! UI/Progress presentation layer
//!
//! This module handles:
//! - Progress reporting across nodes for apply and verify
//! - Formatting of item results, summaries and status diffs ([`display`])
//! - Interactive confirmation prompts
//!
//! All progress reporting goes through the ProgressReporter trait, so a
//! single-node run or a non-terminal stdout can use a silent reporter.

pub mod display;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::Result;

pub use display::{format_result, format_status_diff, format_summary};

/// Progress reporter trait for runs across several nodes
pub trait ProgressReporter {
    /// Show which node is being worked on
    fn start_node(&mut self, node_name: &str);

    /// Mark the current node as done
    fn finish_node(&mut self);

    /// Print a line without tearing the progress bar
    fn println(&self, line: &str);

    /// Finish all progress
    fn finish(&mut self);
}

/// Progress bar over nodes
pub struct InteractiveProgressReporter {
    node_pb: ProgressBar,
}

impl InteractiveProgressReporter {
    pub fn new(total_nodes: u64) -> Self {
        let style = ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");

        let node_pb = ProgressBar::new(total_nodes);
        node_pb.set_style(style);
        Self { node_pb }
    }
}

impl ProgressReporter for InteractiveProgressReporter {
    fn start_node(&mut self, node_name: &str) {
        self.node_pb.set_message(node_name.to_string());
    }

    fn finish_node(&mut self) {
        self.node_pb.inc(1);
    }

    fn println(&self, line: &str) {
        self.node_pb.println(line);
    }

    fn finish(&mut self) {
        self.node_pb.finish_and_clear();
    }
}

/// Progress reporter that only prints lines
#[derive(Default)]
pub struct SilentProgressReporter;

impl ProgressReporter for SilentProgressReporter {
    fn start_node(&mut self, _node_name: &str) {}

    fn finish_node(&mut self) {}

    fn println(&self, line: &str) {
        println!("{line}");
    }

    fn finish(&mut self) {}
}

/// Reporter for `total_nodes` nodes: a bar only when there are several
pub fn progress_reporter(total_nodes: usize) -> Box<dyn ProgressReporter> {
    if total_nodes > 1 && console::Term::stdout().is_term() {
        Box::new(InteractiveProgressReporter::new(total_nodes as u64))
    } else {
        Box::new(SilentProgressReporter)
    }
}

/// Highlighted question text
pub fn question(text: &str) -> String {
    Style::new().bold().apply_to(text).to_string()
}

/// Ask a yes/no question on the terminal
pub fn confirm(question: &str) -> Result<bool> {
    println!("{question}");
    let answer = inquire::Confirm::new("Proceed?")
        .with_default(true)
        .with_help_message("Press Enter to confirm, or 'n' to skip")
        .prompt()?;
    Ok(answer)
}
