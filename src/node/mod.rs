//! Nodes: managed systems and how to reach them

pub mod path_info;
pub mod runner;
pub mod shell;

use crate::config::{NodeConfig, Transport};

pub use runner::{CommandRunner, LocalRunner, RunResult, SshRunner};

/// A node with its group memberships resolved
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub hostname: String,
    pub transport: Transport,
    pub use_sudo: bool,
    /// Groups the node belongs to, parents before subgroups
    pub groups: Vec<String>,
    /// Bundles from the node and all its groups, sorted
    pub bundles: Vec<String>,
}

impl Node {
    pub fn new(name: &str, config: &NodeConfig, groups: Vec<String>, bundles: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            hostname: config.hostname.clone().unwrap_or_else(|| name.to_string()),
            transport: config.transport,
            use_sudo: config.use_sudo,
            groups,
            bundles,
        }
    }

    /// Runner for executing commands on this node
    pub fn runner(&self) -> Box<dyn CommandRunner> {
        match self.transport {
            Transport::Local => Box::new(LocalRunner::new(&self.name)),
            Transport::Ssh => Box::new(SshRunner::new(&self.name, &self.hostname, self.use_sudo)),
        }
    }
}
