//! Node definitions (nodes.yaml)

use serde::{Deserialize, Serialize};

/// How commands reach a node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Run commands through `ssh <hostname>`
    #[default]
    Ssh,
    /// Run commands on this machine
    Local,
}

/// A node entry from nodes.yaml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeConfig {
    /// Address used to reach the node (defaults to the node name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    #[serde(default)]
    pub transport: Transport,

    /// Prefix remote commands with sudo
    #[serde(default = "default_use_sudo")]
    pub use_sudo: bool,

    /// Bundles assigned directly to this node
    #[serde(default)]
    pub bundles: Vec<String>,

    /// Groups this node declares membership in
    #[serde(default)]
    pub groups: Vec<String>,

    /// Node-level metadata, merged after all group metadata
    #[serde(default)]
    pub metadata: serde_yaml::Mapping,
}

fn default_use_sudo() -> bool {
    true
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            hostname: None,
            transport: Transport::default(),
            use_sudo: default_use_sudo(),
            bundles: Vec::new(),
            groups: Vec::new(),
            metadata: serde_yaml::Mapping::new(),
        }
    }
}
