//! Repository management for bw
//!
//! This module handles:
//! - Loading nodes, groups and bundles from a repository directory
//! - Validating references between them
//! - Resolving nodes with their groups, bundles and metadata
//!
//! ## Repository Structure
//!
//! ```text
//! <repo>/
//! ├── nodes.yaml          # Node definitions
//! ├── groups.yaml         # Group definitions (optional)
//! └── bundles/
//!     └── <bundle>/
//!         ├── items.yaml  # Item definitions
//!         └── files/      # Sources for file items
//! ```

pub mod membership;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::{
    self, BUNDLES_DIR, BundleItems, GROUPS_FILE, GroupConfig, ITEMS_FILE, NODES_FILE, NodeConfig,
};
use crate::error::{BwError, Result};
use crate::metadata::{self, Metadata, ProcessorRegistry};
use crate::node::Node;

pub use membership::Membership;

/// A bundle: a named set of item definitions
#[derive(Debug, Clone)]
pub struct Bundle {
    pub name: String,
    /// Directory of the bundle inside the repository
    pub path: PathBuf,
    pub items: BundleItems,
}

impl Bundle {
    /// Directory holding sources for file items
    pub fn files_dir(&self) -> PathBuf {
        self.path.join("files")
    }
}

/// A loaded and validated repository
#[derive(Debug)]
pub struct Repository {
    pub nodes: BTreeMap<String, NodeConfig>,
    pub groups: BTreeMap<String, GroupConfig>,
    pub bundles: BTreeMap<String, Bundle>,
    membership: Membership,
    processors: ProcessorRegistry,
}

impl Repository {
    /// Detect if a repository exists at the given path
    pub fn exists(path: &Path) -> bool {
        path.join(NODES_FILE).is_file()
    }

    /// Open and validate the repository at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if !Self::exists(path) {
            return Err(BwError::RepositoryNotFound {
                path: path.display().to_string(),
            });
        }

        let nodes: BTreeMap<String, NodeConfig> = config::load_named_entries(&path.join(NODES_FILE))?;

        let groups_path = path.join(GROUPS_FILE);
        let groups: BTreeMap<String, GroupConfig> = if groups_path.exists() {
            config::load_named_entries(&groups_path)?
        } else {
            BTreeMap::new()
        };

        let bundles = Self::load_bundles(&path.join(BUNDLES_DIR))?;

        Self::from_parts(nodes, groups, bundles)
    }

    /// Build a repository from already loaded parts
    pub fn from_parts(
        nodes: BTreeMap<String, NodeConfig>,
        groups: BTreeMap<String, GroupConfig>,
        bundles: BTreeMap<String, Bundle>,
    ) -> Result<Self> {
        validate_references(&nodes, &groups, &bundles)?;
        let membership = Membership::resolve(&nodes, &groups)?;
        tracing::debug!(
            nodes = nodes.len(),
            groups = groups.len(),
            bundles = bundles.len(),
            "repository loaded"
        );

        Ok(Self {
            nodes,
            groups,
            bundles,
            membership,
            processors: ProcessorRegistry::with_builtins(),
        })
    }

    /// Load every `bundles/<name>/` directory
    fn load_bundles(bundles_dir: &Path) -> Result<BTreeMap<String, Bundle>> {
        let mut bundles = BTreeMap::new();
        if !bundles_dir.is_dir() {
            return Ok(bundles);
        }

        for entry in WalkDir::new(bundles_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| BwError::IoError {
                message: e.to_string(),
            })?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }
            let items = BundleItems::load(&entry.path().join(ITEMS_FILE))?;
            bundles.insert(
                name.clone(),
                Bundle {
                    name,
                    path: entry.path().to_path_buf(),
                    items,
                },
            );
        }
        Ok(bundles)
    }

    /// Replace the metadata processor registry
    #[cfg(test)]
    pub fn set_processors(&mut self, processors: ProcessorRegistry) {
        self.processors = processors;
    }

    pub fn node_names(&self) -> Vec<String> {
        self.nodes.keys().cloned().collect()
    }

    pub fn group_names(&self) -> Vec<String> {
        self.groups.keys().cloned().collect()
    }

    /// Resolve a node by name
    pub fn get_node(&self, name: &str) -> Result<Node> {
        let config = self
            .nodes
            .get(name)
            .ok_or_else(|| crate::error::repo::no_such_node(name))?;

        let groups = self.membership.groups_of(name);

        let mut bundles = config.bundles.clone();
        for group in &groups {
            bundles.extend(self.groups[group].bundles.iter().cloned());
        }
        bundles.sort();
        bundles.dedup();

        Ok(Node::new(name, config, groups, bundles))
    }

    pub fn get_group(&self, name: &str) -> Result<&GroupConfig> {
        self.groups
            .get(name)
            .ok_or_else(|| crate::error::repo::no_such_group(name))
    }

    /// Member node names of a group, sorted
    pub fn group_members(&self, name: &str) -> Result<Vec<String>> {
        self.get_group(name)?;
        Ok(self.membership.members_of(name))
    }

    pub fn get_bundle(&self, name: &str) -> Result<&Bundle> {
        self.bundles
            .get(name)
            .ok_or_else(|| crate::error::repo::no_such_bundle(name))
    }

    /// Resolve a target to nodes: a node name first, then a group name
    pub fn resolve_target(&self, target: &str) -> Result<Vec<Node>> {
        if self.nodes.contains_key(target) {
            return Ok(vec![self.get_node(target)?]);
        }
        if self.groups.contains_key(target) {
            return self
                .membership
                .members_of(target)
                .iter()
                .map(|name| self.get_node(name))
                .collect();
        }
        Err(BwError::NoSuchTarget {
            name: target.to_string(),
        })
    }

    /// Merged and processed metadata of a node
    pub fn node_metadata(&self, node: &Node) -> Result<Metadata> {
        let node_config = self
            .nodes
            .get(&node.name)
            .ok_or_else(|| crate::error::repo::no_such_node(&node.name))?;

        let layers = node
            .groups
            .iter()
            .map(|group| &self.groups[group].metadata)
            .chain(std::iter::once(&node_config.metadata));
        let merged = metadata::merge_layers(layers)?;

        let references = node.groups.iter().flat_map(|group| {
            self.groups[group]
                .metadata_processors
                .iter()
                .map(String::as_str)
        });
        self.processors
            .run_all(references, &node.name, &node.groups, merged)
    }
}

/// Check that every referenced node, group and bundle exists
fn validate_references(
    nodes: &BTreeMap<String, NodeConfig>,
    groups: &BTreeMap<String, GroupConfig>,
    bundles: &BTreeMap<String, Bundle>,
) -> Result<()> {
    let check_bundles = |names: &[String]| -> Result<()> {
        for name in names {
            if !bundles.contains_key(name) {
                return Err(crate::error::repo::no_such_bundle(name));
            }
        }
        Ok(())
    };

    for (group_name, group) in groups {
        for member in &group.members {
            if !nodes.contains_key(member) {
                return Err(crate::error::config::invalid(
                    format!("group '{group_name}' lists unknown member '{member}'"),
                ));
            }
        }
        for subgroup in &group.subgroups {
            if !groups.contains_key(subgroup) {
                return Err(crate::error::config::invalid(
                    format!("group '{group_name}' lists unknown subgroup '{subgroup}'"),
                ));
            }
        }
        check_bundles(&group.bundles)?;
    }

    for (node_name, node) in nodes {
        for group in &node.groups {
            if !groups.contains_key(group) {
                return Err(crate::error::config::invalid(
                    format!("node '{node_name}' lists unknown group '{group}'"),
                ));
            }
        }
        check_bundles(&node.bundles)?;
    }

    Ok(())
}
