//! Repository configuration files for bw
//!
//! This module contains data structures for:
//! - `nodes.yaml` - Node definitions
//! - `groups.yaml` - Group definitions
//! - `bundles/<name>/items.yaml` - Item definitions per bundle

pub mod group;
pub mod items;
pub mod node;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::Result;

// Re-export commonly used types
pub use group::GroupConfig;
pub use items::BundleItems;
pub use node::{NodeConfig, Transport};

/// Nodes file name
pub const NODES_FILE: &str = "nodes.yaml";

/// Groups file name
pub const GROUPS_FILE: &str = "groups.yaml";

/// Bundles subdirectory
pub const BUNDLES_DIR: &str = "bundles";

/// Items file name inside a bundle directory
pub const ITEMS_FILE: &str = "items.yaml";

/// Read and parse a YAML file, attaching the path to any error
pub fn load_yaml_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .map_err(|e| crate::error::config::read_failed(path.display().to_string(), e.to_string()))?;
    parse_yaml(&content, path)
}

/// Parse YAML content; an empty (or comment-only) document is an empty mapping
fn parse_yaml<T: DeserializeOwned>(content: &str, path: &Path) -> Result<T> {
    let empty = content.trim().is_empty()
        || matches!(
            serde_yaml::from_str::<serde_yaml::Value>(content),
            Ok(serde_yaml::Value::Null)
        );
    let content = if empty { "{}" } else { content };
    serde_yaml::from_str(content)
        .map_err(|e| crate::error::config::parse_failed(path.display().to_string(), e.to_string()))
}

/// Load a name-keyed mapping where entries may be left empty (`name:`)
pub fn load_named_entries<T: DeserializeOwned + Default>(path: &Path) -> Result<BTreeMap<String, T>> {
    let raw: BTreeMap<String, Option<T>> = load_yaml_file(path)?;
    Ok(raw
        .into_iter()
        .map(|(name, entry)| (name, entry.unwrap_or_default()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BwError;
    use crate::test_fixtures::create_temp_dir;

    #[test]
    fn test_load_named_entries_allows_empty_entries() {
        let temp = create_temp_dir();
        let path = temp.path().join(NODES_FILE);
        fs::write(&path, "node1:\nnode2:\n  hostname: 10.0.0.2\n").unwrap();

        let nodes: BTreeMap<String, NodeConfig> = load_named_entries(&path).unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes["node1"].hostname, None);
        assert_eq!(nodes["node2"].hostname.as_deref(), Some("10.0.0.2"));
    }

    #[test]
    fn test_load_empty_file() {
        let temp = create_temp_dir();
        let path = temp.path().join(GROUPS_FILE);
        fs::write(&path, "# no groups yet\n").unwrap();

        let groups: BTreeMap<String, GroupConfig> = load_named_entries(&path).unwrap();
        assert!(groups.is_empty());
    }

    #[test]
    fn test_parse_error_includes_path() {
        let temp = create_temp_dir();
        let path = temp.path().join(NODES_FILE);
        fs::write(&path, "node1: [unclosed\n").unwrap();

        let err = load_named_entries::<NodeConfig>(&path).unwrap_err();
        assert!(matches!(err, BwError::ConfigParseFailed { .. }));
        assert!(err.to_string().contains("nodes.yaml"));
    }

    #[test]
    fn test_missing_file() {
        let temp = create_temp_dir();
        let err = load_named_entries::<NodeConfig>(&temp.path().join(NODES_FILE)).unwrap_err();
        assert!(matches!(err, BwError::ConfigReadFailed { .. }));
    }
}
