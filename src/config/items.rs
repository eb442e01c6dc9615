//! Bundle item definitions (bundles/<name>/items.yaml)
//!
//! The file maps an item section (e.g. `pkg_apt`, `directories`) to a
//! mapping of item names to attribute mappings:
//!
//! ```yaml
//! pkg_apt:
//!   nginx: {}
//!   telnet:
//!     installed: false
//! directories:
//!   /var/www:
//!     mode: "0755"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Attributes of a single item as written by the user
pub type ItemAttributes = serde_yaml::Mapping;

/// Parsed items.yaml of one bundle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BundleItems {
    pub sections: BTreeMap<String, BTreeMap<String, Option<ItemAttributes>>>,
}

impl BundleItems {
    /// Load items.yaml; a bundle without one has no items
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        super::load_yaml_file(path)
    }

    /// Iterate over `(section, name, attributes)`, sorted by section and name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, ItemAttributes)> + '_ {
        self.sections.iter().flat_map(|(section, items)| {
            items.iter().map(move |(name, attributes)| {
                (
                    section.as_str(),
                    name.as_str(),
                    attributes.clone().unwrap_or_default(),
                )
            })
        })
    }
}
