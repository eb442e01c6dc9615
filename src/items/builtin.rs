//! Attributes every item accepts

use serde::Deserialize;
use serde_yaml::Value as YamlValue;

use crate::config::items::ItemAttributes;
use crate::error::Result;

/// Names of the attributes handled by [`BuiltinAttributes`]
pub const BUILTIN_ATTRIBUTES: &[&str] = &[
    "cascade_skip",
    "needed_by",
    "needs",
    "triggered",
    "triggers",
    "unless",
];

/// Dependency and flow control attributes shared by all item types
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuiltinAttributes {
    /// Items (or `type:` for all items of a type) to apply first
    #[serde(default)]
    pub needs: Vec<String>,

    /// Items that need this one
    #[serde(default)]
    pub needed_by: Vec<String>,

    /// Triggered items to run when this item is fixed
    #[serde(default)]
    pub triggers: Vec<String>,

    /// Only run when triggered by another item
    #[serde(default)]
    pub triggered: bool,

    /// Skip the item when this command succeeds
    #[serde(default)]
    pub unless: String,

    #[serde(default)]
    pub cascade_skip: Option<bool>,
}

impl BuiltinAttributes {
    /// Separate builtin attributes from type-specific ones
    pub fn split(attributes: ItemAttributes) -> Result<(Self, ItemAttributes)> {
        let mut builtin = ItemAttributes::new();
        let mut rest = ItemAttributes::new();
        for (key, value) in attributes {
            let is_builtin = key
                .as_str()
                .is_some_and(|k| BUILTIN_ATTRIBUTES.contains(&k));
            if is_builtin {
                builtin.insert(key, value);
            } else {
                rest.insert(key, value);
            }
        }
        let builtin = serde_yaml::from_value(YamlValue::Mapping(builtin)).map_err(|e| {
            crate::error::item::bundle_error(format!("invalid builtin attribute: {e}"))
        })?;
        Ok((builtin, rest))
    }

    /// Whether dependents are skipped when this item is skipped or fails
    ///
    /// Defaults to true unless the item uses `unless` or is `triggered`.
    pub fn cascade_skip(&self) -> bool {
        self.cascade_skip
            .unwrap_or(!(self.triggered || !self.unless.is_empty()))
    }
}
