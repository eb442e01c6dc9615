//! Items: single pieces of desired node state
//!
//! Every item type compares a *cdict* (the state configured in the
//! repository) against an *sdict* (the state read from the node). Keys whose
//! values differ are fixed by the item type. A `None` statedict means the
//! item should not exist (cdict) or does not exist (sdict).
//!
//! Item types:
//! - [`pkg_apt`] / [`pkg_yum`]: system packages
//! - [`directories`], [`files`], [`symlinks`]: filesystem entries
//! - [`svc_systemd`]: systemd services
//! - [`actions`]: commands run on the node

pub mod actions;
pub mod builtin;
pub mod directories;
pub mod files;
pub mod graph;
pub mod pkg_apt;
pub mod pkg_yum;
pub mod svc_systemd;
pub mod symlinks;

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::items::ItemAttributes;
use crate::error::{BwError, Result};
use crate::node::CommandRunner;
use crate::repo::Bundle;

pub use actions::Action;
pub use builtin::BuiltinAttributes;
pub use graph::ItemGraph;

/// Configured or actual state of an item
pub type StateDict = BTreeMap<String, Value>;

/// Comparison of configured and actual state
#[derive(Debug, Clone, PartialEq)]
pub struct ItemStatus {
    pub cdict: Option<StateDict>,
    pub sdict: Option<StateDict>,
    /// Keys whose values differ
    pub keys: Vec<String>,
}

impl ItemStatus {
    pub fn new(cdict: Option<StateDict>, sdict: Option<StateDict>) -> Self {
        let keys = diff_keys(cdict.as_ref(), sdict.as_ref());
        Self { cdict, sdict, keys }
    }

    pub fn correct(&self) -> bool {
        self.keys.is_empty()
    }

    /// Whether `key` needs fixing
    pub fn needs(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// Whether the item exists on the node
    pub fn exists(&self) -> bool {
        self.sdict.is_some()
    }
}

/// Keys of `cdict` whose value differs in `sdict`
///
/// An item that exists but should not reports `type`.
pub fn diff_keys(cdict: Option<&StateDict>, sdict: Option<&StateDict>) -> Vec<String> {
    match (cdict, sdict) {
        (None, None) => Vec::new(),
        (None, Some(_)) => vec!["type".to_string()],
        (Some(cdict), sdict) => cdict
            .iter()
            .filter(|(key, value)| sdict.and_then(|s| s.get(*key)) != Some(*value))
            .map(|(key, _)| key.clone())
            .collect(),
    }
}

/// Behavior of one item type
pub trait ItemType: fmt::Debug + Send + Sync {
    /// Type part of the item id, e.g. `pkg_apt`
    fn type_name(&self) -> &'static str;

    /// Configured state; `None` if the item must not exist
    fn cdict(&self) -> Option<StateDict>;

    /// Actual state on the node; `None` if the item does not exist
    fn sdict(&self, runner: &dyn CommandRunner) -> Result<Option<StateDict>>;

    /// Bring the node in line with the configured state
    fn fix(&self, runner: &dyn CommandRunner, status: &ItemStatus) -> Result<()>;

    /// Dependencies every item of this type has
    fn static_needs(&self) -> &'static [&'static str] {
        &[]
    }

    /// Dependencies derived from the other items of the node
    fn auto_deps(&self, _this: &Item, _items: &[Item]) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    /// Actions provided by this item, keyed by action name
    fn canned_actions(&self, _id: &str) -> Vec<(String, ItemAttributes)> {
        Vec::new()
    }

    /// Set for action items, which run instead of being compared
    fn as_action(&self) -> Option<&Action> {
        None
    }
}

/// An item as defined in a bundle
#[derive(Debug)]
pub struct Item {
    pub name: String,
    /// Bundle the item was defined in
    pub bundle: String,
    pub builtin: BuiltinAttributes,
    kind: Box<dyn ItemType>,
}

impl Item {
    pub fn new(
        name: impl Into<String>,
        bundle: impl Into<String>,
        builtin: BuiltinAttributes,
        kind: Box<dyn ItemType>,
    ) -> Self {
        Self {
            name: name.into(),
            bundle: bundle.into(),
            builtin,
            kind,
        }
    }

    /// `<type>:<name>`; canned actions are identified by their name alone
    pub fn id(&self) -> String {
        if self.kind.as_action().is_some() && self.name.contains(':') {
            return self.name.clone();
        }
        format!("{}:{}", self.kind.type_name(), self.name)
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    pub fn kind(&self) -> &dyn ItemType {
        self.kind.as_ref()
    }

    pub fn cdict(&self) -> Option<StateDict> {
        self.kind.cdict()
    }

    /// Read the actual state and compare it with the configured one
    pub fn status(&self, runner: &dyn CommandRunner) -> Result<ItemStatus> {
        let sdict = self.kind.sdict(runner)?;
        Ok(ItemStatus::new(self.kind.cdict(), sdict))
    }

    pub fn fix(&self, runner: &dyn CommandRunner, status: &ItemStatus) -> Result<()> {
        tracing::info!(node = runner.node_name(), item = %self.id(), keys = ?status.keys, "fixing");
        self.kind.fix(runner, status)
    }

    pub fn action(&self) -> Option<&Action> {
        self.kind.as_action()
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Where an item is being defined, for error messages and file lookup
#[derive(Debug, Clone, Copy)]
pub struct ItemContext<'a> {
    pub bundle: &'a Bundle,
    pub type_name: &'a str,
    pub name: &'a str,
}

impl ItemContext<'_> {
    pub fn id(&self) -> String {
        format!("{}:{}", self.type_name, self.name)
    }

    /// Error about this item
    pub fn error(&self, message: impl fmt::Display) -> BwError {
        crate::error::item::bundle_error(format!(
            "{} in bundle '{}': {message}",
            self.id(),
            self.bundle.name
        ))
    }

    /// Deserialize type-specific attributes, rejecting unknown ones
    pub fn parse<T: DeserializeOwned>(&self, attributes: ItemAttributes) -> Result<T> {
        serde_yaml::from_value(serde_yaml::Value::Mapping(attributes))
            .map_err(|e| self.error(format!("invalid attributes: {e}")))
    }
}

/// Sections an `items.yaml` may contain
pub const ITEM_SECTIONS: &[&str] = &[
    actions::SECTION,
    directories::SECTION,
    files::SECTION,
    pkg_apt::SECTION,
    pkg_yum::SECTION,
    svc_systemd::SECTION,
    symlinks::SECTION,
];

/// Build one item from its section, name and attributes
pub fn build_item(
    bundle: &Bundle,
    section: &str,
    name: &str,
    attributes: ItemAttributes,
) -> Result<Item> {
    let (builtin, attributes) = BuiltinAttributes::split(attributes)?;

    macro_rules! build {
        ($module:ident, $ty:ty) => {{
            let ctx = ItemContext {
                bundle,
                type_name: $module::TYPE_NAME,
                name,
            };
            validate_name(&ctx)?;
            Box::new(<$ty>::from_attributes(&ctx, attributes)?) as Box<dyn ItemType>
        }};
    }

    let kind = match section {
        pkg_apt::SECTION => build!(pkg_apt, pkg_apt::PkgApt),
        pkg_yum::SECTION => build!(pkg_yum, pkg_yum::PkgYum),
        directories::SECTION => build!(directories, directories::Directory),
        files::SECTION => build!(files, files::File),
        symlinks::SECTION => build!(symlinks, symlinks::Symlink),
        svc_systemd::SECTION => build!(svc_systemd, svc_systemd::SvcSystemd),
        actions::SECTION => build!(actions, actions::Action),
        other => {
            return Err(crate::error::item::bundle_error(format!(
                "unknown item type '{other}' in bundle '{}'",
                bundle.name
            )));
        }
    };

    let item = Item::new(name, &bundle.name, builtin, kind);
    if item.builtin.triggers.contains(&item.id()) {
        return Err(crate::error::item::bundle_error(format!(
            "item {} in bundle '{}' can't trigger itself",
            item.id(),
            bundle.name
        )));
    }
    Ok(item)
}

fn validate_name(ctx: &ItemContext<'_>) -> Result<()> {
    if ctx.name.contains(':') {
        return Err(crate::error::item::bundle_error(format!(
            "invalid name for {} in bundle '{}': {} (must not contain colon)",
            ctx.type_name, ctx.bundle.name, ctx.name
        )));
    }
    Ok(())
}

/// All items defined in a bundle
pub fn bundle_items(bundle: &Bundle) -> Result<Vec<Item>> {
    bundle
        .items
        .iter()
        .map(|(section, name, attributes)| build_item(bundle, section, name, attributes))
        .collect()
}

/// Check a `mode` attribute and pad it to four digits
pub fn validate_mode(ctx: &ItemContext<'_>, mode: &str) -> Result<String> {
    if mode.is_empty() || !mode.chars().all(|c| c.is_ascii_digit()) {
        return Err(ctx.error(format!("mode should be written as digits, got: '{mode}'")));
    }
    if mode.chars().any(|c| c > '7') {
        return Err(ctx.error(format!("invalid mode: '{mode}'")));
    }
    if mode.len() != 3 && mode.len() != 4 {
        return Err(ctx.error(format!(
            "mode should be three or four digits long, was: '{mode}'"
        )));
    }
    Ok(format!("{mode:0>4}"))
}

/// Check that a path equals its normalized form
pub fn validate_path(ctx: &ItemContext<'_>, path: &str) -> Result<()> {
    let normalized = crate::path_utils::normpath(path);
    if normalized != path {
        return Err(ctx.error(format!(
            "'{path}' is an invalid path, should be '{normalized}'"
        )));
    }
    Ok(())
}

/// Values YAML accepts for `mode`: `755` or `"0755"`
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(untagged)]
pub enum ModeValue {
    Number(u64),
    Text(String),
}

impl ModeValue {
    pub fn as_string(&self) -> String {
        match self {
            ModeValue::Number(n) => n.to_string(),
            ModeValue::Text(s) => s.clone(),
        }
    }
}

/// Insert optional string attributes into a statedict
pub(crate) fn insert_optional(cdict: &mut StateDict, key: &str, value: Option<&String>) {
    if let Some(value) = value {
        cdict.insert(key.to_string(), Value::String(value.clone()));
    }
}

/// `chown` argument for optional owner and group
pub(crate) fn chown_spec(owner: Option<&str>, group: Option<&str>) -> String {
    use crate::node::shell::quote;
    match (owner, group) {
        (Some(owner), Some(group)) => format!("{}:{}", quote(owner), quote(group)),
        (Some(owner), None) => quote(owner),
        (None, Some(group)) => format!(":{}", quote(group)),
        (None, None) => String::new(),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    #![allow(clippy::unwrap_used)]

    use std::path::PathBuf;

    use super::*;
    use crate::config::BundleItems;

    /// Bundle with items parsed from YAML, rooted at `path`
    pub fn bundle_at(name: &str, path: PathBuf, items_yaml: &str) -> Bundle {
        let items: BundleItems = serde_yaml::from_str(if items_yaml.trim().is_empty() {
            "{}"
        } else {
            items_yaml
        })
        .unwrap();
        Bundle {
            name: name.to_string(),
            path,
            items,
        }
    }

    pub fn bundle(name: &str, items_yaml: &str) -> Bundle {
        bundle_at(name, PathBuf::from("/nonexistent").join(name), items_yaml)
    }

    pub fn items(items_yaml: &str) -> Result<Vec<Item>> {
        bundle_items(&bundle("test", items_yaml))
    }

    pub fn item(items_yaml: &str) -> Item {
        items(items_yaml).unwrap().remove(0)
    }
}
