//! Item dependency resolution
//!
//! Collects the items of a node, adds canned actions, resolves `needs`,
//! `needed_by`, `triggers`, static and automatic dependencies, and orders
//! everything so dependencies come first.

use std::collections::{BTreeMap, BTreeSet};

use serde_yaml::Value as YamlValue;

use super::{BuiltinAttributes, Item, actions, bundle_items};
use crate::error::{BwError, Result};
use crate::node::Node;
use crate::repo::Repository;
use crate::resolver::sort::{DependencyMap, topological_sort};

/// Items of a node in apply order, with their resolved dependencies
#[derive(Debug)]
pub struct ItemGraph {
    items: Vec<Item>,
    deps: DependencyMap,
}

impl ItemGraph {
    /// Items from all bundles of `node`
    pub fn for_node(repo: &Repository, node: &Node) -> Result<Self> {
        let mut items = Vec::new();
        for name in &node.bundles {
            items.extend(bundle_items(repo.get_bundle(name)?)?);
        }
        Self::new(items)
    }

    pub fn new(items: Vec<Item>) -> Result<Self> {
        let items = with_canned_actions(items)?;
        check_duplicates(&items)?;
        let deps = resolve_dependencies(&items)?;

        let mut ids: Vec<String> = items.iter().map(Item::id).collect();
        ids.sort();
        let order = topological_sort(&deps, &ids)
            .map_err(|chain| crate::error::item::dependency_loop(&chain))?;

        let mut by_id: BTreeMap<String, Item> =
            items.into_iter().map(|item| (item.id(), item)).collect();
        let items = order.iter().filter_map(|id| by_id.remove(id)).collect();

        Ok(Self { items, deps })
    }

    /// Items in apply order
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Resolved dependencies of an item
    pub fn dependencies(&self, id: &str) -> &[String] {
        self.deps.get(id).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Append the canned actions each item provides, as triggered actions
fn with_canned_actions(items: Vec<Item>) -> Result<Vec<Item>> {
    let mut canned = Vec::new();
    for item in &items {
        let id = item.id();
        for (action_name, mut attributes) in item.kind().canned_actions(&id) {
            if !attributes.contains_key("triggered") {
                attributes.insert(YamlValue::from("triggered"), YamlValue::Bool(true));
            }
            let (builtin, attributes) = BuiltinAttributes::split(attributes)?;
            let name = format!("{id}:{action_name}");
            let bundle = crate::repo::Bundle {
                name: item.bundle.clone(),
                path: std::path::PathBuf::new(),
                items: crate::config::BundleItems::default(),
            };
            let ctx = super::ItemContext {
                bundle: &bundle,
                type_name: actions::TYPE_NAME,
                name: &name,
            };
            let action = actions::Action::from_attributes(&ctx, attributes)?;
            canned.push(Item::new(name, &item.bundle, builtin, Box::new(action)));
        }
    }
    let mut items = items;
    items.extend(canned);
    Ok(items)
}

fn check_duplicates(items: &[Item]) -> Result<()> {
    let mut seen: BTreeMap<String, &str> = BTreeMap::new();
    for item in items {
        if let Some(first) = seen.insert(item.id(), &item.bundle) {
            return Err(BwError::DuplicateItem {
                item: item.id(),
                bundle1: first.to_string(),
                bundle2: item.bundle.clone(),
            });
        }
    }
    Ok(())
}

/// Expand a reference to item ids; `type:` selects all items of a type
fn expand(reference: &str, items: &[Item], exclude: &str) -> Option<Vec<String>> {
    if let Some(type_name) = reference.strip_suffix(':') {
        return Some(
            items
                .iter()
                .filter(|item| item.type_name() == type_name)
                .map(Item::id)
                .filter(|id| id != exclude)
                .collect(),
        );
    }
    items
        .iter()
        .any(|item| item.id() == reference)
        .then(|| vec![reference.to_string()])
}

fn missing(item: &Item, dependency: &str) -> BwError {
    BwError::MissingDependency {
        item: item.id(),
        bundle: item.bundle.clone(),
        dependency: dependency.to_string(),
    }
}

/// Reject a dependency that is listed (or implied) more than once
fn check_redundant(item: &Item, references: &[String]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for reference in references {
        if !seen.insert(reference.as_str()) {
            return Err(crate::error::item::redundant_dependency(
                item.id(),
                &item.bundle,
                reference,
            ));
        }
    }
    Ok(())
}

fn resolve_dependencies(items: &[Item]) -> Result<DependencyMap> {
    let mut deps: DependencyMap = items.iter().map(|item| (item.id(), Vec::new())).collect();

    for item in items {
        let id = item.id();

        let mut references: Vec<String> = item
            .kind()
            .static_needs()
            .iter()
            .map(|s| (*s).to_string())
            .collect();
        references.extend(item.builtin.needs.iter().cloned());

        let mut resolved = Vec::new();
        for reference in &references {
            let expanded = expand(reference, items, &id).ok_or_else(|| missing(item, reference))?;
            resolved.extend(expanded);
        }
        let auto_deps = item.kind().auto_deps(item, items)?;
        references.extend(auto_deps.iter().cloned());
        check_redundant(item, &references)?;
        resolved.extend(auto_deps);
        if let Some(entry) = deps.get_mut(&id) {
            entry.extend(resolved);
        }

        for reference in &item.builtin.needed_by {
            let dependents = expand(reference, items, &id).ok_or_else(|| missing(item, reference))?;
            for dependent in dependents {
                if let Some(entry) = deps.get_mut(&dependent) {
                    entry.push(id.clone());
                }
            }
        }

        // triggered items run after the items triggering them
        for target in &item.builtin.triggers {
            let entry = deps.get_mut(target).ok_or_else(|| missing(item, target))?;
            entry.push(id.clone());
        }
    }

    for (id, entry) in &mut deps {
        entry.retain(|dep| dep != id);
        entry.sort();
        entry.dedup();
    }
    Ok(deps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::test_support::{bundle, items};

    fn graph(items_yaml: &str) -> Result<ItemGraph> {
        ItemGraph::new(items(items_yaml)?)
    }

    fn order(graph: &ItemGraph) -> Vec<String> {
        graph.items().iter().map(Item::id).collect()
    }

    #[test]
    fn test_independent_items_by_id() {
        let graph = graph("pkg_apt:\n  vim:\n  htop:\ndirectories:\n  /srv:\n").unwrap();
        assert_eq!(order(&graph), vec!["directory:/srv", "pkg_apt:htop", "pkg_apt:vim"]);
    }

    #[test]
    fn test_needs() {
        let graph = graph("pkg_apt:\n  aaa:\n    needs: ['pkg_apt:zzz']\n  zzz:\n").unwrap();
        assert_eq!(order(&graph), vec!["pkg_apt:zzz", "pkg_apt:aaa"]);
        assert_eq!(graph.dependencies("pkg_apt:aaa"), ["pkg_apt:zzz"]);
    }

    #[test]
    fn test_needs_type_prefix() {
        let graph = graph(
            "directories:\n  /srv:\n    needs: ['pkg_apt:']\npkg_apt:\n  htop:\n  vim:\n",
        )
        .unwrap();
        assert_eq!(
            graph.dependencies("directory:/srv"),
            ["pkg_apt:htop", "pkg_apt:vim"]
        );
        assert_eq!(order(&graph).last().unwrap(), "directory:/srv");
    }

    #[test]
    fn test_needed_by() {
        let graph = graph("pkg_apt:\n  aaa:\n  zzz:\n    needed_by: ['pkg_apt:aaa']\n").unwrap();
        assert_eq!(order(&graph), vec!["pkg_apt:zzz", "pkg_apt:aaa"]);
    }

    #[test]
    fn test_missing_dependency() {
        let err = graph("pkg_apt:\n  htop:\n    needs: ['pkg_apt:vim']\n").unwrap_err();
        assert!(matches!(err, BwError::MissingDependency { .. }));
        assert!(err.to_string().contains("unknown item pkg_apt:vim"));
    }

    #[test]
    fn test_type_prefix_without_items_is_fine() {
        assert!(graph("directories:\n  /srv:\n    needs: ['pkg_yum:']\n").is_ok());
    }

    #[test]
    fn test_dependency_loop() {
        let err = graph(
            "pkg_apt:\n  a:\n    needs: ['pkg_apt:b']\n  b:\n    needs: ['pkg_apt:a']\n",
        )
        .unwrap_err();
        assert!(matches!(err, BwError::DependencyLoop { .. }));
        assert!(err.to_string().contains("pkg_apt:a -> pkg_apt:b -> pkg_apt:a"));
    }

    #[test]
    fn test_duplicate_across_bundles() {
        let mut all = bundle_items(&bundle("one", "pkg_apt:\n  htop:\n")).unwrap();
        all.extend(bundle_items(&bundle("two", "pkg_apt:\n  htop:\n")).unwrap());
        let err = ItemGraph::new(all).unwrap_err();
        assert!(err
            .to_string()
            .contains("Duplicate definition of pkg_apt:htop in bundles 'one' and 'two'"));
    }

    #[test]
    fn test_canned_actions_are_added() {
        let graph = graph("svc_systemd:\n  nginx:\npkg_apt:\n  nginx:\n").unwrap();
        assert_eq!(
            order(&graph),
            vec![
                "pkg_apt:nginx",
                "svc_systemd:nginx",
                "svc_systemd:nginx:reload",
                "svc_systemd:nginx:restart",
            ]
        );
        let reload = graph.get("svc_systemd:nginx:reload").unwrap();
        assert!(reload.builtin.triggered);
        assert!(reload.action().is_some());
        assert_eq!(
            graph.dependencies("svc_systemd:nginx"),
            ["pkg_apt:nginx"]
        );
    }

    #[test]
    fn test_triggered_item_runs_after_trigger() {
        let graph = graph(
            "actions:\n  aaa:\n    command: 'true'\n    triggered: true\nfiles:\n  /etc/x:\n    content: x\n    triggers: ['action:aaa']\n",
        )
        .unwrap();
        assert_eq!(order(&graph), vec!["file:/etc/x", "action:aaa"]);
    }

    #[test]
    fn test_repeated_needs_rejected() {
        let err = graph("pkg_apt:\n  htop:\n  vim:\n    needs: ['pkg_apt:htop', 'pkg_apt:htop']\n")
            .unwrap_err();
        assert!(matches!(err, BwError::RedundantDependency { .. }));
        assert_eq!(
            err.to_string(),
            "Redundant dependency of pkg_apt:vim in bundle 'test' on pkg_apt:htop"
        );
    }

    #[test]
    fn test_needs_repeating_static_dependency_rejected() {
        let err = graph("svc_systemd:\n  nginx:\n    needs: ['pkg_apt:']\n").unwrap_err();
        assert!(err.to_string().contains("svc_systemd:nginx in bundle 'test' on pkg_apt:"));
    }

    #[test]
    fn test_needs_repeating_automatic_dependency_rejected() {
        let err = graph(
            "directories:\n  /etc/app:\nfiles:\n  /etc/app/app.conf:\n    content: x\n    needs: ['directory:/etc/app']\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("file:/etc/app/app.conf in bundle 'test' on directory:/etc/app"));
    }

    #[test]
    fn test_trigger_unknown_item() {
        let err = graph("pkg_apt:\n  htop:\n    triggers: ['action:nope']\n").unwrap_err();
        assert!(matches!(err, BwError::MissingDependency { .. }));
    }
}
