//! Group membership and hierarchy
//!
//! Membership is computed for every node up front: direct members come from
//! `members`, `member_patterns` and the node's own `groups` list; subgroups
//! then pass their members up to every group containing them.

use std::collections::{BTreeMap, BTreeSet};

use regex::Regex;

use crate::config::{GroupConfig, NodeConfig};
use crate::error::Result;
use crate::resolver::sort::{DependencyMap, sorted_topological_sort, topological_sort};

/// Resolved group memberships of a repository
#[derive(Debug, Clone, Default)]
pub struct Membership {
    /// group -> member node names
    members: BTreeMap<String, BTreeSet<String>>,
    /// group -> groups listing it as subgroup
    parents: DependencyMap,
}

impl Membership {
    /// Resolve memberships; groups and nodes must already be validated
    pub fn resolve(
        nodes: &BTreeMap<String, NodeConfig>,
        groups: &BTreeMap<String, GroupConfig>,
    ) -> Result<Self> {
        let parents = parent_map(groups);

        let mut direct: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (group_name, group) in groups {
            let patterns = group
                .member_patterns
                .iter()
                .map(|p| Regex::new(p))
                .collect::<std::result::Result<Vec<_>, _>>()?;

            let entry = direct.entry(group_name.clone()).or_default();
            entry.extend(group.members.iter().cloned());
            for node_name in nodes.keys() {
                if patterns.iter().any(|p| p.is_match(node_name)) {
                    entry.insert(node_name.clone());
                }
            }
        }
        for (node_name, node) in nodes {
            for group_name in &node.groups {
                direct
                    .entry(group_name.clone())
                    .or_default()
                    .insert(node_name.clone());
            }
        }

        // subgroups first, so their complete member sets flow upwards
        let mut subgroups_first = topological_sort(&parents, &group_names(groups))
            .map_err(|chain| crate::error::repo::group_loop(&chain))?;
        subgroups_first.reverse();

        let mut members = direct;
        for group_name in &subgroups_first {
            let group_members = members.get(group_name).cloned().unwrap_or_default();
            if let Some(group_parents) = parents.get(group_name) {
                for parent in group_parents {
                    members
                        .entry(parent.clone())
                        .or_default()
                        .extend(group_members.iter().cloned());
                }
            }
        }

        Ok(Self { members, parents })
    }

    /// Members of a group, sorted
    pub fn members_of(&self, group: &str) -> Vec<String> {
        self.members
            .get(group)
            .map(|m| m.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Groups of a node, every group after all groups containing it
    ///
    /// Groups unrelated to each other are ordered by name.
    pub fn groups_of(&self, node: &str) -> Vec<String> {
        let node_groups: Vec<String> = self
            .members
            .iter()
            .filter(|(_, members)| members.contains(node))
            .map(|(group, _)| group.clone())
            .collect();

        let parents: DependencyMap = node_groups
            .iter()
            .map(|group| {
                let group_parents = self
                    .parents
                    .get(group)
                    .map(|p| {
                        p.iter()
                            .filter(|parent| node_groups.contains(parent))
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default();
                (group.clone(), group_parents)
            })
            .collect();

        // loops were rejected in resolve()
        sorted_topological_sort(&parents, &node_groups).unwrap_or(node_groups)
    }
}

fn group_names(groups: &BTreeMap<String, GroupConfig>) -> Vec<String> {
    groups.keys().cloned().collect()
}

/// Map each group to the groups that list it as a subgroup, sorted
fn parent_map(groups: &BTreeMap<String, GroupConfig>) -> DependencyMap {
    let mut parents: DependencyMap = groups.keys().map(|g| (g.clone(), Vec::new())).collect();
    for (group_name, group) in groups {
        for subgroup in &group.subgroups {
            let entry = parents.entry(subgroup.clone()).or_default();
            if !entry.contains(group_name) {
                entry.push(group_name.clone());
            }
        }
    }
    for list in parents.values_mut() {
        list.sort();
    }
    parents
}
