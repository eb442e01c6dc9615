//! Group definitions (groups.yaml)

use serde::{Deserialize, Serialize};

/// A group entry from groups.yaml
///
/// Every attribute is optional. Members come from `members`,
/// `member_patterns`, nodes declaring the group themselves and,
/// recursively, from `subgroups`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupConfig {
    /// Bundles assigned to every member
    #[serde(default)]
    pub bundles: Vec<String>,

    /// Regular expressions searched (unanchored) in node names
    #[serde(default)]
    pub member_patterns: Vec<String>,

    /// Explicit node names
    #[serde(default)]
    pub members: Vec<String>,

    /// Metadata merged into every member's metadata
    #[serde(default)]
    pub metadata: serde_yaml::Mapping,

    /// Processor references run on members' merged metadata
    #[serde(default)]
    pub metadata_processors: Vec<String>,

    /// Groups whose members are members of this group as well
    #[serde(default)]
    pub subgroups: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_group() {
        let group: GroupConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(group, GroupConfig::default());
    }

    #[test]
    fn test_full_group() {
        let group: GroupConfig = serde_yaml::from_str(
            r#"
bundles: [base]
member_patterns: ["^web\\d+"]
members: [db1]
metadata:
  dns: [1.1.1.1]
metadata_processors: [group_names]
subgroups: [debian]
"#,
        )
        .unwrap();
        assert_eq!(group.bundles, vec!["base"]);
        assert_eq!(group.member_patterns, vec!["^web\\d+"]);
        assert_eq!(group.members, vec!["db1"]);
        assert_eq!(group.metadata_processors, vec!["group_names"]);
        assert_eq!(group.subgroups, vec!["debian"]);
    }

    #[test]
    fn test_unknown_attribute_rejected() {
        let result: std::result::Result<GroupConfig, _> = serde_yaml::from_str("member: [a]\n");
        assert!(result.is_err());
    }
}
