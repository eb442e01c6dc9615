//! Repository lookup errors

use super::BwError;

/// Creates a no such node error
pub fn no_such_node(name: impl Into<String>) -> BwError {
    BwError::NoSuchNode { name: name.into() }
}

/// Creates a no such group error
pub fn no_such_group(name: impl Into<String>) -> BwError {
    BwError::NoSuchGroup { name: name.into() }
}

/// Creates a no such bundle error
pub fn no_such_bundle(name: impl Into<String>) -> BwError {
    BwError::NoSuchBundle { name: name.into() }
}

/// Creates a no such item error
pub fn no_such_item(node: impl Into<String>, item: impl Into<String>) -> BwError {
    BwError::NoSuchItem {
        node: node.into(),
        item: item.into(),
    }
}

/// Creates a group loop error from the groups on the cycle
pub fn group_loop(chain: &[String]) -> BwError {
    BwError::GroupLoop {
        chain: chain.join(" -> "),
    }
}
