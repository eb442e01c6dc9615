//! Item validation errors

use super::BwError;

/// Creates a bundle error (invalid item definition)
pub fn bundle_error(message: impl Into<String>) -> BwError {
    BwError::BundleError {
        message: message.into(),
    }
}

/// Creates a dependency loop error from the item ids on the cycle
pub fn dependency_loop(chain: &[String]) -> BwError {
    BwError::DependencyLoop {
        chain: chain.join(" -> "),
    }
}

/// Creates an error for a dependency listed more than once
pub fn redundant_dependency(
    item: impl Into<String>,
    bundle: impl Into<String>,
    dependency: impl Into<String>,
) -> BwError {
    BwError::RedundantDependency {
        item: item.into(),
        bundle: bundle.into(),
        dependency: dependency.into(),
    }
}
