//! Metadata errors

use super::BwError;

/// Creates an invalid metadata error
pub fn invalid(message: impl Into<String>) -> BwError {
    BwError::MetadataInvalid {
        message: message.into(),
    }
}

/// Creates a processor failure for the given node
pub fn processor_failed(
    name: impl Into<String>,
    node: impl Into<String>,
    reason: impl Into<String>,
) -> BwError {
    BwError::MetadataProcessorFailed {
        name: name.into(),
        node: node.into(),
        reason: reason.into(),
    }
}
