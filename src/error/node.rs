//! Node command errors

use super::BwError;

/// Creates a transport failure error
pub fn transport_failed(node: impl Into<String>, reason: impl Into<String>) -> BwError {
    BwError::TransportFailed {
        node: node.into(),
        reason: reason.into(),
    }
}
