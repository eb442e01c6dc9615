//! File system errors

use super::BwError;

/// Creates a file read failed error
pub fn read_failed(path: impl Into<String>, reason: impl Into<String>) -> BwError {
    BwError::FileReadFailed {
        path: path.into(),
        reason: reason.into(),
    }
}
