use std::path::{Component, Path};

use crate::TransferError;

/// Validates an object name before it is sent to the storage backend.
///
/// Rejects:
/// - Empty or whitespace-only names
/// - Absolute paths (Unix `/` or Windows `C:\`)
/// - Parent directory traversal (`..`)
/// - Windows prefix components (`C:`, `\\server`)
/// - Control characters
pub fn validate_object_name(name: &str) -> Result<(), TransferError> {
    if name.trim().is_empty() {
        return Err(TransferError::InvalidName("empty name".into()));
    }

    if name.chars().any(char::is_control) {
        return Err(TransferError::InvalidName(format!(
            "control characters not allowed: {name:?}"
        )));
    }

    let path = Path::new(name);

    if path.is_absolute() {
        return Err(TransferError::InvalidName(format!(
            "absolute path not allowed: {name}"
        )));
    }

    for component in path.components() {
        match component {
            Component::ParentDir => {
                return Err(TransferError::InvalidName(format!(
                    "parent directory traversal not allowed: {name}"
                )));
            }
            Component::Prefix(_) | Component::RootDir => {
                return Err(TransferError::InvalidName(format!(
                    "absolute path not allowed: {name}"
                )));
            }
            Component::CurDir | Component::Normal(_) => {}
        }
    }

    Ok(())
}
