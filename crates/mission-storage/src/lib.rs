//! mission-storage: JSON file persistence.
//!
//! Every document is a single JSON file that is read and rewritten whole.
//! There is no cache and no locking; each call goes to disk.

pub mod document;
pub mod settings;
pub mod tasks;

use std::path::PathBuf;

pub use document::{DocumentError, JsonDocument, Loaded};
pub use settings::SettingsStore;
pub use tasks::TaskStore;

/// Errors surfaced by the document stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A required input field is missing.
    #[error("{0}")]
    Validation(String),
    /// Unknown id, or a document that must exist does not.
    #[error("{0}")]
    NotFound(String),
    /// Writing a document (or its backup) failed.
    #[error("Failed to write {}", .0.display())]
    Persistence(PathBuf),
    #[error("{0}")]
    Unexpected(String),
}

impl StoreError {
    pub fn missing_fields(fields: &[&str]) -> Self {
        Self::Validation(format!("Missing required fields: {}", fields.join(", ")))
    }
}

impl From<DocumentError> for StoreError {
    fn from(e: DocumentError) -> Self {
        Self::Unexpected(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_message() {
        let err = StoreError::missing_fields(&["name", "payload"]);
        assert_eq!(err.to_string(), "Missing required fields: name, payload");
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn test_persistence_message() {
        let err = StoreError::Persistence(PathBuf::from("/tmp/x.json"));
        assert_eq!(err.to_string(), "Failed to write /tmp/x.json");
    }
}
