//! Error types for store operations
//!
//! This module defines all error types a `GraphStore` can surface. Missing
//! references are never swallowed: every mutation either succeeds or fails
//! explicitly, and only a permission check may answer a negative result.

use authgraph_model::EntityKind;
use thiserror::Error;

/// Store error types.
///
/// These cover uniqueness violations, dangling references at
/// relation-creation or query time, and backend availability failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A create was called for a name that already exists under that kind.
    #[error("{kind} '{name}' already exists")]
    DuplicateEntity {
        /// The entity kind the clash occurred under.
        kind: EntityKind,
        /// The duplicated name.
        name: String,
    },

    /// Referenced user does not exist.
    #[error("Unknown user: {0}")]
    UnknownUser(String),

    /// Referenced group does not exist.
    #[error("Unknown group: {0}")]
    UnknownGroup(String),

    /// Referenced permission set does not exist.
    #[error("Unknown permission set: {0}")]
    UnknownPermissionSet(String),

    /// Referenced operation does not exist.
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// Backend unreachable or timed out. Callers may retry with backoff;
    /// the store never retries internally.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Build the unknown-entity error for a given kind.
    ///
    /// # Arguments
    ///
    /// * `kind` - The kind of the missing entity
    /// * `name` - The name that failed to resolve
    pub fn unknown(kind: EntityKind, name: impl Into<String>) -> Self {
        let name = name.into();
        match kind {
            EntityKind::User => StoreError::UnknownUser(name),
            EntityKind::Group => StoreError::UnknownGroup(name),
            EntityKind::PermissionSet => StoreError::UnknownPermissionSet(name),
            EntityKind::Operation => StoreError::UnknownOperation(name),
        }
    }

    /// Check if this error may be resolved by retrying.
    ///
    /// Only availability failures are retryable; duplicate and
    /// unknown-entity errors report a definite state of the graph.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::StoreUnavailable(_))
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::DuplicateEntity { .. } => "DUPLICATE_ENTITY",
            StoreError::UnknownUser(_) => "UNKNOWN_USER",
            StoreError::UnknownGroup(_) => "UNKNOWN_GROUP",
            StoreError::UnknownPermissionSet(_) => "UNKNOWN_PERMISSION_SET",
            StoreError::UnknownOperation(_) => "UNKNOWN_OPERATION",
            StoreError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_maps_kind_to_variant() {
        assert!(matches!(
            StoreError::unknown(EntityKind::User, "alice"),
            StoreError::UnknownUser(n) if n == "alice"
        ));
        assert!(matches!(
            StoreError::unknown(EntityKind::PermissionSet, "db_admin"),
            StoreError::UnknownPermissionSet(n) if n == "db_admin"
        ));
    }

    #[test]
    fn test_retryable() {
        assert!(StoreError::StoreUnavailable("timeout".into()).is_retryable());
        assert!(!StoreError::UnknownGroup("DBA".into()).is_retryable());
        assert!(!StoreError::DuplicateEntity {
            kind: EntityKind::User,
            name: "alice".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = StoreError::DuplicateEntity {
            kind: EntityKind::Group,
            name: "DBA".into(),
        };
        assert_eq!(err.to_string(), "Group 'DBA' already exists");
        assert_eq!(err.error_code(), "DUPLICATE_ENTITY");
    }
}
