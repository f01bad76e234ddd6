//! # Query results
//!
//! Strongly-typed results for the store's read operations. Backends return
//! these instead of loosely-typed record rows so callers never index into
//! dynamic result sets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Result of a single permission check.
///
/// `allowed` is true iff a `MEMBER_OF` → `HAS_PERMISSION_SET` → `INCLUDES`
/// path exists from the user to the named operation. A false result is a
/// legitimate answer ("no path"), distinct from any error.
///
/// # Example
///
/// ```
/// use authgraph_model::results::PermissionCheck;
///
/// let check = PermissionCheck::denied("alice", "delete_database");
/// assert!(!check.allowed);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermissionCheck {
    /// The user the check was resolved for.
    pub user: String,

    /// The operation name that was checked.
    pub operation: String,

    /// Whether a resolution path exists.
    pub allowed: bool,
}

impl PermissionCheck {
    /// Create a positive check result.
    pub fn allowed(user: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            operation: operation.into(),
            allowed: true,
        }
    }

    /// Create a negative check result.
    pub fn denied(user: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            operation: operation.into(),
            allowed: false,
        }
    }
}

/// The distinct set of operations reachable from a user.
///
/// Set semantics: duplicates across multiple groups or permission sets
/// collapse to one entry, and iteration order carries no meaning beyond the
/// ordering `BTreeSet` happens to provide.
///
/// # Example
///
/// ```
/// use authgraph_model::results::UserPermissions;
///
/// let perms = UserPermissions::new("alice", ["read_data", "write_data", "read_data"]);
/// assert_eq!(perms.len(), 2);
/// assert!(perms.contains("read_data"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserPermissions {
    /// The user the listing was resolved for.
    pub user: String,

    /// Distinct reachable operation names.
    pub operations: BTreeSet<String>,
}

impl UserPermissions {
    /// Create a listing from an iterator of operation names.
    ///
    /// # Arguments
    ///
    /// * `user` - The user the listing belongs to
    /// * `operations` - Operation names; duplicates collapse
    pub fn new<I, S>(user: impl Into<String>, operations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            user: user.into(),
            operations: operations.into_iter().map(Into::into).collect(),
        }
    }

    /// Create an empty listing for a user in no groups.
    pub fn empty(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            operations: BTreeSet::new(),
        }
    }

    /// Check whether an operation is in the listing.
    pub fn contains(&self, operation: &str) -> bool {
        self.operations.contains(operation)
    }

    /// Get the count of distinct operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Check if the listing is empty.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Iterate over the operation names.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.operations.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_check_constructors() {
        let yes = PermissionCheck::allowed("alice", "read_data");
        assert!(yes.allowed);
        assert_eq!(yes.user, "alice");
        assert_eq!(yes.operation, "read_data");

        let no = PermissionCheck::denied("bob", "manage_users");
        assert!(!no.allowed);
    }

    #[test]
    fn test_user_permissions_deduplicates() {
        let perms = UserPermissions::new("alice", ["a", "b", "a", "c", "b"]);
        assert_eq!(perms.len(), 3);
        assert!(perms.contains("a"));
        assert!(!perms.contains("d"));
    }

    #[test]
    fn test_user_permissions_empty() {
        let perms = UserPermissions::empty("loner");
        assert!(perms.is_empty());
        assert_eq!(perms.len(), 0);
        assert!(!perms.contains("read_data"));
    }

    #[test]
    fn test_user_permissions_serde() {
        let perms = UserPermissions::new("alice", ["read_data", "write_data"]);
        let json = serde_json::to_string(&perms).unwrap();
        let back: UserPermissions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, perms);
    }
}
