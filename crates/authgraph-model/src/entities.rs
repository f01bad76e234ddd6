//! # Entity kinds
//!
//! Defines the four node kinds of the authorization graph.
//! Every entity is identified by a name that is unique within its kind.

use serde::{Deserialize, Serialize};

/// The kinds of entities stored in the authorization graph.
///
/// Name uniqueness is enforced per kind, not globally: a `User` named
/// "alice" and a `Group` named "alice" are distinct entities.
///
/// - **User**: a principal whose effective permissions derive from groups
/// - **Group**: a named collection of permission sets, holding users
/// - **PermissionSet**: a named bundle of operations
/// - **Operation**: an atomic permission-gated action
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A principal. Users sit at the start of every resolution path.
    User,

    /// A collection of permission sets with users as members.
    Group,

    /// A named bundle of operations.
    PermissionSet,

    /// An atomic action gated by permission (e.g. "create_database").
    Operation,
}

impl EntityKind {
    /// Get the string representation of the entity kind.
    ///
    /// This is also the node label spelling used by graph backends.
    ///
    /// # Returns
    ///
    /// A static string representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::User => "User",
            EntityKind::Group => "Group",
            EntityKind::PermissionSet => "PermissionSet",
            EntityKind::Operation => "Operation",
        }
    }

    /// Parse an entity kind from its string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive)
    ///
    /// # Returns
    ///
    /// `Some(EntityKind)` if valid, `None` otherwise
    ///
    /// # Example
    ///
    /// ```
    /// use authgraph_model::entities::EntityKind;
    ///
    /// assert_eq!(EntityKind::parse("User"), Some(EntityKind::User));
    /// assert_eq!(EntityKind::parse("permission_set"), Some(EntityKind::PermissionSet));
    /// assert_eq!(EntityKind::parse("widget"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" => Some(EntityKind::User),
            "group" => Some(EntityKind::Group),
            "permissionset" | "permission_set" => Some(EntityKind::PermissionSet),
            "operation" => Some(EntityKind::Operation),
            _ => None,
        }
    }

    /// Get all entity kinds.
    ///
    /// # Returns
    ///
    /// A vector of every kind, in path order from `User` to `Operation`.
    pub fn all() -> Vec<EntityKind> {
        vec![
            EntityKind::User,
            EntityKind::Group,
            EntityKind::PermissionSet,
            EntityKind::Operation,
        ]
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str_round_trips() {
        for kind in EntityKind::all() {
            assert_eq!(EntityKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(EntityKind::parse("permission_set"), Some(EntityKind::PermissionSet));
        assert_eq!(EntityKind::parse("PERMISSIONSET"), Some(EntityKind::PermissionSet));
        assert_eq!(EntityKind::parse("unknown"), None);
    }

    #[test]
    fn test_display_matches_label() {
        assert_eq!(EntityKind::PermissionSet.to_string(), "PermissionSet");
        assert_eq!(EntityKind::User.to_string(), "User");
    }
}
