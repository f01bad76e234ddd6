//! # Relation kinds
//!
//! Defines the three directed edge kinds of the authorization graph.
//! The schema fixes both endpoints of every relation kind, which is what
//! bounds permission resolution to exactly three hops.

use serde::{Deserialize, Serialize};

use crate::entities::EntityKind;

/// The kinds of directed relations stored in the authorization graph.
///
/// All relations are many-to-many and additive. Together they form the
/// fixed resolution path:
///
/// ```text
/// User --MEMBER_OF--> Group --HAS_PERMISSION_SET--> PermissionSet --INCLUDES--> Operation
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationKind {
    /// User → Group membership.
    MemberOf,

    /// Group → PermissionSet assignment.
    HasPermissionSet,

    /// PermissionSet → Operation inclusion.
    Includes,
}

impl RelationKind {
    /// Get the string representation of the relation kind.
    ///
    /// This is also the relationship type spelling used by graph backends.
    ///
    /// # Returns
    ///
    /// A static string representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::MemberOf => "MEMBER_OF",
            RelationKind::HasPermissionSet => "HAS_PERMISSION_SET",
            RelationKind::Includes => "INCLUDES",
        }
    }

    /// Parse a relation kind from its string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive)
    ///
    /// # Returns
    ///
    /// `Some(RelationKind)` if valid, `None` otherwise
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "MEMBER_OF" => Some(RelationKind::MemberOf),
            "HAS_PERMISSION_SET" => Some(RelationKind::HasPermissionSet),
            "INCLUDES" => Some(RelationKind::Includes),
            _ => None,
        }
    }

    /// The entity kind a relation of this kind starts from.
    pub fn source_kind(&self) -> EntityKind {
        match self {
            RelationKind::MemberOf => EntityKind::User,
            RelationKind::HasPermissionSet => EntityKind::Group,
            RelationKind::Includes => EntityKind::PermissionSet,
        }
    }

    /// The entity kind a relation of this kind points to.
    pub fn target_kind(&self) -> EntityKind {
        match self {
            RelationKind::MemberOf => EntityKind::Group,
            RelationKind::HasPermissionSet => EntityKind::PermissionSet,
            RelationKind::Includes => EntityKind::Operation,
        }
    }

    /// Get all relation kinds, in path order.
    pub fn all() -> Vec<RelationKind> {
        vec![
            RelationKind::MemberOf,
            RelationKind::HasPermissionSet,
            RelationKind::Includes,
        ]
    }
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str_round_trips() {
        for kind in RelationKind::all() {
            assert_eq!(RelationKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_path_is_contiguous() {
        // Each relation's target is the next relation's source.
        let path = RelationKind::all();
        for pair in path.windows(2) {
            assert_eq!(pair[0].target_kind(), pair[1].source_kind());
        }
        assert_eq!(path[0].source_kind(), EntityKind::User);
        assert_eq!(path[2].target_kind(), EntityKind::Operation);
    }
}
