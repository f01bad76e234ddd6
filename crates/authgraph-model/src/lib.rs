//! # Authgraph Model
//!
//! Domain vocabulary for the authgraph RBAC system: the entity and relation
//! kinds of the authorization graph, and the typed results its queries
//! return.
//!
//! ## Overview
//!
//! The authgraph-model crate defines:
//! - **Entity kinds**: User, Group, PermissionSet, Operation
//! - **Relation kinds**: MEMBER_OF, HAS_PERMISSION_SET, INCLUDES
//! - **Query results**: typed permission-check and permission-listing values
//!
//! ## Architecture
//!
//! ```text
//! User
//!   └─ MEMBER_OF ─→ Group
//!                     └─ HAS_PERMISSION_SET ─→ PermissionSet
//!                                                └─ INCLUDES ─→ Operation
//! ```
//!
//! Every entity is identified by a name unique within its kind; a User and
//! a Group may share a name. The schema fixes both endpoints of every
//! relation kind, so a user's effective permissions are always resolved by
//! exactly three hops: no general graph search, no cycle handling.
//!
//! ## Usage
//!
//! ```rust
//! use authgraph_model::{EntityKind, RelationKind, UserPermissions};
//!
//! // Relation kinds encode the schema's fixed path
//! assert_eq!(RelationKind::MemberOf.source_kind(), EntityKind::User);
//! assert_eq!(RelationKind::Includes.target_kind(), EntityKind::Operation);
//!
//! // Listings have set semantics
//! let perms = UserPermissions::new("alice", ["read_data", "read_data"]);
//! assert_eq!(perms.len(), 1);
//! ```
//!
//! ## Integration with authgraph-store
//!
//! The `authgraph-store` crate consumes this vocabulary: its `GraphStore`
//! trait returns `PermissionCheck` and `UserPermissions`, and its backends
//! use the `as_str` spellings as node labels and relationship types.

pub mod entities;
pub mod relations;
pub mod results;

// Re-export main types for convenience
pub use entities::EntityKind;
pub use relations::RelationKind;
pub use results::{PermissionCheck, UserPermissions};
