//! # Authgraph Store
//!
//! The Authorization Graph Store for the authgraph RBAC system: it records
//! users, groups, permission sets and operations as a property graph and
//! answers permission queries as fixed-depth reachability over it.
//!
//! ## Overview
//!
//! The authgraph-store crate handles:
//! - **Mutations**: creating entities and the relations between them
//! - **Resolution**: on-demand three-hop permission checks and listings
//! - **Backends**: in-memory (default) and Neo4j (feature `neo4j`)
//!
//! ## Architecture
//!
//! ```text
//! User --MEMBER_OF--> Group --HAS_PERMISSION_SET--> PermissionSet --INCLUDES--> Operation
//! ```
//!
//! A user's effective permissions are the distinct union of operations
//! reachable over that path from every group the user belongs to. Depth is
//! fixed by the schema, so resolution is a bounded composition of three
//! lookups, never a general graph search.
//!
//! ## Usage
//!
//! ```rust
//! use authgraph_store::{GraphStore, MemoryGraphStore};
//!
//! # async fn example() -> authgraph_store::StoreResult<()> {
//! let store = MemoryGraphStore::new();
//!
//! store.create_operation("read_data").await?;
//! store.create_permission_set("readers", &["read_data"]).await?;
//! store.create_group("analysts").await?;
//! store.assign_permission_set_to_group("analysts", "readers").await?;
//! store.create_user("alice").await?;
//! store.add_user_to_group("alice", "analysts").await?;
//!
//! let check = store.check_user_permission("alice", "read_data").await?;
//! assert!(check.allowed);
//! # Ok(())
//! # }
//! ```
//!
//! ## Guarantees
//!
//! - Every mutation is atomic: uniqueness holds under concurrent callers,
//!   and a failed `create_permission_set` leaves no partial edges.
//! - Reads observe a consistent snapshot of the graph.
//! - No call blocks indefinitely; backend queries run under a bounded
//!   timeout and surface `StoreError::StoreUnavailable`.
//! - The graph is additive-only in current scope; there is no revoke.
//!
//! ## Feature Flags
//!
//! - `memory`: in-memory backend (enabled by default)
//! - `neo4j`: Neo4j backend over parameterized Cypher

pub mod error;
pub mod store;

// Re-export main types for convenience
pub use error::{StoreError, StoreResult};
pub use store::{GraphStore, MemoryGraphStore, StoreStats};

#[cfg(feature = "neo4j")]
pub use store::{Neo4jGraphStore, Neo4jStoreConfig};

// Re-export the domain vocabulary so callers need only one crate.
pub use authgraph_model::{EntityKind, PermissionCheck, RelationKind, UserPermissions};
