//! Authorization graph store
//!
//! This module provides the store abstraction and implementations for
//! recording the RBAC graph and answering permission queries against it.

use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use authgraph_model::{EntityKind, PermissionCheck, UserPermissions};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Graph store trait for RBAC mutations and permission queries.
///
/// All mutations are additive and atomic: a call either applies fully or
/// leaves the graph unchanged. Permission resolution is always computed on
/// demand over the current graph, so any mutation is visible to the next
/// query.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Create an Operation node.
    ///
    /// # Errors
    ///
    /// `DuplicateEntity` if an Operation with this name already exists.
    async fn create_operation(&self, name: &str) -> StoreResult<()>;

    /// Create a PermissionSet node with an INCLUDES edge to each named
    /// Operation.
    ///
    /// The call is all-or-nothing: on any failure no node and no partial
    /// INCLUDES edges remain.
    ///
    /// # Errors
    ///
    /// `DuplicateEntity` if a PermissionSet with this name already exists,
    /// `UnknownOperation` if any referenced Operation is missing.
    async fn create_permission_set(&self, name: &str, operations: &[&str]) -> StoreResult<()>;

    /// Create a Group node.
    ///
    /// # Errors
    ///
    /// `DuplicateEntity` if a Group with this name already exists.
    async fn create_group(&self, name: &str) -> StoreResult<()>;

    /// Create a HAS_PERMISSION_SET edge from a Group to a PermissionSet.
    ///
    /// Assigning the same set to the same group twice is a no-op.
    ///
    /// # Errors
    ///
    /// `UnknownGroup` / `UnknownPermissionSet` if an endpoint is missing.
    /// Endpoints are never created implicitly.
    async fn assign_permission_set_to_group(&self, group: &str, set: &str) -> StoreResult<()>;

    /// Create a User node.
    ///
    /// # Errors
    ///
    /// `DuplicateEntity` if a User with this name already exists.
    async fn create_user(&self, name: &str) -> StoreResult<()>;

    /// Create a MEMBER_OF edge from a User to a Group.
    ///
    /// Adding a user to the same group twice is a no-op.
    ///
    /// # Errors
    ///
    /// `UnknownUser` / `UnknownGroup` if an endpoint is missing. Endpoints
    /// are never created implicitly.
    async fn add_user_to_group(&self, user: &str, group: &str) -> StoreResult<()>;

    /// Check whether a user can perform an operation.
    ///
    /// The result is `allowed == true` iff a
    /// MEMBER_OF → HAS_PERMISSION_SET → INCLUDES path exists from the user
    /// to the named operation. "No path" is a legitimate negative answer,
    /// including when the operation name was never created, since the check
    /// is on traversal existence, not operation existence.
    ///
    /// # Errors
    ///
    /// `UnknownUser` only if the user itself does not exist.
    async fn check_user_permission(
        &self,
        user: &str,
        operation: &str,
    ) -> StoreResult<PermissionCheck>;

    /// Get the distinct set of operations reachable from a user.
    ///
    /// Duplicates across multiple groups or permission sets collapse to one
    /// entry; a user in no groups gets an empty set.
    ///
    /// # Errors
    ///
    /// `UnknownUser` if the user does not exist.
    async fn user_permissions(&self, user: &str) -> StoreResult<UserPermissions>;

    /// Check whether an entity of a given kind exists.
    async fn entity_exists(&self, kind: EntityKind, name: &str) -> StoreResult<bool>;

    /// Get store stats.
    async fn stats(&self) -> StoreStats;
}

/// Store statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreStats {
    /// Total entity nodes created
    pub entities_created: u64,
    /// Total relation edges created
    pub relations_created: u64,
    /// Total permission checks answered
    pub permission_checks: u64,
    /// Total permission listings answered
    pub permission_listings: u64,
}

/// Whole-graph state for the in-memory backend.
///
/// Entities live in one name set per kind, relations in one adjacency map
/// per kind (source name → target names). Keeping everything in a single
/// value lets one lock guarantee atomic mutations and snapshot reads.
#[derive(Debug, Default)]
struct GraphState {
    users: HashSet<String>,
    groups: HashSet<String>,
    permission_sets: HashSet<String>,
    operations: HashSet<String>,
    /// MEMBER_OF: user name → group names
    member_of: HashMap<String, HashSet<String>>,
    /// HAS_PERMISSION_SET: group name → permission set names
    has_permission_set: HashMap<String, HashSet<String>>,
    /// INCLUDES: permission set name → operation names
    includes: HashMap<String, HashSet<String>>,
}

impl GraphState {
    fn entities(&self, kind: EntityKind) -> &HashSet<String> {
        match kind {
            EntityKind::User => &self.users,
            EntityKind::Group => &self.groups,
            EntityKind::PermissionSet => &self.permission_sets,
            EntityKind::Operation => &self.operations,
        }
    }

    fn entities_mut(&mut self, kind: EntityKind) -> &mut HashSet<String> {
        match kind {
            EntityKind::User => &mut self.users,
            EntityKind::Group => &mut self.groups,
            EntityKind::PermissionSet => &mut self.permission_sets,
            EntityKind::Operation => &mut self.operations,
        }
    }

    /// Resolve the distinct union of operations reachable from a user over
    /// the fixed three-hop path. Depth is bounded by the schema, so this is
    /// a composition of three lookups rather than a graph search.
    fn reachable_operations(&self, user: &str) -> BTreeSet<String> {
        let mut reachable = BTreeSet::new();
        let Some(groups) = self.member_of.get(user) else {
            return reachable;
        };
        for group in groups {
            let Some(sets) = self.has_permission_set.get(group) else {
                continue;
            };
            for set in sets {
                if let Some(operations) = self.includes.get(set) {
                    reachable.extend(operations.iter().cloned());
                }
            }
        }
        reachable
    }

    /// Path-existence variant of [`reachable_operations`] with early exit.
    fn has_path(&self, user: &str, operation: &str) -> bool {
        self.member_of.get(user).is_some_and(|groups| {
            groups.iter().any(|group| {
                self.has_permission_set.get(group).is_some_and(|sets| {
                    sets.iter().any(|set| {
                        self.includes
                            .get(set)
                            .is_some_and(|ops| ops.contains(operation))
                    })
                })
            })
        })
    }
}

/// In-memory graph store implementation.
///
/// This is suitable for single-process applications and testing. For a
/// persistent, shared graph, use the Neo4j backend.
///
/// A single `RwLock` guards the whole graph: mutations validate and apply
/// under the write lock, so uniqueness and the all-or-nothing guarantee of
/// `create_permission_set` hold even under concurrent callers, and reads
/// always observe a consistent snapshot.
pub struct MemoryGraphStore {
    /// Graph state
    state: Arc<RwLock<GraphState>>,
    /// Statistics
    stats: Arc<RwLock<StoreStats>>,
}

impl std::fmt::Debug for MemoryGraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryGraphStore").finish()
    }
}

impl MemoryGraphStore {
    /// Create a new empty in-memory graph store.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(GraphState::default())),
            stats: Arc::new(RwLock::new(StoreStats::default())),
        }
    }

    /// Insert an entity node, enforcing per-kind name uniqueness.
    async fn insert_entity(&self, kind: EntityKind, name: &str) -> StoreResult<()> {
        {
            let mut state = self.state.write().await;
            if !state.entities_mut(kind).insert(name.to_string()) {
                return Err(StoreError::DuplicateEntity {
                    kind,
                    name: name.to_string(),
                });
            }
        }

        {
            let mut stats = self.stats.write().await;
            stats.entities_created += 1;
        }

        tracing::debug!(kind = %kind, name, "entity created");
        Ok(())
    }
}

impl Default for MemoryGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn create_operation(&self, name: &str) -> StoreResult<()> {
        self.insert_entity(EntityKind::Operation, name).await
    }

    async fn create_permission_set(&self, name: &str, operations: &[&str]) -> StoreResult<()> {
        let edges;
        {
            let mut state = self.state.write().await;

            if state.permission_sets.contains(name) {
                return Err(StoreError::DuplicateEntity {
                    kind: EntityKind::PermissionSet,
                    name: name.to_string(),
                });
            }

            // Validate every reference before touching the graph, so a
            // failed call leaves no node and no partial INCLUDES edges.
            for op in operations {
                if !state.operations.contains(*op) {
                    return Err(StoreError::UnknownOperation(op.to_string()));
                }
            }

            state.permission_sets.insert(name.to_string());
            let included: &mut HashSet<String> = state.includes.entry(name.to_string()).or_default();
            for op in operations {
                included.insert(op.to_string());
            }
            edges = included.len() as u64;
        }

        {
            let mut stats = self.stats.write().await;
            stats.entities_created += 1;
            stats.relations_created += edges;
        }

        tracing::debug!(name, operations = edges, "permission set created");
        Ok(())
    }

    async fn create_group(&self, name: &str) -> StoreResult<()> {
        self.insert_entity(EntityKind::Group, name).await
    }

    async fn assign_permission_set_to_group(&self, group: &str, set: &str) -> StoreResult<()> {
        let added = {
            let mut state = self.state.write().await;

            if !state.groups.contains(group) {
                return Err(StoreError::UnknownGroup(group.to_string()));
            }
            if !state.permission_sets.contains(set) {
                return Err(StoreError::UnknownPermissionSet(set.to_string()));
            }

            state
                .has_permission_set
                .entry(group.to_string())
                .or_default()
                .insert(set.to_string())
        };

        if added {
            let mut stats = self.stats.write().await;
            stats.relations_created += 1;
        }

        tracing::debug!(group, set, "permission set assigned to group");
        Ok(())
    }

    async fn create_user(&self, name: &str) -> StoreResult<()> {
        self.insert_entity(EntityKind::User, name).await
    }

    async fn add_user_to_group(&self, user: &str, group: &str) -> StoreResult<()> {
        let added = {
            let mut state = self.state.write().await;

            if !state.users.contains(user) {
                return Err(StoreError::UnknownUser(user.to_string()));
            }
            if !state.groups.contains(group) {
                return Err(StoreError::UnknownGroup(group.to_string()));
            }

            state
                .member_of
                .entry(user.to_string())
                .or_default()
                .insert(group.to_string())
        };

        if added {
            let mut stats = self.stats.write().await;
            stats.relations_created += 1;
        }

        tracing::debug!(user, group, "user added to group");
        Ok(())
    }

    async fn check_user_permission(
        &self,
        user: &str,
        operation: &str,
    ) -> StoreResult<PermissionCheck> {
        let allowed = {
            let state = self.state.read().await;

            if !state.users.contains(user) {
                return Err(StoreError::UnknownUser(user.to_string()));
            }

            state.has_path(user, operation)
        };

        {
            let mut stats = self.stats.write().await;
            stats.permission_checks += 1;
        }

        tracing::debug!(user, operation, allowed, "permission checked");
        Ok(PermissionCheck {
            user: user.to_string(),
            operation: operation.to_string(),
            allowed,
        })
    }

    async fn user_permissions(&self, user: &str) -> StoreResult<UserPermissions> {
        let operations = {
            let state = self.state.read().await;

            if !state.users.contains(user) {
                return Err(StoreError::UnknownUser(user.to_string()));
            }

            state.reachable_operations(user)
        };

        {
            let mut stats = self.stats.write().await;
            stats.permission_listings += 1;
        }

        tracing::debug!(user, count = operations.len(), "permissions listed");
        Ok(UserPermissions {
            user: user.to_string(),
            operations,
        })
    }

    async fn entity_exists(&self, kind: EntityKind, name: &str) -> StoreResult<bool> {
        let state = self.state.read().await;
        Ok(state.entities(kind).contains(name))
    }

    async fn stats(&self) -> StoreStats {
        self.stats.read().await.clone()
    }
}

// ============================================================================
// Neo4j Graph Store (Feature: neo4j)
// ============================================================================

#[cfg(feature = "neo4j")]
pub mod neo4j_store {
    //! Neo4j-backed graph store for persistent, shared deployments.
    //!
    //! Uses parameterized Cypher over Bolt: entity names only ever travel as
    //! query parameters, never interpolated into query text. Uniqueness is
    //! enforced by per-kind constraints created at connect time.

    use super::*;
    use authgraph_model::RelationKind;
    use neo4rs::{query, ConfigBuilder, Graph, Query};
    use std::future::Future;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    /// Neo4j store configuration.
    #[derive(Debug, Clone)]
    pub struct Neo4jStoreConfig {
        /// Bolt URI (e.g. neo4j://localhost:7687).
        pub uri: String,

        /// Principal to authenticate as.
        pub user: String,

        /// Credential for the principal.
        pub password: String,

        /// Database name (default: "neo4j").
        pub database: String,

        /// Per-query timeout; an elapsed timeout surfaces `StoreUnavailable`
        /// rather than hanging the caller (default: 10s).
        pub query_timeout: Duration,

        /// Connection pool size. Connections are checked out per query and
        /// returned when it completes, never held across operations
        /// (default: 16).
        pub max_connections: usize,
    }

    impl Default for Neo4jStoreConfig {
        fn default() -> Self {
            Self {
                uri: std::env::var("NEO4J_URI")
                    .unwrap_or_else(|_| "neo4j://127.0.0.1:7687".to_string()),
                user: std::env::var("NEO4J_USER").unwrap_or_else(|_| "neo4j".to_string()),
                password: std::env::var("NEO4J_PASSWORD").unwrap_or_else(|_| "neo4j".to_string()),
                database: std::env::var("NEO4J_DATABASE").unwrap_or_else(|_| "neo4j".to_string()),
                query_timeout: Duration::from_secs(10),
                max_connections: 16,
            }
        }
    }

    /// Neo4j-backed graph store implementation.
    ///
    /// Features:
    /// - Per-kind uniqueness constraints created at connect time
    /// - Parameterized Cypher for every query
    /// - Bounded per-query timeouts surfacing `StoreUnavailable`
    /// - Pooled connections scoped per query
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use authgraph_store::store::neo4j_store::{Neo4jGraphStore, Neo4jStoreConfig};
    /// use authgraph_store::GraphStore;
    ///
    /// # async fn example() -> authgraph_store::StoreResult<()> {
    /// let config = Neo4jStoreConfig::default();
    /// let store = Neo4jGraphStore::connect(config).await?;
    ///
    /// store.create_operation("create_database").await?;
    /// store.create_permission_set("db_admin", &["create_database"]).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub struct Neo4jGraphStore {
        /// Pooled driver handle.
        graph: Graph,

        /// Configuration.
        config: Neo4jStoreConfig,

        /// Statistics.
        entities_created: AtomicU64,
        relations_created: AtomicU64,
        permission_checks: AtomicU64,
        permission_listings: AtomicU64,
    }

    impl std::fmt::Debug for Neo4jGraphStore {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("Neo4jGraphStore")
                .field("uri", &self.config.uri)
                .field("database", &self.config.database)
                .finish()
        }
    }

    /// Constraint violations carry this token in the server's status code
    /// (Neo.ClientError.Schema.ConstraintValidationFailed).
    fn is_constraint_violation(message: &str) -> bool {
        message.contains("ConstraintValidationFailed")
    }

    /// Classify a driver failure into the store taxonomy.
    ///
    /// When the caller is creating the entity named in `duplicate`, a
    /// uniqueness-constraint violation is a definite `DuplicateEntity`,
    /// never a retryable availability failure. The server may report the
    /// violation either when the statement is submitted or when its result
    /// rows are consumed, so both stages must classify through here.
    fn classify_failure(duplicate: Option<(EntityKind, &str)>, message: String) -> StoreError {
        if let Some((kind, name)) = duplicate {
            if is_constraint_violation(&message) {
                return StoreError::DuplicateEntity {
                    kind,
                    name: name.to_string(),
                };
            }
        }
        StoreError::StoreUnavailable(message)
    }

    /// Drive a driver future under a timeout, classifying any failure.
    ///
    /// An elapsed timeout surfaces `StoreUnavailable` rather than hanging
    /// the caller.
    async fn bounded_query<T, F>(
        limit: Duration,
        duplicate: Option<(EntityKind, &str)>,
        fut: F,
    ) -> StoreResult<T>
    where
        F: Future<Output = Result<T, neo4rs::Error>>,
    {
        match tokio::time::timeout(limit, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "backend query failed");
                Err(classify_failure(duplicate, e.to_string()))
            }
            Err(_) => Err(StoreError::StoreUnavailable(format!(
                "query timed out after {limit:?}"
            ))),
        }
    }

    impl Neo4jGraphStore {
        /// Connect to Neo4j and set up the schema.
        ///
        /// Creates the per-kind uniqueness constraints (`IF NOT EXISTS`) the
        /// store relies on, the way the uniqueness invariant requires.
        pub async fn connect(config: Neo4jStoreConfig) -> StoreResult<Self> {
            let driver_config = ConfigBuilder::default()
                .uri(&config.uri)
                .user(&config.user)
                .password(&config.password)
                .db(config.database.as_str())
                .max_connections(config.max_connections)
                .build()
                .map_err(|e| StoreError::StoreUnavailable(e.to_string()))?;

            let graph = Graph::connect(driver_config)
                .await
                .map_err(|e| StoreError::StoreUnavailable(e.to_string()))?;

            let store = Self {
                graph,
                config,
                entities_created: AtomicU64::new(0),
                relations_created: AtomicU64::new(0),
                permission_checks: AtomicU64::new(0),
                permission_listings: AtomicU64::new(0),
            };

            store.setup_schema().await?;
            Ok(store)
        }

        /// Connect with default configuration (env-driven).
        pub async fn with_defaults() -> StoreResult<Self> {
            Self::connect(Neo4jStoreConfig::default()).await
        }

        /// Create per-kind uniqueness constraints.
        ///
        /// Constraint-backed indexes cover name lookups, so no separate
        /// indexes are needed.
        async fn setup_schema(&self) -> StoreResult<()> {
            for kind in EntityKind::all() {
                let label = kind.as_str();
                let statement = format!(
                    "CREATE CONSTRAINT {}_name_unique IF NOT EXISTS \
                     FOR (n:{label}) REQUIRE n.name IS UNIQUE",
                    label.to_lowercase(),
                );
                self.bounded(self.graph.run(query(&statement))).await?;
            }

            tracing::debug!(uri = %self.config.uri, "schema constraints ensured");
            Ok(())
        }

        /// Run a driver future under the configured query timeout.
        async fn bounded<T, F>(&self, fut: F) -> StoreResult<T>
        where
            F: Future<Output = Result<T, neo4rs::Error>>,
        {
            bounded_query(self.config.query_timeout, None, fut).await
        }

        /// Create a single entity node, mapping constraint violations to
        /// `DuplicateEntity`.
        async fn create_node(&self, kind: EntityKind, name: &str) -> StoreResult<()> {
            let statement = format!("CREATE (:{} {{name: $name}})", kind.as_str());
            let q = query(&statement).param("name", name);

            bounded_query(self.config.query_timeout, Some((kind, name)), self.graph.run(q))
                .await?;

            self.entities_created.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(kind = %kind, name, "entity created");
            Ok(())
        }

        /// Check whether a single row came back for a query.
        async fn fetch_one(&self, q: Query) -> StoreResult<Option<neo4rs::Row>> {
            let mut rows = self.bounded(self.graph.execute(q)).await?;
            self.bounded(rows.next()).await
        }

        async fn node_exists(&self, kind: EntityKind, name: &str) -> StoreResult<bool> {
            let statement = format!(
                "MATCH (n:{} {{name: $name}}) RETURN count(n) AS total",
                kind.as_str()
            );
            let row = self
                .fetch_one(query(&statement).param("name", name))
                .await?;

            match row {
                Some(row) => {
                    let total: i64 = row
                        .get("total")
                        .map_err(|e| StoreError::StoreUnavailable(e.to_string()))?;
                    Ok(total > 0)
                }
                None => Ok(false),
            }
        }

        /// Link two existing nodes, reporting which endpoint was missing
        /// when the match comes up empty.
        async fn link(
            &self,
            relation: RelationKind,
            source: &str,
            target: &str,
        ) -> StoreResult<()> {
            let statement = format!(
                "MATCH (a:{} {{name: $source}}) \
                 MATCH (b:{} {{name: $target}}) \
                 MERGE (a)-[:{}]->(b) \
                 RETURN a.name AS linked",
                relation.source_kind().as_str(),
                relation.target_kind().as_str(),
                relation.as_str(),
            );
            let q = query(&statement)
                .param("source", source)
                .param("target", target);

            if self.fetch_one(q).await?.is_none() {
                // The match found nothing; report the missing endpoint.
                if !self.node_exists(relation.source_kind(), source).await? {
                    return Err(StoreError::unknown(relation.source_kind(), source));
                }
                return Err(StoreError::unknown(relation.target_kind(), target));
            }

            self.relations_created.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(relation = %relation, source, target, "relation created");
            Ok(())
        }
    }

    #[async_trait]
    impl GraphStore for Neo4jGraphStore {
        async fn create_operation(&self, name: &str) -> StoreResult<()> {
            self.create_node(EntityKind::Operation, name).await
        }

        async fn create_permission_set(&self, name: &str, operations: &[&str]) -> StoreResult<()> {
            // Deduplicate so the size guard below compares distinct names.
            let wanted: Vec<String> = operations
                .iter()
                .map(|s| s.to_string())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();

            // Single statement: the set node and all its INCLUDES edges are
            // created only when every referenced operation resolves, so a
            // failed call leaves nothing behind.
            let statement = "\
                OPTIONAL MATCH (o:Operation) WHERE o.name IN $operations \
                WITH collect(o) AS ops \
                WHERE size(ops) = size($operations) \
                CREATE (ps:PermissionSet {name: $set_name}) \
                FOREACH (op IN ops | CREATE (ps)-[:INCLUDES]->(op)) \
                RETURN size(ops) AS linked";
            let duplicate = Some((EntityKind::PermissionSet, name));

            // The server may report a duplicate name either on submission or
            // while the result row is consumed; both stages classify through
            // the duplicate-aware path.
            let mut attempts = 0;
            loop {
                attempts += 1;
                let q = query(statement)
                    .param("set_name", name)
                    .param("operations", wanted.clone());

                let mut rows =
                    bounded_query(self.config.query_timeout, duplicate, self.graph.execute(q))
                        .await?;
                let row = bounded_query(self.config.query_timeout, duplicate, rows.next()).await?;

                if let Some(row) = row {
                    let linked: i64 = row
                        .get("linked")
                        .map_err(|e| StoreError::StoreUnavailable(e.to_string()))?;
                    self.entities_created.fetch_add(1, Ordering::Relaxed);
                    self.relations_created
                        .fetch_add(linked as u64, Ordering::Relaxed);
                    tracing::debug!(name, operations = linked, "permission set created");
                    return Ok(());
                }

                // The size guard rejected the batch; name the first
                // operation that failed to resolve.
                for op in &wanted {
                    if !self.node_exists(EntityKind::Operation, op).await? {
                        return Err(StoreError::UnknownOperation(op.clone()));
                    }
                }

                // Every operation resolves now: a concurrent operation
                // create landed between the statement and the diagnosis.
                // The graph is consistent, so retry the create once.
                if attempts >= 2 {
                    return Err(StoreError::StoreUnavailable(
                        "permission set creation matched no row".to_string(),
                    ));
                }
                tracing::debug!(name, "size guard lost a race; retrying");
            }
        }

        async fn create_group(&self, name: &str) -> StoreResult<()> {
            self.create_node(EntityKind::Group, name).await
        }

        async fn assign_permission_set_to_group(&self, group: &str, set: &str) -> StoreResult<()> {
            self.link(RelationKind::HasPermissionSet, group, set).await
        }

        async fn create_user(&self, name: &str) -> StoreResult<()> {
            self.create_node(EntityKind::User, name).await
        }

        async fn add_user_to_group(&self, user: &str, group: &str) -> StoreResult<()> {
            self.link(RelationKind::MemberOf, user, group).await
        }

        async fn check_user_permission(
            &self,
            user: &str,
            operation: &str,
        ) -> StoreResult<PermissionCheck> {
            let statement = "\
                MATCH (u:User {name: $username}) \
                RETURN EXISTS { \
                    MATCH (u)-[:MEMBER_OF]->(:Group)\
                    -[:HAS_PERMISSION_SET]->(:PermissionSet)\
                    -[:INCLUDES]->(:Operation {name: $operation}) \
                } AS allowed";
            let q = query(statement)
                .param("username", user)
                .param("operation", operation);

            let row = self
                .fetch_one(q)
                .await?
                .ok_or_else(|| StoreError::UnknownUser(user.to_string()))?;
            let allowed: bool = row
                .get("allowed")
                .map_err(|e| StoreError::StoreUnavailable(e.to_string()))?;

            self.permission_checks.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(user, operation, allowed, "permission checked");
            Ok(PermissionCheck {
                user: user.to_string(),
                operation: operation.to_string(),
                allowed,
            })
        }

        async fn user_permissions(&self, user: &str) -> StoreResult<UserPermissions> {
            // OPTIONAL MATCH keeps one row (with a null operation) for a
            // user in no groups, so zero rows means the user is missing.
            let statement = "\
                MATCH (u:User {name: $username}) \
                OPTIONAL MATCH (u)-[:MEMBER_OF]->(:Group)\
                -[:HAS_PERMISSION_SET]->(:PermissionSet)\
                -[:INCLUDES]->(o:Operation) \
                RETURN DISTINCT o.name AS operation";
            let q = query(statement).param("username", user);

            let mut rows = self.bounded(self.graph.execute(q)).await?;
            let mut operations = BTreeSet::new();
            let mut user_seen = false;

            while let Some(row) = self.bounded(rows.next()).await? {
                user_seen = true;
                let operation: Option<String> = row
                    .get("operation")
                    .map_err(|e| StoreError::StoreUnavailable(e.to_string()))?;
                if let Some(operation) = operation {
                    operations.insert(operation);
                }
            }

            if !user_seen {
                return Err(StoreError::UnknownUser(user.to_string()));
            }

            self.permission_listings.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(user, count = operations.len(), "permissions listed");
            Ok(UserPermissions {
                user: user.to_string(),
                operations,
            })
        }

        async fn entity_exists(&self, kind: EntityKind, name: &str) -> StoreResult<bool> {
            self.node_exists(kind, name).await
        }

        async fn stats(&self) -> StoreStats {
            StoreStats {
                entities_created: self.entities_created.load(Ordering::Relaxed),
                relations_created: self.relations_created.load(Ordering::Relaxed),
                permission_checks: self.permission_checks.load(Ordering::Relaxed),
                permission_listings: self.permission_listings.load(Ordering::Relaxed),
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        const VIOLATION: &str = "Neo.ClientError.Schema.ConstraintValidationFailed: \
            Node(42) already exists with label `PermissionSet` and property \
            `name` = 'db_admin'";

        #[test]
        fn test_constraint_violation_detected_from_server_message() {
            assert!(is_constraint_violation(VIOLATION));
            assert!(!is_constraint_violation("connection reset by peer"));
        }

        #[test]
        fn test_classify_failure_maps_duplicate_during_create() {
            let err = classify_failure(
                Some((EntityKind::PermissionSet, "db_admin")),
                VIOLATION.to_string(),
            );
            assert!(matches!(
                err,
                StoreError::DuplicateEntity {
                    kind: EntityKind::PermissionSet,
                    ref name,
                } if name == "db_admin"
            ));
            // A duplicate is a definite state of the graph, never retryable.
            assert!(!err.is_retryable());
        }

        #[test]
        fn test_classify_failure_without_create_context() {
            // Outside a create there is no duplicate to report; any failure
            // is an availability problem.
            let err = classify_failure(None, VIOLATION.to_string());
            assert!(matches!(err, StoreError::StoreUnavailable(_)));

            let err = classify_failure(
                Some((EntityKind::User, "alice")),
                "connection reset by peer".to_string(),
            );
            assert!(matches!(err, StoreError::StoreUnavailable(_)));
        }

        #[tokio::test]
        async fn test_bounded_query_surfaces_timeout() {
            let result: StoreResult<()> = bounded_query(
                Duration::from_millis(5),
                None,
                std::future::pending::<Result<(), neo4rs::Error>>(),
            )
            .await;

            let err = result.unwrap_err();
            assert!(matches!(err, StoreError::StoreUnavailable(_)));
            assert!(err.is_retryable());
            assert!(err.to_string().contains("timed out"));
        }

        #[tokio::test]
        async fn test_bounded_query_passes_value_through() {
            let value = bounded_query(
                Duration::from_secs(1),
                None,
                std::future::ready(Ok::<_, neo4rs::Error>(7_i64)),
            )
            .await
            .unwrap();
            assert_eq!(value, 7);
        }
    }
}

#[cfg(feature = "neo4j")]
pub use neo4j_store::{Neo4jGraphStore, Neo4jStoreConfig};

// ============================================================================
// Tests
// ============================================================================
