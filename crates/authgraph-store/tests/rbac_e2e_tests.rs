//! End-to-end tests for the authorization graph store.
//!
//! These tests run the full provisioning flow against the in-memory backend:
//! a catalogue of operations, three permission sets, three groups and three
//! users, then verify that permission checks and listings agree with the
//! graph that was built.
//!
//! Scenario:
//! 1. db_admin     ⊇ {create_database, delete_database, read_data, write_data}
//! 2. db_operator  ⊇ {read_data, write_data}
//! 3. system_admin ⊇ {manage_users, view_logs, configure_system}
//! 4. Alice → Database Administrators → db_admin
//! 5. Bob → Database Operators → db_operator
//! 6. Charlie → System Administrators → system_admin

use authgraph_store::{GraphStore, MemoryGraphStore, StoreError};

const OPERATIONS: &[&str] = &[
    "create_database",
    "delete_database",
    "read_data",
    "write_data",
    "manage_users",
    "view_logs",
    "configure_system",
];

/// Provision the full demo graph.
async fn provisioned_store() -> MemoryGraphStore {
    let store = MemoryGraphStore::new();

    for op in OPERATIONS {
        store.create_operation(op).await.unwrap();
    }

    store
        .create_permission_set(
            "db_admin",
            &["create_database", "delete_database", "read_data", "write_data"],
        )
        .await
        .unwrap();
    store
        .create_permission_set("db_operator", &["read_data", "write_data"])
        .await
        .unwrap();
    store
        .create_permission_set(
            "system_admin",
            &["manage_users", "view_logs", "configure_system"],
        )
        .await
        .unwrap();

    for group in ["Database Administrators", "Database Operators", "System Administrators"] {
        store.create_group(group).await.unwrap();
    }

    store
        .assign_permission_set_to_group("Database Administrators", "db_admin")
        .await
        .unwrap();
    store
        .assign_permission_set_to_group("Database Operators", "db_operator")
        .await
        .unwrap();
    store
        .assign_permission_set_to_group("System Administrators", "system_admin")
        .await
        .unwrap();

    for user in ["Alice", "Bob", "Charlie"] {
        store.create_user(user).await.unwrap();
    }

    store
        .add_user_to_group("Alice", "Database Administrators")
        .await
        .unwrap();
    store
        .add_user_to_group("Bob", "Database Operators")
        .await
        .unwrap();
    store
        .add_user_to_group("Charlie", "System Administrators")
        .await
        .unwrap();

    store
}

#[tokio::test]
async fn test_end_to_end_checks() {
    let store = provisioned_store().await;

    let alice = store
        .check_user_permission("Alice", "create_database")
        .await
        .unwrap();
    assert!(alice.allowed);

    let bob = store.check_user_permission("Bob", "read_data").await.unwrap();
    assert!(bob.allowed);

    let charlie = store
        .check_user_permission("Charlie", "manage_users")
        .await
        .unwrap();
    assert!(charlie.allowed);

    // Negative answers, not errors: the operation exists but is out of
    // Alice's reach...
    let denied = store
        .check_user_permission("Alice", "manage_users")
        .await
        .unwrap();
    assert!(!denied.allowed);

    // ...and an operation that was never created behaves the same, since
    // the check is on traversal existence.
    let denied = store
        .check_user_permission("Alice", "reboot_cluster")
        .await
        .unwrap();
    assert!(!denied.allowed);
}

#[tokio::test]
async fn test_end_to_end_listings() {
    let store = provisioned_store().await;

    let alice = store.user_permissions("Alice").await.unwrap();
    assert_eq!(
        alice.operations.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["create_database", "delete_database", "read_data", "write_data"],
    );

    let bob = store.user_permissions("Bob").await.unwrap();
    assert_eq!(bob.len(), 2);
    assert!(bob.contains("read_data"));
    assert!(bob.contains("write_data"));

    let charlie = store.user_permissions("Charlie").await.unwrap();
    assert_eq!(charlie.len(), 3);
    assert!(charlie.contains("configure_system"));
}

#[tokio::test]
async fn test_check_agrees_with_listing() {
    let store = provisioned_store().await;

    // check(u, op) must be true exactly when op is in the listing for u.
    for user in ["Alice", "Bob", "Charlie"] {
        let listing = store.user_permissions(user).await.unwrap();
        for op in OPERATIONS {
            let check = store.check_user_permission(user, op).await.unwrap();
            assert_eq!(
                check.allowed,
                listing.contains(op),
                "check/listing disagree for {user} on {op}"
            );
        }
    }
}

#[tokio::test]
async fn test_shared_operations_collapse_across_groups() {
    let store = provisioned_store().await;

    // Put Alice in the operators group too; db_admin and db_operator both
    // include read_data and write_data.
    store
        .add_user_to_group("Alice", "Database Operators")
        .await
        .unwrap();

    let alice = store.user_permissions("Alice").await.unwrap();
    assert_eq!(alice.len(), 4);
}

#[tokio::test]
async fn test_provisioning_is_fail_fast() {
    let store = provisioned_store().await;

    // Re-running any create from the flow is a duplicate, with state intact.
    let err = store.create_user("Alice").await.unwrap_err();
    assert!(matches!(err, StoreError::DuplicateEntity { .. }));
    let err = store.create_group("Database Operators").await.unwrap_err();
    assert!(matches!(err, StoreError::DuplicateEntity { .. }));
    let err = store.create_operation("read_data").await.unwrap_err();
    assert!(matches!(err, StoreError::DuplicateEntity { .. }));

    let alice = store.user_permissions("Alice").await.unwrap();
    assert_eq!(alice.len(), 4);

    // A permission set referencing a typo'd operation fails atomically.
    let err = store
        .create_permission_set("auditor", &["view_logs", "view_audit_trail"])
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::UnknownOperation(op) if op == "view_audit_trail"));
    assert!(store
        .assign_permission_set_to_group("System Administrators", "auditor")
        .await
        .is_err());
}
