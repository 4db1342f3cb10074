// crates/hotelier-core/tests/store.rs
// ============================================================================
// Module: In-Memory Access Store Tests
// Description: Referential rules and grant lifecycle of the in-memory store.
// Purpose: Validate the behavior every store backend must share.
// Dependencies: hotelier-core
// ============================================================================

//! ## Overview
//! Referential rules and grant lifecycle of the in-memory store.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeSet;

use hotelier_core::GrantStore;
use hotelier_core::InMemoryAccessStore;
use hotelier_core::ListingFilter;
use hotelier_core::Module;
use hotelier_core::ModulePermission;
use hotelier_core::ResourceDirectory;
use hotelier_core::ResourceId;
use hotelier_core::ResourceRecord;
use hotelier_core::Role;
use hotelier_core::RoleId;
use hotelier_core::RoleStore;
use hotelier_core::SharedAccessStore;
use hotelier_core::StoreError;
use hotelier_core::UserDirectory;
use hotelier_core::UserId;
use hotelier_core::UserRecord;

fn ids(values: &[&str]) -> BTreeSet<ResourceId> {
    values.iter().map(|value| ResourceId::new(*value)).collect()
}

fn store_with_user() -> InMemoryAccessStore {
    let store = InMemoryAccessStore::new();
    store.save_role(&Role::uniform("staff", "Staff", ModulePermission::NO_ACCESS)).unwrap();
    store.save_user(&UserRecord::new("u1", "staff")).unwrap();
    store
}

#[test]
fn role_in_use_cannot_be_deleted() {
    let store = store_with_user();
    let err = store.delete_role(&RoleId::new("staff")).unwrap_err();
    assert!(matches!(err, StoreError::RoleInUse(role) if role.as_str() == "staff"));

    store.delete_user(&UserId::new("u1")).unwrap();
    assert!(store.delete_role(&RoleId::new("staff")).unwrap());
    assert!(!store.delete_role(&RoleId::new("staff")).unwrap());
}

#[test]
fn user_requires_existing_role() {
    let store = InMemoryAccessStore::new();
    let err = store.save_user(&UserRecord::new("u1", "nope")).unwrap_err();
    assert!(matches!(err, StoreError::Invalid(_)));
}

#[test]
fn invalid_role_is_rejected() {
    let store = InMemoryAccessStore::new();
    let mut role = Role::uniform("r", "R", ModulePermission::FULL);
    role.permissions.remove(&Module::Audit);
    assert!(matches!(store.save_role(&role), Err(StoreError::Invalid(_))));
    let blank = Role::uniform("r", "   ", ModulePermission::FULL);
    assert!(matches!(store.save_role(&blank), Err(StoreError::Invalid(_))));
}

#[test]
fn grant_is_created_lazily_and_updated_in_place() {
    let store = store_with_user();
    let user = UserId::new("u1");
    assert!(store.load_grant(&user).unwrap().is_none());

    store.assign_grant(&user, Module::Portfolio, ids(&["p1"])).unwrap();
    let grant = store.assign_grant(&user, Module::Property, ids(&["h1", "h2"])).unwrap();
    assert_eq!(grant.ids_for(Module::Portfolio), Some(&ids(&["p1"])));
    assert_eq!(grant.ids_for(Module::Property), Some(&ids(&["h1", "h2"])));

    store.assign_grant(&user, Module::Portfolio, ids(&["p2"])).unwrap();
    let loaded = store.load_grant(&user).unwrap().unwrap();
    assert_eq!(loaded.ids_for(Module::Portfolio), Some(&ids(&["p2"])));
}

#[test]
fn grant_requires_existing_user() {
    let store = InMemoryAccessStore::new();
    let err =
        store.assign_grant(&UserId::new("ghost"), Module::Portfolio, ids(&["p1"])).unwrap_err();
    assert!(matches!(err, StoreError::Invalid(_)));
}

#[test]
fn deleting_user_deletes_grant() {
    let store = store_with_user();
    let user = UserId::new("u1");
    store.assign_grant(&user, Module::Portfolio, ids(&["p1"])).unwrap();
    assert!(store.delete_user(&user).unwrap());
    assert!(store.load_grant(&user).unwrap().is_none());
    assert!(!store.delete_user(&user).unwrap());
}

#[test]
fn resources_are_listed_per_module_and_filter() {
    let store = InMemoryAccessStore::new();
    store.save_resource(&ResourceRecord::new(Module::Portfolio, "p1", "Coastal")).unwrap();
    store.save_resource(&ResourceRecord::new(Module::Portfolio, "p2", "Alpine")).unwrap();
    store.save_resource(&ResourceRecord::new(Module::Property, "p1", "Harbor Inn")).unwrap();

    let all = store.list_resources(Module::Portfolio, &ListingFilter::Unrestricted).unwrap();
    assert_eq!(all.len(), 2);
    let only = store
        .list_resources(Module::Portfolio, &ListingFilter::Restricted(ids(&["p2", "p9"])))
        .unwrap();
    assert_eq!(only.len(), 1);
    assert_eq!(only[0].name, "Alpine");

    assert!(store.delete_resource(Module::Property, &ResourceId::new("p1")).unwrap());
    assert!(store.get_resource(Module::Property, &ResourceId::new("p1")).unwrap().is_none());
    assert!(store.get_resource(Module::Portfolio, &ResourceId::new("p1")).unwrap().is_some());
}

#[test]
fn shared_wrapper_delegates_to_inner_store() {
    let inner = store_with_user();
    let shared = SharedAccessStore::from_store(inner.clone());
    shared.save_role(&Role::uniform("admin", "Admin", ModulePermission::FULL)).unwrap();
    assert!(inner.load_role(&RoleId::new("admin")).unwrap().is_some());
    let users = shared.list_users(&ListingFilter::Restricted(ids(&["u1"]))).unwrap();
    assert_eq!(users.len(), 1);
}
