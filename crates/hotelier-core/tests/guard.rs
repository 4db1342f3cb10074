// crates/hotelier-core/tests/guard.rs
// ============================================================================
// Module: Request Guard Tests
// Description: Guard decisions, error mapping, and audit emission.
// Purpose: Ensure the guard fails closed and never leaks resource existence.
// Dependencies: hotelier-core
// ============================================================================
//! ## Overview
//! Runs the guard against the in-memory store and a store that always fails,
//! capturing audit events in memory.

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
use std::sync::Arc;
use std::sync::Mutex;

use hotelier_core::AccessScope;
use hotelier_core::Action;
use hotelier_core::AuthorizationEngine;
use hotelier_core::CapabilityLevel;
use hotelier_core::ForbiddenReason;
use hotelier_core::GrantStore;
use hotelier_core::GuardAuditEvent;
use hotelier_core::GuardAuditSink;
use hotelier_core::GuardError;
use hotelier_core::GuardRequest;
use hotelier_core::InMemoryAccessStore;
use hotelier_core::ListingFilter;
use hotelier_core::Module;
use hotelier_core::ModulePermission;
use hotelier_core::OperationRequirement;
use hotelier_core::RequestGuard;
use hotelier_core::ResourceDirectory;
use hotelier_core::ResourceGrant;
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

// ============================================================================
// SECTION: Helpers
// ============================================================================

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<GuardAuditEvent>>,
}

impl RecordingSink {
    fn decisions(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|event| event.decision).collect()
    }
}

impl GuardAuditSink for RecordingSink {
    fn record(&self, event: &GuardAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

struct FailingStore;

fn unavailable() -> StoreError {
    StoreError::Io("disk offline".to_string())
}

impl UserDirectory for FailingStore {
    fn load_user(&self, _user_id: &UserId) -> Result<Option<UserRecord>, StoreError> {
        Err(unavailable())
    }

    fn save_user(&self, _user: &UserRecord) -> Result<(), StoreError> {
        Err(unavailable())
    }

    fn delete_user(&self, _user_id: &UserId) -> Result<bool, StoreError> {
        Err(unavailable())
    }

    fn list_users(&self, _filter: &ListingFilter) -> Result<Vec<UserRecord>, StoreError> {
        Err(unavailable())
    }
}

impl RoleStore for FailingStore {
    fn load_role(&self, _role_id: &RoleId) -> Result<Option<Role>, StoreError> {
        Err(unavailable())
    }

    fn save_role(&self, _role: &Role) -> Result<(), StoreError> {
        Err(unavailable())
    }

    fn delete_role(&self, _role_id: &RoleId) -> Result<bool, StoreError> {
        Err(unavailable())
    }

    fn list_roles(&self, _filter: &ListingFilter) -> Result<Vec<Role>, StoreError> {
        Err(unavailable())
    }
}

impl GrantStore for FailingStore {
    fn load_grant(&self, _user_id: &UserId) -> Result<Option<ResourceGrant>, StoreError> {
        Err(unavailable())
    }

    fn assign_grant(
        &self,
        _user_id: &UserId,
        _module: Module,
        _ids: BTreeSet<ResourceId>,
    ) -> Result<ResourceGrant, StoreError> {
        Err(unavailable())
    }

    fn delete_grant(&self, _user_id: &UserId) -> Result<bool, StoreError> {
        Err(unavailable())
    }
}

impl ResourceDirectory for FailingStore {
    fn get_resource(
        &self,
        _module: Module,
        _resource_id: &ResourceId,
    ) -> Result<Option<ResourceRecord>, StoreError> {
        Err(unavailable())
    }

    fn list_resources(
        &self,
        _module: Module,
        _filter: &ListingFilter,
    ) -> Result<Vec<ResourceRecord>, StoreError> {
        Err(unavailable())
    }

    fn save_resource(&self, _record: &ResourceRecord) -> Result<(), StoreError> {
        Err(unavailable())
    }

    fn delete_resource(
        &self,
        _module: Module,
        _resource_id: &ResourceId,
    ) -> Result<bool, StoreError> {
        Err(unavailable())
    }
}

/// Store with a property manager limited to property `h1`.
fn seeded_store() -> InMemoryAccessStore {
    let store = InMemoryAccessStore::new();
    let manager = Role::uniform("manager", "Property Manager", ModulePermission::NO_ACCESS)
        .with_permission(
            Module::Property,
            ModulePermission::new(CapabilityLevel::Update, AccessScope::Partial),
        )
        .with_permission(
            Module::Audit,
            ModulePermission::new(CapabilityLevel::Update, AccessScope::All),
        );
    store.save_role(&manager).unwrap();
    store.save_user(&UserRecord::new("pm", "manager")).unwrap();
    let granted = ["h1"].into_iter().map(ResourceId::new).collect();
    store.assign_grant(&UserId::new("pm"), Module::Property, granted).unwrap();
    for id in ["h1", "h2"] {
        store.save_resource(&ResourceRecord::new(Module::Property, id, id)).unwrap();
    }
    store
}

fn guard_over(store: SharedAccessStore) -> (RequestGuard, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let guard = RequestGuard::new(Arc::new(AuthorizationEngine::builtin()), store, sink.clone());
    (guard, sink)
}

fn request<'a>(
    requirement: OperationRequirement,
    user_id: Option<&'a UserId>,
    resource_id: Option<&'a ResourceId>,
) -> GuardRequest<'a> {
    GuardRequest {
        operation: "test_operation",
        requirement,
        user_id,
        resource_id,
        request_id: Some("req-1"),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn granted_resource_is_allowed_and_audited() {
    let (guard, sink) = guard_over(SharedAccessStore::from_store(seeded_store()));
    let user = UserId::new("pm");
    let target = ResourceId::new("h1");
    let requirement = OperationRequirement::resource(Module::Property, Action::Update);

    let authorized = guard.authorize(&request(requirement, Some(&user), Some(&target))).unwrap();
    assert_eq!(authorized.subject().user_id(), &user);
    assert_eq!(authorized.requirement(), requirement);
    assert_eq!(sink.decisions(), vec!["allow"]);
}

#[test]
fn missing_identity_is_unauthenticated() {
    let (guard, sink) = guard_over(SharedAccessStore::from_store(seeded_store()));
    let requirement = OperationRequirement::collection(Module::Property, Action::Read);
    let err = guard.authorize(&request(requirement, None, None)).unwrap_err();
    assert_eq!(err, GuardError::Unauthenticated);
    assert_eq!(sink.decisions(), vec!["deny"]);
}

#[test]
fn unknown_user_is_unauthenticated() {
    let (guard, _sink) = guard_over(SharedAccessStore::from_store(seeded_store()));
    let ghost = UserId::new("ghost");
    let requirement = OperationRequirement::collection(Module::Property, Action::Read);
    let err = guard.authorize(&request(requirement, Some(&ghost), None)).unwrap_err();
    assert_eq!(err, GuardError::Unauthenticated);
}

#[test]
fn insufficient_capability_is_forbidden() {
    let (guard, sink) = guard_over(SharedAccessStore::from_store(seeded_store()));
    let user = UserId::new("pm");
    let target = ResourceId::new("h1");
    let requirement = OperationRequirement::resource(Module::Property, Action::Delete);
    let err = guard.authorize(&request(requirement, Some(&user), Some(&target))).unwrap_err();
    assert_eq!(err, GuardError::Forbidden(ForbiddenReason::Capability));
    let events = sink.events.lock().unwrap();
    assert_eq!(events[0].reason.as_deref(), Some("forbidden: capability"));
}

#[test]
fn absent_and_inaccessible_ids_are_rejected_identically() {
    let (guard, _sink) = guard_over(SharedAccessStore::from_store(seeded_store()));
    let user = UserId::new("pm");
    let requirement = OperationRequirement::resource(Module::Property, Action::Read);
    let hidden = ResourceId::new("h2");
    let absent = ResourceId::new("does-not-exist");

    let hidden_err =
        guard.authorize(&request(requirement, Some(&user), Some(&hidden))).unwrap_err();
    let absent_err =
        guard.authorize(&request(requirement, Some(&user), Some(&absent))).unwrap_err();
    assert_eq!(hidden_err, absent_err);
    assert_eq!(hidden_err, GuardError::Forbidden(ForbiddenReason::Resource));
}

#[test]
fn resource_scoped_without_id_fails_closed() {
    let (guard, _sink) = guard_over(SharedAccessStore::from_store(seeded_store()));
    let user = UserId::new("pm");
    let requirement = OperationRequirement::resource(Module::Property, Action::Read);
    let err = guard.authorize(&request(requirement, Some(&user), None)).unwrap_err();
    assert_eq!(err, GuardError::Forbidden(ForbiddenReason::Resource));
}

#[test]
fn collection_operations_check_capability_only() {
    let (guard, _sink) = guard_over(SharedAccessStore::from_store(seeded_store()));
    let user = UserId::new("pm");
    let requirement = OperationRequirement::collection(Module::Audit, Action::Create);
    assert!(guard.authorize(&request(requirement, Some(&user), None)).is_ok());
    let requirement = OperationRequirement::collection(Module::Audit, Action::Delete);
    assert!(guard.authorize(&request(requirement, Some(&user), None)).is_err());
}

#[test]
fn store_failure_is_storage_unavailable() {
    let (guard, sink) = guard_over(SharedAccessStore::from_store(FailingStore));
    let user = UserId::new("pm");
    let requirement = OperationRequirement::collection(Module::Property, Action::Read);
    let err = guard.authorize(&request(requirement, Some(&user), None)).unwrap_err();
    assert!(matches!(err, GuardError::StorageUnavailable(_)));
    assert_eq!(sink.decisions(), vec!["error"]);
}

#[test]
fn user_with_missing_role_is_integrity_error() {
    let broken = CorruptRoleStore {
        inner: seeded_store(),
    };
    let (guard, sink) = guard_over(SharedAccessStore::from_store(broken));
    let user = UserId::new("pm");
    let requirement = OperationRequirement::collection(Module::Property, Action::Read);
    let err = guard.authorize(&request(requirement, Some(&user), None)).unwrap_err();
    assert!(matches!(err, GuardError::Integrity(_)));
    assert_eq!(sink.decisions(), vec!["error"]);
}

#[test]
fn role_changes_apply_to_the_next_request() {
    let store = seeded_store();
    let (guard, _sink) = guard_over(SharedAccessStore::from_store(store.clone()));
    let user = UserId::new("pm");
    let requirement = OperationRequirement::collection(Module::Portfolio, Action::Create);
    assert!(guard.authorize(&request(requirement, Some(&user), None)).is_err());

    let upgraded = store
        .load_role(&RoleId::new("manager"))
        .unwrap()
        .unwrap()
        .with_permission(Module::Portfolio, ModulePermission::FULL);
    store.save_role(&upgraded).unwrap();
    assert!(guard.authorize(&request(requirement, Some(&user), None)).is_ok());
}

#[test]
fn grant_changes_apply_to_the_next_request() {
    let store = seeded_store();
    let (guard, _sink) = guard_over(SharedAccessStore::from_store(store.clone()));
    let user = UserId::new("pm");
    let target = ResourceId::new("h2");
    let requirement = OperationRequirement::resource(Module::Property, Action::Read);
    assert!(guard.authorize(&request(requirement, Some(&user), Some(&target))).is_err());

    store.assign_grant(&user, Module::Property, [target.clone()].into_iter().collect()).unwrap();
    assert!(guard.authorize(&request(requirement, Some(&user), Some(&target))).is_ok());
}

/// Store that hides every role, simulating a user row pointing at a missing role.
struct CorruptRoleStore {
    inner: InMemoryAccessStore,
}

impl UserDirectory for CorruptRoleStore {
    fn load_user(&self, user_id: &UserId) -> Result<Option<UserRecord>, StoreError> {
        self.inner.load_user(user_id)
    }

    fn save_user(&self, user: &UserRecord) -> Result<(), StoreError> {
        self.inner.save_user(user)
    }

    fn delete_user(&self, user_id: &UserId) -> Result<bool, StoreError> {
        self.inner.delete_user(user_id)
    }

    fn list_users(&self, filter: &ListingFilter) -> Result<Vec<UserRecord>, StoreError> {
        self.inner.list_users(filter)
    }
}

impl RoleStore for CorruptRoleStore {
    fn load_role(&self, _role_id: &RoleId) -> Result<Option<Role>, StoreError> {
        Ok(None)
    }

    fn save_role(&self, role: &Role) -> Result<(), StoreError> {
        self.inner.save_role(role)
    }

    fn delete_role(&self, role_id: &RoleId) -> Result<bool, StoreError> {
        self.inner.delete_role(role_id)
    }

    fn list_roles(&self, filter: &ListingFilter) -> Result<Vec<Role>, StoreError> {
        self.inner.list_roles(filter)
    }
}

impl GrantStore for CorruptRoleStore {
    fn load_grant(&self, user_id: &UserId) -> Result<Option<ResourceGrant>, StoreError> {
        self.inner.load_grant(user_id)
    }

    fn assign_grant(
        &self,
        user_id: &UserId,
        module: Module,
        ids: BTreeSet<ResourceId>,
    ) -> Result<ResourceGrant, StoreError> {
        self.inner.assign_grant(user_id, module, ids)
    }

    fn delete_grant(&self, user_id: &UserId) -> Result<bool, StoreError> {
        self.inner.delete_grant(user_id)
    }
}

impl ResourceDirectory for CorruptRoleStore {
    fn get_resource(
        &self,
        module: Module,
        resource_id: &ResourceId,
    ) -> Result<Option<ResourceRecord>, StoreError> {
        self.inner.get_resource(module, resource_id)
    }

    fn list_resources(
        &self,
        module: Module,
        filter: &ListingFilter,
    ) -> Result<Vec<ResourceRecord>, StoreError> {
        self.inner.list_resources(module, filter)
    }

    fn save_resource(&self, record: &ResourceRecord) -> Result<(), StoreError> {
        self.inner.save_resource(record)
    }

    fn delete_resource(
        &self,
        module: Module,
        resource_id: &ResourceId,
    ) -> Result<bool, StoreError> {
        self.inner.delete_resource(module, resource_id)
    }
}
