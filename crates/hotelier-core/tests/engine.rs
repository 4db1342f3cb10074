// crates/hotelier-core/tests/engine.rs
// ============================================================================
// Module: Authorization Engine Tests
// Description: Capability and visibility decisions for roles and grants.
// Purpose: Pin down scope resolution, thresholds, and end-to-end scenarios.
// Dependencies: hotelier-core
// ============================================================================
//! ## Overview
//! Exercises `can_perform`, `resolve_accessible_ids`, and
//! `can_access_resource` against the built-in catalog.

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

use hotelier_core::AccessScope;
use hotelier_core::AccessSubject;
use hotelier_core::AccessibleIds;
use hotelier_core::Action;
use hotelier_core::AuthorizationEngine;
use hotelier_core::CapabilityLevel;
use hotelier_core::CatalogEntry;
use hotelier_core::CatalogError;
use hotelier_core::EngineError;
use hotelier_core::Module;
use hotelier_core::ModulePermission;
use hotelier_core::PermissionCatalog;
use hotelier_core::ResourceGrant;
use hotelier_core::ResourceId;
use hotelier_core::Role;
use hotelier_core::UserRecord;

fn role_with(module: Module, capability: CapabilityLevel, scope: AccessScope) -> Role {
    Role::uniform("r", "Role R", ModulePermission::NO_ACCESS)
        .with_permission(module, ModulePermission::new(capability, scope))
}

fn subject(role: Role, grant: Option<ResourceGrant>) -> AccessSubject {
    let user = UserRecord::new("u", role.role_id.clone());
    AccessSubject::new(user, role, grant)
}

fn ids(values: &[&str]) -> BTreeSet<ResourceId> {
    values.iter().map(|value| ResourceId::new(*value)).collect()
}

#[test]
fn scenario_a_partial_portfolio_resolves_to_granted_ids() {
    let engine = AuthorizationEngine::builtin();
    let role = role_with(Module::Portfolio, CapabilityLevel::All, AccessScope::Partial);
    let grant = ResourceGrant::new("u").with_ids(Module::Portfolio, ["p1", "p2"]);
    let subject = subject(role, Some(grant));

    let resolved = engine.resolve_accessible_ids(&subject, Module::Portfolio).unwrap();
    assert_eq!(resolved, AccessibleIds::Only(ids(&["p1", "p2"])));
    assert!(
        !engine.can_access_resource(&subject, Module::Portfolio, &ResourceId::new("p3")).unwrap()
    );
    assert!(
        engine.can_access_resource(&subject, Module::Portfolio, &ResourceId::new("p1")).unwrap()
    );
}

#[test]
fn scenario_b_partial_on_user_role_degrades_to_empty() {
    let engine = AuthorizationEngine::builtin();
    let role = role_with(Module::UserRole, CapabilityLevel::View, AccessScope::Partial);
    let grant = ResourceGrant::new("u").with_ids(Module::UserRole, ["admin"]);
    let subject = subject(role, Some(grant));

    assert!(engine.can_perform(&subject.role, Module::UserRole, Action::Read).unwrap());
    let resolved = engine.resolve_accessible_ids(&subject, Module::UserRole).unwrap();
    assert!(resolved.is_empty());
}

#[test]
fn scenario_c_update_capability_excludes_delete() {
    let engine = AuthorizationEngine::builtin();
    let role = role_with(Module::Audit, CapabilityLevel::Update, AccessScope::All);

    assert!(!engine.can_perform(&role, Module::Audit, Action::Delete).unwrap());
    assert!(engine.can_perform(&role, Module::Audit, Action::Create).unwrap());
    assert!(engine.can_perform(&role, Module::Audit, Action::Update).unwrap());
    assert!(engine.can_perform(&role, Module::Audit, Action::Read).unwrap());
}

#[test]
fn scope_none_is_empty_for_every_capability() {
    let engine = AuthorizationEngine::builtin();
    for module in Module::ALL {
        for capability in CapabilityLevel::ALL {
            let role = role_with(module, capability, AccessScope::None);
            let grant = ResourceGrant::new("u").with_ids(module, ["x1"]);
            let subject = subject(role, Some(grant));
            let resolved = engine.resolve_accessible_ids(&subject, module).unwrap();
            assert!(resolved.is_empty(), "{module} {capability:?}");
        }
    }
}

#[test]
fn scope_all_ignores_grant_contents() {
    let engine = AuthorizationEngine::builtin();
    for module in Module::ALL {
        let role = role_with(module, CapabilityLevel::View, AccessScope::All);
        let grant = ResourceGrant::new("u").with_ids(module, ["x"]);
        let with_grant = subject(role.clone(), Some(grant));
        let without_grant = subject(role, None);
        assert_eq!(engine.resolve_accessible_ids(&with_grant, module).unwrap(), AccessibleIds::All);
        assert_eq!(
            engine.resolve_accessible_ids(&without_grant, module).unwrap(),
            AccessibleIds::All
        );
    }
}

#[test]
fn partial_without_grant_record_is_empty() {
    let engine = AuthorizationEngine::builtin();
    let role = role_with(Module::Property, CapabilityLevel::Update, AccessScope::Partial);
    let subject = subject(role, None);
    let resolved = engine.resolve_accessible_ids(&subject, Module::Property).unwrap();
    assert_eq!(resolved, AccessibleIds::none());
}

#[test]
fn partial_grant_for_other_module_is_not_borrowed() {
    let engine = AuthorizationEngine::builtin();
    let role = role_with(Module::Property, CapabilityLevel::Update, AccessScope::Partial);
    let grant = ResourceGrant::new("u").with_ids(Module::Portfolio, ["p1"]);
    let subject = subject(role, Some(grant));
    assert!(engine.resolve_accessible_ids(&subject, Module::Property).unwrap().is_empty());
}

#[test]
fn resolved_set_is_a_copy() {
    let engine = AuthorizationEngine::builtin();
    let role = role_with(Module::Portfolio, CapabilityLevel::View, AccessScope::Partial);
    let grant = ResourceGrant::new("u").with_ids(Module::Portfolio, ["p1"]);
    let subject = subject(role, Some(grant));

    let AccessibleIds::Only(mut resolved) =
        engine.resolve_accessible_ids(&subject, Module::Portfolio).unwrap()
    else {
        panic!("expected explicit ids");
    };
    resolved.insert(ResourceId::new("p9"));

    let again = engine.resolve_accessible_ids(&subject, Module::Portfolio).unwrap();
    assert_eq!(again, AccessibleIds::Only(ids(&["p1"])));
}

#[test]
fn restricted_modules_require_all_for_writes() {
    let engine = AuthorizationEngine::builtin();
    for module in [Module::UserRole, Module::SystemSettings] {
        let role = role_with(module, CapabilityLevel::Update, AccessScope::All);
        assert!(engine.can_perform(&role, module, Action::Read).unwrap());
        assert!(!engine.can_perform(&role, module, Action::Create).unwrap());
        assert!(!engine.can_perform(&role, module, Action::Update).unwrap());
        assert!(!engine.can_perform(&role, module, Action::Delete).unwrap());
    }
}

#[test]
fn view_grants_only_read() {
    let engine = AuthorizationEngine::builtin();
    let role = role_with(Module::Property, CapabilityLevel::View, AccessScope::All);
    assert!(engine.can_perform(&role, Module::Property, Action::Read).unwrap());
    assert!(!engine.can_perform(&role, Module::Property, Action::Create).unwrap());
    assert!(!engine.can_perform(&role, Module::Property, Action::Update).unwrap());
    assert!(!engine.can_perform(&role, Module::Property, Action::Delete).unwrap());
}

#[test]
fn role_missing_module_entry_is_integrity_error() {
    let engine = AuthorizationEngine::builtin();
    let mut role = Role::uniform("broken", "Broken", ModulePermission::FULL);
    role.permissions.remove(&Module::BankDetails);

    let err = engine.can_perform(&role, Module::BankDetails, Action::Read).unwrap_err();
    assert!(matches!(err, EngineError::MissingRolePermission { module: Module::BankDetails, .. }));
    assert!(role.validate().is_err());
}

#[test]
fn catalog_missing_entry_is_integrity_error() {
    let catalog =
        PermissionCatalog::from_entries([CatalogEntry::standard(Module::Portfolio, true)]).unwrap();
    assert!(!catalog.is_complete());
    let engine = AuthorizationEngine::new(catalog);
    let role = Role::uniform("r", "R", ModulePermission::FULL);

    let err = engine.can_perform(&role, Module::Property, Action::Read).unwrap_err();
    assert_eq!(err, EngineError::Catalog(CatalogError::MissingEntry(Module::Property)));
    assert!(engine.can_perform(&role, Module::Portfolio, Action::Delete).unwrap());
}

#[test]
fn engine_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AuthorizationEngine>();
}
