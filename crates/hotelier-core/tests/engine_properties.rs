// crates/hotelier-core/tests/engine_properties.rs
// ============================================================================
// Module: Authorization Engine Property Tests
// Description: Property-based coverage of engine decisions.
// Purpose: Check monotonicity and agreement across arbitrary roles and grants.
// Dependencies: hotelier-core, proptest
// ============================================================================
//! ## Overview
//! Generates arbitrary (capability, scope) pairs and grant sets and checks
//! the engine's algebraic properties hold for every module.

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
use hotelier_core::Module;
use hotelier_core::ModulePermission;
use hotelier_core::ResourceGrant;
use hotelier_core::ResourceId;
use hotelier_core::Role;
use hotelier_core::UserRecord;
use proptest::prelude::*;

fn module_strategy() -> impl Strategy<Value = Module> {
    proptest::sample::select(Module::ALL.to_vec())
}

fn action_strategy() -> impl Strategy<Value = Action> {
    proptest::sample::select(Action::ALL.to_vec())
}

fn capability_strategy() -> impl Strategy<Value = CapabilityLevel> {
    proptest::sample::select(CapabilityLevel::ALL.to_vec())
}

fn scope_strategy() -> impl Strategy<Value = AccessScope> {
    proptest::sample::select(AccessScope::ALL.to_vec())
}

fn id_set_strategy() -> impl Strategy<Value = BTreeSet<String>> {
    proptest::collection::btree_set("[a-z][a-z0-9]{0,6}", 0..8)
}

fn subject_for(
    module: Module,
    capability: CapabilityLevel,
    scope: AccessScope,
    granted: &BTreeSet<String>,
) -> AccessSubject {
    let role = Role::uniform("r", "R", ModulePermission::NO_ACCESS)
        .with_permission(module, ModulePermission::new(capability, scope));
    let grant = ResourceGrant::new("u").with_ids(module, granted.iter().cloned());
    AccessSubject::new(UserRecord::new("u", "r"), role, Some(grant))
}

proptest! {
    #[test]
    fn can_perform_is_monotone_in_capability(
        module in module_strategy(),
        action in action_strategy(),
        lower in capability_strategy(),
        higher in capability_strategy(),
    ) {
        prop_assume!(lower <= higher);
        let engine = AuthorizationEngine::builtin();
        let low = Role::uniform("l", "L", ModulePermission::new(lower, AccessScope::All));
        let high = Role::uniform("h", "H", ModulePermission::new(higher, AccessScope::All));
        if engine.can_perform(&low, module, action).unwrap() {
            prop_assert!(engine.can_perform(&high, module, action).unwrap());
        }
    }

    #[test]
    fn all_capability_grants_every_action(module in module_strategy(), action in action_strategy()) {
        let engine = AuthorizationEngine::builtin();
        let permission = ModulePermission::new(CapabilityLevel::All, AccessScope::None);
        let role = Role::uniform("a", "A", permission);
        prop_assert!(engine.can_perform(&role, module, action).unwrap());
    }

    #[test]
    fn access_check_agrees_with_resolved_set(
        module in module_strategy(),
        capability in capability_strategy(),
        scope in scope_strategy(),
        granted in id_set_strategy(),
        probe in "[a-z][a-z0-9]{0,6}",
    ) {
        let engine = AuthorizationEngine::builtin();
        let subject = subject_for(module, capability, scope, &granted);
        let probe = ResourceId::new(probe);
        let resolved = engine.resolve_accessible_ids(&subject, module).unwrap();
        let allowed = engine.can_access_resource(&subject, module, &probe).unwrap();
        prop_assert_eq!(allowed, resolved.contains(&probe));
    }

    #[test]
    fn partial_resolution_matches_catalog_support(
        module in module_strategy(),
        capability in capability_strategy(),
        granted in id_set_strategy(),
    ) {
        let engine = AuthorizationEngine::builtin();
        let subject = subject_for(module, capability, AccessScope::Partial, &granted);
        let first = engine.resolve_accessible_ids(&subject, module).unwrap();
        let second = engine.resolve_accessible_ids(&subject, module).unwrap();
        prop_assert_eq!(&first, &second);
        if engine.catalog().supports_partial(module).unwrap() {
            let expected: BTreeSet<ResourceId> = granted.iter().map(ResourceId::new).collect();
            prop_assert_eq!(first, AccessibleIds::Only(expected));
        } else {
            prop_assert!(first.is_empty());
        }
    }

    #[test]
    fn scope_all_is_sentinel_for_any_grant(
        module in module_strategy(),
        capability in capability_strategy(),
        granted in id_set_strategy(),
    ) {
        let engine = AuthorizationEngine::builtin();
        let subject = subject_for(module, capability, AccessScope::All, &granted);
        let resolved = engine.resolve_accessible_ids(&subject, module).unwrap();
        prop_assert_eq!(resolved, AccessibleIds::All);
    }
}
