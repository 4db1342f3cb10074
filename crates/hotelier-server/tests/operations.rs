// crates/hotelier-server/tests/operations.rs
// ============================================================================
// Module: Operation Registry Tests
// Description: Checks on the declared requirement of every route.
// Purpose: Catch routes registered with the wrong module, action, or scoping.
// Dependencies: hotelier-server, hotelier-core
// ============================================================================

//! ## Overview
//! Checks on the declared requirement of every route.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions are permitted."
)]

use std::collections::BTreeSet;

use hotelier_core::Action;
use hotelier_core::Module;
use hotelier_server::Collection;
use hotelier_server::Operation;

#[test]
fn labels_are_unique() {
    let operations = Operation::all();
    let labels: BTreeSet<String> = operations.iter().map(|operation| operation.label()).collect();
    assert_eq!(labels.len(), operations.len());
}

#[test]
fn every_collection_round_trips_its_path() {
    for collection in Collection::ALL {
        assert_eq!(Collection::from_path(collection.path()), Some(collection));
    }
    assert_eq!(Collection::from_path("Properties"), None);
}

#[test]
fn single_resource_operations_are_resource_scoped() {
    for operation in Operation::all() {
        let requirement = operation.requirement();
        let expects_id = matches!(
            operation,
            Operation::GetResource(_)
                | Operation::UpdateResource(_)
                | Operation::DeleteResource(_)
                | Operation::GetRole
                | Operation::UpdateRole
                | Operation::DeleteRole
                | Operation::GetUser
                | Operation::UpdateUser
                | Operation::DeleteUser
                | Operation::AssignGrant
        );
        assert_eq!(requirement.resource_scoped, expects_id, "{}", operation.label());
    }
}

#[test]
fn collections_map_to_their_modules() {
    let requirement = Operation::DeleteResource(Collection::BankDetails).requirement();
    assert_eq!(requirement.module, Module::BankDetails);
    assert_eq!(requirement.action, Action::Delete);
    let requirement = Operation::AssignGrant.requirement();
    assert_eq!((requirement.module, requirement.action), (Module::User, Action::Update));
    let requirement = Operation::CreateRole.requirement();
    assert_eq!((requirement.module, requirement.action), (Module::UserRole, Action::Create));
}

#[test]
fn every_module_is_reachable() {
    let covered: BTreeSet<Module> =
        Operation::all().into_iter().map(|operation| operation.requirement().module).collect();
    assert_eq!(covered.len(), Module::ALL.len());
}
