// crates/hotelier-core/src/lib.rs
// ============================================================================
// Module: Hotelier Core Library
// Description: Public API surface for the Hotelier authorization engine.
// Purpose: Expose core types, store interfaces, and runtime decisions.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Hotelier core decides, for every operation in a multi-tenant hotel
//! portfolio backend, whether a user's role carries the capability for the
//! action and which resource ids of a module the user may see. Decisions are
//! pure functions of the role, the user's resource grant, and a static
//! permission catalog. Storage and transports plug in through the interfaces
//! module.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::AccessStore;
pub use interfaces::GrantStore;
pub use interfaces::ResourceDirectory;
pub use interfaces::RoleStore;
pub use interfaces::StoreError;
pub use interfaces::UserDirectory;
pub use runtime::AccessSubject;
pub use runtime::AuthorizationEngine;
pub use runtime::AuthorizedSubject;
pub use runtime::EngineError;
pub use runtime::ForbiddenReason;
pub use runtime::GuardAuditEvent;
pub use runtime::GuardAuditSink;
pub use runtime::GuardError;
pub use runtime::GuardRequest;
pub use runtime::InMemoryAccessStore;
pub use runtime::ListingPlan;
pub use runtime::NoopGuardAuditSink;
pub use runtime::OperationRequirement;
pub use runtime::RequestGuard;
pub use runtime::SharedAccessStore;
pub use runtime::filtered_listing;
