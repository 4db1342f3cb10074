// crates/hotelier-core/src/runtime/mod.rs
// ============================================================================
// Module: Hotelier Runtime
// Description: Authorization engine, request guard, listing contract, stores.
// Purpose: Turn role and grant snapshots into allow/deny decisions.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules implement the authorization decisions. Every transport
//! calls into the same [`RequestGuard`] and [`filtered_listing`] so the rules
//! cannot drift between entry points.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod engine;
pub mod guard;
pub mod listing;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use engine::AccessSubject;
pub use engine::AuthorizationEngine;
pub use engine::EngineError;
pub use guard::AuthorizedSubject;
pub use guard::ForbiddenReason;
pub use guard::GuardAuditEvent;
pub use guard::GuardAuditSink;
pub use guard::GuardError;
pub use guard::GuardRequest;
pub use guard::NoopGuardAuditSink;
pub use guard::OperationRequirement;
pub use guard::RequestGuard;
pub use listing::ListingPlan;
pub use listing::filtered_listing;
pub use store::InMemoryAccessStore;
pub use store::SharedAccessStore;
