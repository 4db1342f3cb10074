// crates/hotelier-core/src/runtime/guard.rs
// ============================================================================
// Module: Request Guard
// Description: Per-operation authorization gate run before business logic.
// Purpose: Load role and grant fresh, ask the engine, and audit the decision.
// Dependencies: crate::core, crate::interfaces, crate::runtime, serde, thiserror
// ============================================================================

//! ## Overview
//! The [`RequestGuard`] is the single enforcement point for protected
//! operations. For every call it:
//! 1. rejects a missing identity as [`GuardError::Unauthenticated`];
//! 2. loads the user, role, and grant from the store (no caching);
//! 3. checks capability through the engine;
//! 4. for resource-scoped operations, checks visibility of the target id;
//! 5. records exactly one [`GuardAuditEvent`].
//!
//! Store and integrity failures surface as errors and are never turned into
//! an allow decision. The guard never writes role or grant state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use thiserror::Error;

use crate::core::Action;
use crate::core::Module;
use crate::core::ResourceId;
use crate::core::UserId;
use crate::interfaces::GrantStore;
use crate::interfaces::RoleStore;
use crate::interfaces::StoreError;
use crate::interfaces::UserDirectory;
use crate::runtime::engine::AccessSubject;
use crate::runtime::engine::AuthorizationEngine;
use crate::runtime::engine::EngineError;
use crate::runtime::store::SharedAccessStore;

// ============================================================================
// SECTION: Requirements
// ============================================================================

/// Declared requirement of a protected operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationRequirement {
    /// Module the operation touches.
    pub module: Module,
    /// Action performed on the module.
    pub action: Action,
    /// Whether the operation targets one specific resource id.
    pub resource_scoped: bool,
}

impl OperationRequirement {
    /// Requirement for an operation over a whole collection.
    #[must_use]
    pub const fn collection(module: Module, action: Action) -> Self {
        Self {
            module,
            action,
            resource_scoped: false,
        }
    }

    /// Requirement for an operation on a single resource.
    #[must_use]
    pub const fn resource(module: Module, action: Action) -> Self {
        Self {
            module,
            action,
            resource_scoped: true,
        }
    }
}

/// Inputs for one guard decision.
#[derive(Debug, Clone, Copy)]
pub struct GuardRequest<'a> {
    /// Operation label used in audit events.
    pub operation: &'a str,
    /// Declared requirement of the operation.
    pub requirement: OperationRequirement,
    /// Authenticated user, if any.
    pub user_id: Option<&'a UserId>,
    /// Target resource for resource-scoped operations.
    pub resource_id: Option<&'a ResourceId>,
    /// Optional request identifier for correlation.
    pub request_id: Option<&'a str>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Which check rejected a request. Callers see the same response for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ForbiddenReason {
    /// Role level is below the catalog minimum.
    Capability,
    /// Target id is outside the accessible-id-set (or missing).
    Resource,
}

impl ForbiddenReason {
    /// Returns the audit label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Capability => "capability",
            Self::Resource => "resource",
        }
    }
}

/// Guard failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    /// No identity, or the identity does not name a known user.
    #[error("unauthenticated")]
    Unauthenticated,
    /// Identity is known but the operation is not permitted.
    #[error("forbidden: {}", .0.as_str())]
    Forbidden(ForbiddenReason),
    /// Role, grant, or catalog data is malformed.
    #[error("integrity error: {0}")]
    Integrity(String),
    /// The store could not be read.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl GuardError {
    /// Maps a store failure onto the guard taxonomy.
    #[must_use]
    pub fn from_store(err: StoreError) -> Self {
        if err.is_transient() {
            Self::StorageUnavailable(err.to_string())
        } else {
            Self::Integrity(err.to_string())
        }
    }

    /// Returns the audit decision label.
    #[must_use]
    pub const fn decision(&self) -> &'static str {
        match self {
            Self::Unauthenticated | Self::Forbidden(_) => "deny",
            Self::Integrity(_) | Self::StorageUnavailable(_) => "error",
        }
    }
}

impl From<EngineError> for GuardError {
    fn from(err: EngineError) -> Self {
        Self::Integrity(err.to_string())
    }
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit record for one guard decision.
#[derive(Debug, Clone, Serialize)]
pub struct GuardAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Request identifier when provided.
    pub request_id: Option<String>,
    /// Decision label: `allow`, `deny`, or `error`.
    pub decision: &'static str,
    /// Operation label.
    pub operation: String,
    /// Module required by the operation.
    pub module: Module,
    /// Action required by the operation.
    pub action: Action,
    /// Caller identity when known.
    pub user_id: Option<String>,
    /// Target resource when provided.
    pub resource_id: Option<String>,
    /// Rejection or failure reason.
    pub reason: Option<String>,
}

impl GuardAuditEvent {
    /// Builds the event for `request` and its outcome.
    #[must_use]
    pub fn for_outcome(request: &GuardRequest<'_>, outcome: Result<(), &GuardError>) -> Self {
        let (decision, reason) = match outcome {
            Ok(()) => ("allow", None),
            Err(err) => (err.decision(), Some(err.to_string())),
        };
        Self {
            event: "hotelier_guard",
            timestamp_ms: now_ms(),
            request_id: request.request_id.map(str::to_string),
            decision,
            operation: request.operation.to_string(),
            module: request.requirement.module,
            action: request.requirement.action,
            user_id: request.user_id.map(ToString::to_string),
            resource_id: request.resource_id.map(ToString::to_string),
            reason,
        }
    }
}

/// Sink for guard audit events.
pub trait GuardAuditSink: Send + Sync {
    /// Record a guard decision.
    fn record(&self, event: &GuardAuditEvent);
}

/// No-op audit sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopGuardAuditSink;

impl GuardAuditSink for NoopGuardAuditSink {
    fn record(&self, _event: &GuardAuditEvent) {}
}

// ============================================================================
// SECTION: Guard
// ============================================================================

/// Snapshot handed to business logic after a successful guard decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedSubject {
    /// Subject loaded for the decision.
    subject: AccessSubject,
    /// Requirement that was satisfied.
    requirement: OperationRequirement,
}

impl AuthorizedSubject {
    /// Returns the loaded subject.
    #[must_use]
    pub const fn subject(&self) -> &AccessSubject {
        &self.subject
    }

    /// Returns the satisfied requirement.
    #[must_use]
    pub const fn requirement(&self) -> OperationRequirement {
        self.requirement
    }

    /// Consumes the wrapper and returns the subject.
    #[must_use]
    pub fn into_subject(self) -> AccessSubject {
        self.subject
    }
}

/// Authorization gate shared by every protected operation.
#[derive(Clone)]
pub struct RequestGuard {
    /// Decision engine.
    engine: Arc<AuthorizationEngine>,
    /// Store for users, roles, and grants.
    store: SharedAccessStore,
    /// Audit sink for decisions.
    audit: Arc<dyn GuardAuditSink>,
}

impl RequestGuard {
    /// Creates a guard.
    #[must_use]
    pub fn new(
        engine: Arc<AuthorizationEngine>,
        store: SharedAccessStore,
        audit: Arc<dyn GuardAuditSink>,
    ) -> Self {
        Self {
            engine,
            store,
            audit,
        }
    }

    /// Returns the engine used by this guard.
    #[must_use]
    pub fn engine(&self) -> &AuthorizationEngine {
        &self.engine
    }

    /// Returns the store used by this guard.
    #[must_use]
    pub const fn store(&self) -> &SharedAccessStore {
        &self.store
    }

    /// Authorizes `request` and records one audit event.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError`] when the request is rejected or cannot be
    /// decided.
    pub fn authorize(&self, request: &GuardRequest<'_>) -> Result<AuthorizedSubject, GuardError> {
        let outcome = self.decide(request);
        let event = GuardAuditEvent::for_outcome(request, outcome.as_ref().map(|_| ()));
        self.audit.record(&event);
        outcome
    }

    /// Loads a fresh subject snapshot for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Unauthenticated`] for unknown users,
    /// [`GuardError::Integrity`] when the user's role is missing, and
    /// [`GuardError::StorageUnavailable`] on read failures.
    pub fn load_subject(&self, user_id: &UserId) -> Result<AccessSubject, GuardError> {
        let user = self
            .store
            .load_user(user_id)
            .map_err(GuardError::from_store)?
            .ok_or(GuardError::Unauthenticated)?;
        let role =
            self.store.load_role(&user.role_id).map_err(GuardError::from_store)?.ok_or_else(|| {
                GuardError::Integrity(format!(
                    "user {} references missing role {}",
                    user.user_id, user.role_id
                ))
            })?;
        let grant = self.store.load_grant(user_id).map_err(GuardError::from_store)?;
        Ok(AccessSubject::new(user, role, grant))
    }

    /// Runs the checks without auditing.
    fn decide(&self, request: &GuardRequest<'_>) -> Result<AuthorizedSubject, GuardError> {
        let user_id = request.user_id.ok_or(GuardError::Unauthenticated)?;
        let subject = self.load_subject(user_id)?;
        let requirement = request.requirement;
        if !self.engine.can_perform(&subject.role, requirement.module, requirement.action)? {
            return Err(GuardError::Forbidden(ForbiddenReason::Capability));
        }
        if requirement.resource_scoped {
            let resource_id =
                request.resource_id.ok_or(GuardError::Forbidden(ForbiddenReason::Resource))?;
            if !self.engine.can_access_resource(&subject, requirement.module, resource_id)? {
                return Err(GuardError::Forbidden(ForbiddenReason::Resource));
            }
        }
        Ok(AuthorizedSubject {
            subject,
            requirement,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the current wall-clock time in milliseconds since epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |duration| duration.as_millis())
}
