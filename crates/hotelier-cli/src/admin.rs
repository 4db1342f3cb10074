// crates/hotelier-cli/src/admin.rs
// ============================================================================
// Module: Offline Administration
// Description: Access explanation and administrator bootstrap.
// Purpose: Let operators inspect and seed a store without the HTTP surface.
// Dependencies: hotelier-core, serde, thiserror
// ============================================================================

//! ## Overview
//! Both helpers take any [`AccessStore`], so the CLI can run them against a
//! `SQLite` file and tests can run them in memory.
//!
//! [`explain_access`] walks the same checks as the request guard (capability
//! first, then resource visibility) and reports each intermediate value.
//! Nothing is audited because nothing is served.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use hotelier_core::AccessScope;
use hotelier_core::AccessStore;
use hotelier_core::AccessibleIds;
use hotelier_core::Action;
use hotelier_core::AuthorizationEngine;
use hotelier_core::CapabilityLevel;
use hotelier_core::EngineError;
use hotelier_core::ForbiddenReason;
use hotelier_core::GuardError;
use hotelier_core::Module;
use hotelier_core::ModulePermission;
use hotelier_core::NoopGuardAuditSink;
use hotelier_core::RequestGuard;
use hotelier_core::ResourceId;
use hotelier_core::Role;
use hotelier_core::RoleId;
use hotelier_core::SharedAccessStore;
use hotelier_core::StoreError;
use hotelier_core::UserId;
use hotelier_core::UserRecord;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Role created by [`bootstrap_admin`].
pub const ADMIN_ROLE_ID: &str = "administrator";

/// Display name of the bootstrap role.
const ADMIN_ROLE_NAME: &str = "Administrator";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Administration failures.
#[derive(Debug, Error)]
pub enum AdminError {
    /// User does not exist.
    #[error("unknown user {0}")]
    UnknownUser(UserId),
    /// User exists with a role other than the administrator role.
    #[error("user {user_id} already exists with role {role_id}")]
    ExistingUser {
        /// Existing user.
        user_id: UserId,
        /// Role currently assigned.
        role_id: RoleId,
    },
    /// Administrator role exists but does not grant full access.
    #[error("role {0} exists but does not grant full access to every module")]
    WeakAdminRole(RoleId),
    /// Role, grant, or catalog data is malformed.
    #[error("integrity error: {0}")]
    Integrity(String),
    /// Store read failed while loading the subject.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    /// Store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<EngineError> for AdminError {
    fn from(err: EngineError) -> Self {
        Self::Integrity(err.to_string())
    }
}

// ============================================================================
// SECTION: Access Explanation
// ============================================================================

/// Outcome of an explained decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplainedDecision {
    /// The guard would allow the request.
    Allow,
    /// Capability below the catalog minimum.
    DenyCapability,
    /// Resource outside the accessible-id-set.
    DenyResource,
}

impl From<ForbiddenReason> for ExplainedDecision {
    fn from(reason: ForbiddenReason) -> Self {
        match reason {
            ForbiddenReason::Capability => Self::DenyCapability,
            ForbiddenReason::Resource => Self::DenyResource,
        }
    }
}

/// Every value that went into one decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessExplanation {
    /// User evaluated.
    pub user_id: UserId,
    /// User's role.
    pub role_id: RoleId,
    /// Module evaluated.
    pub module: Module,
    /// Action evaluated.
    pub action: Action,
    /// Role capability on the module.
    pub capability: CapabilityLevel,
    /// Catalog minimum for the action.
    pub minimum: CapabilityLevel,
    /// Scope stored on the role.
    pub configured_scope: AccessScope,
    /// Scope after partial-support degradation.
    pub effective_scope: AccessScope,
    /// Whether the capability check passes.
    pub can_perform: bool,
    /// Accessible-id-set for the module.
    pub accessible_ids: AccessibleIds,
    /// Resource checked, when one was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<ResourceId>,
    /// Whether the resource is visible, when one was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_visible: Option<bool>,
    /// Final decision.
    pub decision: ExplainedDecision,
}

/// Explains whether `user_id` may perform `action` on `module`, optionally
/// against one resource.
///
/// # Errors
///
/// Returns [`AdminError::UnknownUser`] for unknown users,
/// [`AdminError::Integrity`] when role or catalog data is malformed, and
/// [`AdminError::StorageUnavailable`] on read failures.
pub fn explain_access<S>(
    store: S,
    user_id: &UserId,
    module: Module,
    action: Action,
    resource_id: Option<&ResourceId>,
) -> Result<AccessExplanation, AdminError>
where
    S: AccessStore + Send + Sync + 'static,
{
    let engine = Arc::new(AuthorizationEngine::builtin());
    let guard = RequestGuard::new(
        Arc::clone(&engine),
        SharedAccessStore::from_store(store),
        Arc::new(NoopGuardAuditSink),
    );
    let subject = guard.load_subject(user_id).map_err(|err| match err {
        GuardError::Unauthenticated => AdminError::UnknownUser(user_id.clone()),
        GuardError::StorageUnavailable(message) => AdminError::StorageUnavailable(message),
        other => AdminError::Integrity(other.to_string()),
    })?;

    let permission = subject.role.permission(module).ok_or_else(|| {
        AdminError::Integrity(format!("role {} has no entry for {module}", subject.role.role_id))
    })?;
    let minimum = engine.catalog().minimum_level(module, action).map_err(EngineError::from)?;
    let can_perform = engine.can_perform(&subject.role, module, action)?;
    let effective_scope = engine.effective_scope(&subject.role, module)?;
    let accessible_ids = engine.resolve_accessible_ids(&subject, module)?;
    let resource_visible = resource_id.map(|id| accessible_ids.contains(id));

    let decision = if !can_perform {
        ExplainedDecision::from(ForbiddenReason::Capability)
    } else if resource_visible == Some(false) {
        ExplainedDecision::from(ForbiddenReason::Resource)
    } else {
        ExplainedDecision::Allow
    };

    Ok(AccessExplanation {
        user_id: user_id.clone(),
        role_id: subject.role.role_id.clone(),
        module,
        action,
        capability: permission.capability,
        minimum,
        configured_scope: permission.scope,
        effective_scope,
        can_perform,
        accessible_ids,
        resource_id: resource_id.cloned(),
        resource_visible,
        decision,
    })
}

// ============================================================================
// SECTION: Bootstrap
// ============================================================================

/// What [`bootstrap_admin`] changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootstrapOutcome {
    /// Administrator user.
    pub user_id: UserId,
    /// Administrator role.
    pub role_id: RoleId,
    /// Whether the role was written.
    pub role_created: bool,
    /// Whether the user was written.
    pub user_created: bool,
}

/// Creates the `administrator` role (all/all on every module) and assigns it
/// to `user_id`. Running it again is a no-op.
///
/// # Errors
///
/// Returns [`AdminError::ExistingUser`] when the user exists with another
/// role, [`AdminError::WeakAdminRole`] when a role with the bootstrap id
/// exists without full access, and [`AdminError::Store`] on store failures.
pub fn bootstrap_admin<S>(store: &S, user_id: &UserId) -> Result<BootstrapOutcome, AdminError>
where
    S: AccessStore + ?Sized,
{
    let role_id = RoleId::new(ADMIN_ROLE_ID);
    if let Some(existing) = store.load_user(user_id)?
        && existing.role_id != role_id
    {
        return Err(AdminError::ExistingUser {
            user_id: existing.user_id,
            role_id: existing.role_id,
        });
    }

    let role_created = match store.load_role(&role_id)? {
        Some(role) => {
            let full = Module::ALL
                .iter()
                .all(|module| role.permission(*module) == Some(ModulePermission::FULL));
            if !full {
                return Err(AdminError::WeakAdminRole(role_id));
            }
            false
        }
        None => {
            store.save_role(&Role::uniform(
                role_id.clone(),
                ADMIN_ROLE_NAME,
                ModulePermission::FULL,
            ))?;
            true
        }
    };

    let user_created = if store.load_user(user_id)?.is_some() {
        false
    } else {
        store.save_user(&UserRecord::new(user_id.clone(), role_id.clone()))?;
        true
    };

    Ok(BootstrapOutcome {
        user_id: user_id.clone(),
        role_id,
        role_created,
        user_created,
    })
}
