// crates/hotelier-core/src/runtime/engine.rs
// ============================================================================
// Module: Authorization Engine
// Description: Pure capability and resource-visibility decisions.
// Purpose: Decide what a role may do and which resource ids a user may see.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The [`AuthorizationEngine`] answers two independent questions and combines
//! them by conjunction:
//! - capability: does the role's level for a module reach the catalog minimum
//!   for the action ([`AuthorizationEngine::can_perform`]);
//! - visibility: which ids of a module the user may touch
//!   ([`AuthorizationEngine::resolve_accessible_ids`]).
//!
//! The engine never performs I/O and holds no mutable state. Callers pass an
//! [`AccessSubject`] snapshot read fresh from the stores for each request.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::core::AccessScope;
use crate::core::AccessibleIds;
use crate::core::Action;
use crate::core::CatalogError;
use crate::core::Module;
use crate::core::ModulePermission;
use crate::core::PermissionCatalog;
use crate::core::ResourceGrant;
use crate::core::ResourceId;
use crate::core::Role;
use crate::core::RoleId;
use crate::core::UserId;
use crate::core::UserRecord;

// ============================================================================
// SECTION: Subject
// ============================================================================

/// Snapshot of everything the engine needs about one user.
///
/// # Invariants
/// - `role.role_id == user.role_id` when built by the request guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessSubject {
    /// User record.
    pub user: UserRecord,
    /// The user's role.
    pub role: Role,
    /// The user's resource grant, if one was ever assigned.
    pub grant: Option<ResourceGrant>,
}

impl AccessSubject {
    /// Creates a subject snapshot.
    #[must_use]
    pub const fn new(user: UserRecord, role: Role, grant: Option<ResourceGrant>) -> Self {
        Self {
            user,
            role,
            grant,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user.user_id
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Engine integrity errors. These indicate configuration or data defects and
/// are never a normal denial.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Catalog lookup failed.
    #[error("catalog integrity error: {0}")]
    Catalog(#[from] CatalogError),
    /// Role is missing the entry for a module.
    #[error("role {role_id} has no permission entry for module {module}")]
    MissingRolePermission {
        /// Role being evaluated.
        role_id: RoleId,
        /// Module without an entry.
        module: Module,
    },
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Stateless authorization engine.
///
/// # Invariants
/// - Decisions are a pure function of (role, grant, catalog).
#[derive(Debug, Clone)]
pub struct AuthorizationEngine {
    /// Shared read-only catalog.
    catalog: Arc<PermissionCatalog>,
}

impl AuthorizationEngine {
    /// Creates an engine over `catalog`.
    #[must_use]
    pub fn new(catalog: PermissionCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }

    /// Creates an engine over the built-in catalog.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(PermissionCatalog::builtin())
    }

    /// Returns the catalog consulted by this engine.
    #[must_use]
    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    /// Returns whether `role` may perform `action` on `module`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the catalog or role lacks an entry for
    /// `module`.
    pub fn can_perform(
        &self,
        role: &Role,
        module: Module,
        action: Action,
    ) -> Result<bool, EngineError> {
        let minimum = self.catalog.minimum_level(module, action)?;
        let permission = role_permission(role, module)?;
        Ok(permission.capability.satisfies(minimum))
    }

    /// Returns the scope that actually applies to `module` for `role`, after
    /// degrading `partial` to `none` on modules without partial support.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the catalog or role lacks an entry for
    /// `module`.
    pub fn effective_scope(&self, role: &Role, module: Module) -> Result<AccessScope, EngineError> {
        let permission = role_permission(role, module)?;
        let supports_partial = self.catalog.supports_partial(module)?;
        Ok(match permission.scope {
            AccessScope::Partial if !supports_partial => AccessScope::None,
            scope => scope,
        })
    }

    /// Resolves the accessible-id-set for `subject` on `module`.
    ///
    /// The returned set is an owned copy; mutating it has no effect on the
    /// subject's grant.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the catalog or role lacks an entry for
    /// `module`.
    pub fn resolve_accessible_ids(
        &self,
        subject: &AccessSubject,
        module: Module,
    ) -> Result<AccessibleIds, EngineError> {
        Ok(match self.effective_scope(&subject.role, module)? {
            AccessScope::All => AccessibleIds::All,
            AccessScope::None => AccessibleIds::none(),
            AccessScope::Partial => AccessibleIds::Only(
                subject
                    .grant
                    .as_ref()
                    .and_then(|grant| grant.ids_for(module))
                    .cloned()
                    .unwrap_or_default(),
            ),
        })
    }

    /// Returns whether `subject` may touch `resource_id` in `module`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the catalog or role lacks an entry for
    /// `module`.
    pub fn can_access_resource(
        &self,
        subject: &AccessSubject,
        module: Module,
        resource_id: &ResourceId,
    ) -> Result<bool, EngineError> {
        self.resolve_accessible_ids(subject, module).map(|ids| ids.contains(resource_id))
    }
}

impl Default for AuthorizationEngine {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Looks up the role's pair for `module`, failing on a malformed role.
fn role_permission(role: &Role, module: Module) -> Result<ModulePermission, EngineError> {
    role.permission(module).ok_or_else(|| EngineError::MissingRolePermission {
        role_id: role.role_id.clone(),
        module,
    })
}
