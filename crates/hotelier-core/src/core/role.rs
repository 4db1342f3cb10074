// crates/hotelier-core/src/core/role.rs
// ============================================================================
// Module: Roles
// Description: Role records holding one permission pair per module.
// Purpose: Model the only place capability and scope are stored.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A [`Role`] owns exactly one [`ModulePermission`] per [`Module`]. Users never
//! carry permissions of their own; a user's effective permissions for a module
//! are its role's pair for that module.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::catalog::AccessScope;
use crate::core::catalog::CapabilityLevel;
use crate::core::catalog::Module;
use crate::core::identifiers::RoleId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum role name length in bytes.
pub const MAX_ROLE_NAME_BYTES: usize = 128;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Capability and scope for one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulePermission {
    /// What the role may do within the module.
    pub capability: CapabilityLevel,
    /// Which resources of the module the role may see.
    pub scope: AccessScope,
}

impl ModulePermission {
    /// Read capability with no visible resources.
    pub const NO_ACCESS: Self = Self::new(CapabilityLevel::View, AccessScope::None);
    /// Every action on every resource.
    pub const FULL: Self = Self::new(CapabilityLevel::All, AccessScope::All);

    /// Creates a permission pair.
    #[must_use]
    pub const fn new(capability: CapabilityLevel, scope: AccessScope) -> Self {
        Self {
            capability,
            scope,
        }
    }
}

/// Role record.
///
/// # Invariants
/// - A valid role has an entry for every [`Module`] (see [`Role::validate`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role identifier.
    pub role_id: RoleId,
    /// Display name.
    pub name: String,
    /// Whether the role is meant for users outside the operating company.
    #[serde(default)]
    pub is_external: bool,
    /// Permission pair per module.
    pub permissions: BTreeMap<Module, ModulePermission>,
}

impl Role {
    /// Builds a role with the same pair for every module.
    #[must_use]
    pub fn uniform(
        role_id: impl Into<RoleId>,
        name: impl Into<String>,
        permission: ModulePermission,
    ) -> Self {
        Self {
            role_id: role_id.into(),
            name: name.into(),
            is_external: false,
            permissions: Module::ALL.iter().map(|module| (*module, permission)).collect(),
        }
    }

    /// Returns a copy with the pair for `module` replaced.
    #[must_use]
    pub fn with_permission(mut self, module: Module, permission: ModulePermission) -> Self {
        self.permissions.insert(module, permission);
        self
    }

    /// Returns a copy with the external flag set.
    #[must_use]
    pub const fn external(mut self, is_external: bool) -> Self {
        self.is_external = is_external;
        self
    }

    /// Returns the pair for `module`, if present.
    #[must_use]
    pub fn permission(&self, module: Module) -> Option<ModulePermission> {
        self.permissions.get(&module).copied()
    }

    /// Validates structural invariants.
    ///
    /// # Errors
    ///
    /// Returns [`RoleError`] when the name is unusable or a module is missing.
    pub fn validate(&self) -> Result<(), RoleError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(RoleError::InvalidName("role name must be non-empty".to_string()));
        }
        if name.len() > MAX_ROLE_NAME_BYTES {
            return Err(RoleError::InvalidName(format!(
                "role name exceeds {MAX_ROLE_NAME_BYTES} bytes"
            )));
        }
        if self.role_id.as_str().trim().is_empty() {
            return Err(RoleError::InvalidName("role id must be non-empty".to_string()));
        }
        if let Some(module) = Module::ALL.iter().find(|m| !self.permissions.contains_key(m)) {
            return Err(RoleError::MissingModule(*module));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Role validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoleError {
    /// Name or identifier is unusable.
    #[error("invalid role: {0}")]
    InvalidName(String),
    /// Role has no entry for the module.
    #[error("role has no permission entry for module {0}")]
    MissingModule(Module),
}
