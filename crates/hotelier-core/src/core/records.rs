// crates/hotelier-core/src/core/records.rs
// ============================================================================
// Module: Records
// Description: User and business resource records read by the engine's callers.
// Purpose: Carry only the fields authorization and listing need.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! [`UserRecord`] links a user to its single role. [`ResourceRecord`] is the
//! opaque shape business collaborators store per module; the engine only ever
//! looks at its id.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::catalog::Module;
use crate::core::identifiers::ResourceId;
use crate::core::identifiers::RoleId;
use crate::core::identifiers::UserId;

/// User record.
///
/// # Invariants
/// - `role_id` is required; a user without a role cannot be authorized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// User identifier.
    pub user_id: UserId,
    /// Assigned role.
    pub role_id: RoleId,
    /// Display name.
    #[serde(default)]
    pub display_name: String,
}

impl UserRecord {
    /// Creates a user record.
    #[must_use]
    pub fn new(user_id: impl Into<UserId>, role_id: impl Into<RoleId>) -> Self {
        Self {
            user_id: user_id.into(),
            role_id: role_id.into(),
            display_name: String::new(),
        }
    }
}

/// Business resource record (portfolio, property, audit, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Owning module.
    pub module: Module,
    /// Resource identifier.
    pub resource_id: ResourceId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Free-form attributes owned by the collaborator.
    #[serde(default)]
    pub attributes: Value,
}

impl ResourceRecord {
    /// Creates a record with empty attributes.
    #[must_use]
    pub fn new(
        module: Module,
        resource_id: impl Into<ResourceId>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            module,
            resource_id: resource_id.into(),
            name: name.into(),
            attributes: Value::Null,
        }
    }
}
