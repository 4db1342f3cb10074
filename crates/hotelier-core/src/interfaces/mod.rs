// crates/hotelier-core/src/interfaces/mod.rs
// ============================================================================
// Module: Hotelier Interfaces
// Description: Backend-agnostic storage interfaces for users, roles, grants.
// Purpose: Define the contract surfaces the guard and collaborators read from.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how Hotelier reads authorization inputs and business
//! records without embedding backend-specific details. Reads are always fresh;
//! implementations must not cache role or grant state between calls.
//! Implementations fail closed: a read that cannot complete returns an error,
//! never an empty or permissive value.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use thiserror::Error;

use crate::core::ListingFilter;
use crate::core::Module;
use crate::core::ResourceGrant;
use crate::core::ResourceId;
use crate::core::ResourceRecord;
use crate::core::Role;
use crate::core::RoleId;
use crate::core::UserId;
use crate::core::UserRecord;

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Storage errors shared by every store interface.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("store io error: {0}")]
    Io(String),
    /// Stored data is corrupted or fails integrity checks.
    #[error("store corruption: {0}")]
    Corrupt(String),
    /// Stored data version is incompatible.
    #[error("store version mismatch: {0}")]
    VersionMismatch(String),
    /// Stored or supplied data is invalid.
    #[error("store invalid data: {0}")]
    Invalid(String),
    /// Role cannot be deleted while users reference it.
    #[error("role {0} is still assigned to users")]
    RoleInUse(RoleId),
    /// Write conflicts with existing data.
    #[error("store conflict: {0}")]
    Conflict(String),
    /// Backend reported an error.
    #[error("store error: {0}")]
    Store(String),
}

impl StoreError {
    /// Returns true when the failure is a transient backend condition rather
    /// than a data defect.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Store(_))
    }
}

// ============================================================================
// SECTION: Users
// ============================================================================

/// User directory.
pub trait UserDirectory {
    /// Loads a user by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn load_user(&self, user_id: &UserId) -> Result<Option<UserRecord>, StoreError>;

    /// Inserts or replaces a user.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the role does not exist or saving fails.
    fn save_user(&self, user: &UserRecord) -> Result<(), StoreError>;

    /// Deletes a user and its resource grant. Returns false when absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when deletion fails.
    fn delete_user(&self, user_id: &UserId) -> Result<bool, StoreError>;

    /// Lists users passing `filter`, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn list_users(&self, filter: &ListingFilter) -> Result<Vec<UserRecord>, StoreError>;
}

// ============================================================================
// SECTION: Roles
// ============================================================================

/// Role store.
pub trait RoleStore {
    /// Loads a role by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn load_role(&self, role_id: &RoleId) -> Result<Option<Role>, StoreError>;

    /// Inserts or replaces a role.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when saving fails.
    fn save_role(&self, role: &Role) -> Result<(), StoreError>;

    /// Deletes a role. Returns false when absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RoleInUse`] while any user references the role.
    fn delete_role(&self, role_id: &RoleId) -> Result<bool, StoreError>;

    /// Lists roles passing `filter`, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn list_roles(&self, filter: &ListingFilter) -> Result<Vec<Role>, StoreError>;
}

// ============================================================================
// SECTION: Grants
// ============================================================================

/// Resource grant store.
pub trait GrantStore {
    /// Loads the grant for a user, if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn load_grant(&self, user_id: &UserId) -> Result<Option<ResourceGrant>, StoreError>;

    /// Replaces the ids granted for `module`, creating the record on first use.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the user does not exist or saving fails.
    fn assign_grant(
        &self,
        user_id: &UserId,
        module: Module,
        ids: BTreeSet<ResourceId>,
    ) -> Result<ResourceGrant, StoreError>;

    /// Deletes the grant for a user. Returns false when absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when deletion fails.
    fn delete_grant(&self, user_id: &UserId) -> Result<bool, StoreError>;
}

// ============================================================================
// SECTION: Business Resources
// ============================================================================

/// Directory of business resources per module.
pub trait ResourceDirectory {
    /// Loads a resource.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn get_resource(
        &self,
        module: Module,
        resource_id: &ResourceId,
    ) -> Result<Option<ResourceRecord>, StoreError>;

    /// Lists resources of `module` passing `filter`, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn list_resources(
        &self,
        module: Module,
        filter: &ListingFilter,
    ) -> Result<Vec<ResourceRecord>, StoreError>;

    /// Inserts or replaces a resource.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when saving fails.
    fn save_resource(&self, record: &ResourceRecord) -> Result<(), StoreError>;

    /// Deletes a resource. Returns false when absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when deletion fails.
    fn delete_resource(&self, module: Module, resource_id: &ResourceId)
    -> Result<bool, StoreError>;
}

/// Every store surface the server needs, in one object.
pub trait AccessStore: UserDirectory + RoleStore + GrantStore + ResourceDirectory {}

impl<T> AccessStore for T where T: UserDirectory + RoleStore + GrantStore + ResourceDirectory {}
