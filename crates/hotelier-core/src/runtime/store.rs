// crates/hotelier-core/src/runtime/store.rs
// ============================================================================
// Module: Hotelier In-Memory Store
// Description: In-memory access store and the shared store wrapper.
// Purpose: Provide a deterministic store for tests, demos, and memory mode.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`InMemoryAccessStore`] implements every store interface over a single
//! mutex-guarded state so referential checks (role in use, user exists) are
//! atomic with the write they protect. [`SharedAccessStore`] is the clonable
//! `Arc` wrapper the guard and server hold.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::core::ListingFilter;
use crate::core::Module;
use crate::core::ResourceGrant;
use crate::core::ResourceId;
use crate::core::ResourceRecord;
use crate::core::Role;
use crate::core::RoleId;
use crate::core::UserId;
use crate::core::UserRecord;
use crate::interfaces::AccessStore;
use crate::interfaces::GrantStore;
use crate::interfaces::ResourceDirectory;
use crate::interfaces::RoleStore;
use crate::interfaces::StoreError;
use crate::interfaces::UserDirectory;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// Everything the in-memory store holds.
#[derive(Debug, Default)]
struct InMemoryState {
    /// Users keyed by id.
    users: BTreeMap<UserId, UserRecord>,
    /// Roles keyed by id.
    roles: BTreeMap<RoleId, Role>,
    /// Grants keyed by owning user.
    grants: BTreeMap<UserId, ResourceGrant>,
    /// Business records keyed by module and id.
    resources: BTreeMap<(Module, ResourceId), ResourceRecord>,
}

/// In-memory access store for tests and memory mode.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAccessStore {
    /// Store state protected by a mutex.
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryAccessStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the state, mapping poisoning to a store error.
    fn lock(&self) -> Result<MutexGuard<'_, InMemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Store("access store mutex poisoned".to_string()))
    }
}

impl UserDirectory for InMemoryAccessStore {
    fn load_user(&self, user_id: &UserId) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.lock()?.users.get(user_id).cloned())
    }

    fn save_user(&self, user: &UserRecord) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if !state.roles.contains_key(&user.role_id) {
            return Err(StoreError::Invalid(format!("unknown role {}", user.role_id)));
        }
        state.users.insert(user.user_id.clone(), user.clone());
        drop(state);
        Ok(())
    }

    fn delete_user(&self, user_id: &UserId) -> Result<bool, StoreError> {
        let mut state = self.lock()?;
        let removed = state.users.remove(user_id).is_some();
        state.grants.remove(user_id);
        drop(state);
        Ok(removed)
    }

    fn list_users(&self, filter: &ListingFilter) -> Result<Vec<UserRecord>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .users
            .values()
            .filter(|user| filter.permits(&ResourceId::new(user.user_id.as_str())))
            .cloned()
            .collect())
    }
}

impl RoleStore for InMemoryAccessStore {
    fn load_role(&self, role_id: &RoleId) -> Result<Option<Role>, StoreError> {
        Ok(self.lock()?.roles.get(role_id).cloned())
    }

    fn save_role(&self, role: &Role) -> Result<(), StoreError> {
        role.validate().map_err(|err| StoreError::Invalid(err.to_string()))?;
        self.lock()?.roles.insert(role.role_id.clone(), role.clone());
        Ok(())
    }

    fn delete_role(&self, role_id: &RoleId) -> Result<bool, StoreError> {
        let mut state = self.lock()?;
        if state.users.values().any(|user| user.role_id == *role_id) {
            return Err(StoreError::RoleInUse(role_id.clone()));
        }
        let removed = state.roles.remove(role_id).is_some();
        drop(state);
        Ok(removed)
    }

    fn list_roles(&self, filter: &ListingFilter) -> Result<Vec<Role>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .roles
            .values()
            .filter(|role| filter.permits(&ResourceId::new(role.role_id.as_str())))
            .cloned()
            .collect())
    }
}

impl GrantStore for InMemoryAccessStore {
    fn load_grant(&self, user_id: &UserId) -> Result<Option<ResourceGrant>, StoreError> {
        Ok(self.lock()?.grants.get(user_id).cloned())
    }

    fn assign_grant(
        &self,
        user_id: &UserId,
        module: Module,
        ids: BTreeSet<ResourceId>,
    ) -> Result<ResourceGrant, StoreError> {
        let mut state = self.lock()?;
        if !state.users.contains_key(user_id) {
            return Err(StoreError::Invalid(format!("unknown user {user_id}")));
        }
        let grant = state
            .grants
            .entry(user_id.clone())
            .or_insert_with(|| ResourceGrant::new(user_id.clone()));
        grant.assign(module, ids);
        Ok(grant.clone())
    }

    fn delete_grant(&self, user_id: &UserId) -> Result<bool, StoreError> {
        Ok(self.lock()?.grants.remove(user_id).is_some())
    }
}

impl ResourceDirectory for InMemoryAccessStore {
    fn get_resource(
        &self,
        module: Module,
        resource_id: &ResourceId,
    ) -> Result<Option<ResourceRecord>, StoreError> {
        Ok(self.lock()?.resources.get(&(module, resource_id.clone())).cloned())
    }

    fn list_resources(
        &self,
        module: Module,
        filter: &ListingFilter,
    ) -> Result<Vec<ResourceRecord>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .resources
            .values()
            .filter(|record| record.module == module && filter.permits(&record.resource_id))
            .cloned()
            .collect())
    }

    fn save_resource(&self, record: &ResourceRecord) -> Result<(), StoreError> {
        self.lock()?
            .resources
            .insert((record.module, record.resource_id.clone()), record.clone());
        Ok(())
    }

    fn delete_resource(
        &self,
        module: Module,
        resource_id: &ResourceId,
    ) -> Result<bool, StoreError> {
        Ok(self.lock()?.resources.remove(&(module, resource_id.clone())).is_some())
    }
}

// ============================================================================
// SECTION: Shared Store Wrapper
// ============================================================================

/// Shared access store backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedAccessStore {
    /// Inner store implementation.
    inner: Arc<dyn AccessStore + Send + Sync>,
}

impl SharedAccessStore {
    /// Wraps an access store in a shared, clonable wrapper.
    #[must_use]
    pub fn from_store(store: impl AccessStore + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    /// Wraps an existing shared store.
    #[must_use]
    pub const fn new(store: Arc<dyn AccessStore + Send + Sync>) -> Self {
        Self {
            inner: store,
        }
    }
}

impl std::fmt::Debug for SharedAccessStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedAccessStore").finish_non_exhaustive()
    }
}

impl UserDirectory for SharedAccessStore {
    fn load_user(&self, user_id: &UserId) -> Result<Option<UserRecord>, StoreError> {
        self.inner.load_user(user_id)
    }

    fn save_user(&self, user: &UserRecord) -> Result<(), StoreError> {
        self.inner.save_user(user)
    }

    fn delete_user(&self, user_id: &UserId) -> Result<bool, StoreError> {
        self.inner.delete_user(user_id)
    }

    fn list_users(&self, filter: &ListingFilter) -> Result<Vec<UserRecord>, StoreError> {
        self.inner.list_users(filter)
    }
}

impl RoleStore for SharedAccessStore {
    fn load_role(&self, role_id: &RoleId) -> Result<Option<Role>, StoreError> {
        self.inner.load_role(role_id)
    }

    fn save_role(&self, role: &Role) -> Result<(), StoreError> {
        self.inner.save_role(role)
    }

    fn delete_role(&self, role_id: &RoleId) -> Result<bool, StoreError> {
        self.inner.delete_role(role_id)
    }

    fn list_roles(&self, filter: &ListingFilter) -> Result<Vec<Role>, StoreError> {
        self.inner.list_roles(filter)
    }
}

impl GrantStore for SharedAccessStore {
    fn load_grant(&self, user_id: &UserId) -> Result<Option<ResourceGrant>, StoreError> {
        self.inner.load_grant(user_id)
    }

    fn assign_grant(
        &self,
        user_id: &UserId,
        module: Module,
        ids: BTreeSet<ResourceId>,
    ) -> Result<ResourceGrant, StoreError> {
        self.inner.assign_grant(user_id, module, ids)
    }

    fn delete_grant(&self, user_id: &UserId) -> Result<bool, StoreError> {
        self.inner.delete_grant(user_id)
    }
}

impl ResourceDirectory for SharedAccessStore {
    fn get_resource(
        &self,
        module: Module,
        resource_id: &ResourceId,
    ) -> Result<Option<ResourceRecord>, StoreError> {
        self.inner.get_resource(module, resource_id)
    }

    fn list_resources(
        &self,
        module: Module,
        filter: &ListingFilter,
    ) -> Result<Vec<ResourceRecord>, StoreError> {
        self.inner.list_resources(module, filter)
    }

    fn save_resource(&self, record: &ResourceRecord) -> Result<(), StoreError> {
        self.inner.save_resource(record)
    }

    fn delete_resource(
        &self,
        module: Module,
        resource_id: &ResourceId,
    ) -> Result<bool, StoreError> {
        self.inner.delete_resource(module, resource_id)
    }
}
