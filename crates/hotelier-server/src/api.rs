// crates/hotelier-server/src/api.rs
// ============================================================================
// Module: Hotelier API
// Description: Transport-agnostic handlers for every protected operation.
// Purpose: Run the guard, apply the listing contract, and talk to the store.
// Dependencies: hotelier-core, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`HotelierApi`] holds the business side of each route. Every handler starts
//! with a guard decision for its registered [`Operation`]; collection handlers
//! then go through [`filtered_listing`] so storage never sees an unfiltered
//! query for a restricted caller.
//!
//! Existence is only revealed to callers whose scope for the module is `all`.
//! Everyone else gets [`ApiError::Forbidden`] for ids that are hidden, missing,
//! or taken.
//!
//! Callers never hand out more than they hold. A role may only be written or
//! assigned when every module pair in it is within the caller's own pair, and
//! external callers may only touch external roles. Assigning a role also
//! requires read access to that role.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use hotelier_core::AccessScope;
use hotelier_core::AccessSubject;
use hotelier_core::AccessibleIds;
use hotelier_core::Action;
use hotelier_core::CapabilityLevel;
use hotelier_core::EngineError;
use hotelier_core::GrantStore;
use hotelier_core::GuardError;
use hotelier_core::GuardRequest;
use hotelier_core::Module;
use hotelier_core::RequestGuard;
use hotelier_core::ResourceDirectory;
use hotelier_core::ResourceGrant;
use hotelier_core::ResourceId;
use hotelier_core::ResourceRecord;
use hotelier_core::Role;
use hotelier_core::RoleId;
use hotelier_core::RoleStore;
use hotelier_core::SharedAccessStore;
use hotelier_core::StoreError;
use hotelier_core::UserDirectory;
use hotelier_core::UserId;
use hotelier_core::UserRecord;
use hotelier_core::filtered_listing;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::operations::Collection;
use crate::operations::Operation;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum identifier length accepted on writes.
pub const MAX_ID_BYTES: usize = 128;

// ============================================================================
// SECTION: Caller
// ============================================================================

/// Identity and correlation data for one call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
    /// Authenticated user, or `None` when authentication failed.
    pub user_id: Option<UserId>,
    /// Request identifier for audit correlation.
    pub request_id: Option<String>,
}

impl Caller {
    /// Caller authenticated as `user_id`.
    #[must_use]
    pub fn user(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            request_id: None,
        }
    }

    /// Caller without a usable identity.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            user_id: None,
            request_id: None,
        }
    }

    /// Returns a copy with the request identifier set.
    #[must_use]
    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }
}

// ============================================================================
// SECTION: Payloads
// ============================================================================

/// Body of `POST /api/{collection}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewResource {
    /// Identifier of the new record.
    pub resource_id: ResourceId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Free-form attributes.
    #[serde(default)]
    pub attributes: Value,
}

/// Body of `PUT /api/{collection}/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceUpdate {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Free-form attributes.
    #[serde(default)]
    pub attributes: Value,
}

/// Body of `PUT /api/users/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserUpdate {
    /// New role.
    pub role_id: RoleId,
    /// Display name.
    #[serde(default)]
    pub display_name: String,
}

/// Body of `PUT /api/users/{id}/grants/{module}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GrantAssignment {
    /// Ids the user may see under partial scope. Replaces the previous set.
    pub resource_ids: BTreeSet<ResourceId>,
}

/// Resolved access for one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleAccess {
    /// Module described.
    pub module: Module,
    /// Role capability on the module.
    pub capability: CapabilityLevel,
    /// Effective scope after partial-support degradation.
    pub scope: AccessScope,
    /// Actions the role may perform.
    pub actions: Vec<Action>,
    /// Accessible-id-set.
    pub resource_ids: AccessibleIds,
}

/// Body of `GET /api/me/access`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessReport {
    /// Caller.
    pub user_id: UserId,
    /// Caller's role.
    pub role_id: RoleId,
    /// Whether the role is external.
    pub is_external: bool,
    /// Access per module, in catalog order.
    pub modules: Vec<ModuleAccess>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// API failures. Messages for `Forbidden`, `Integrity` and `StorageUnavailable`
/// are replaced by [`ApiError::public_message`] before leaving the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Missing or unknown identity.
    #[error("unauthenticated")]
    Unauthenticated,
    /// Operation not permitted, or target hidden from the caller.
    #[error("access denied")]
    Forbidden,
    /// Target does not exist and the caller may see the whole module.
    #[error("not found: {0}")]
    NotFound(String),
    /// Target already exists or is still referenced.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Malformed request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Body exceeds the configured limit.
    #[error("request body too large")]
    PayloadTooLarge,
    /// Role, grant, or catalog data is malformed.
    #[error("integrity error: {0}")]
    Integrity(String),
    /// The store could not be reached.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl ApiError {
    /// Returns the stable error code used in response bodies.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::InvalidRequest(_) => "invalid_request",
            Self::PayloadTooLarge => "payload_too_large",
            Self::Integrity(_) => "internal_error",
            Self::StorageUnavailable(_) => "storage_unavailable",
        }
    }

    /// Returns the message safe to send to the caller.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Unauthenticated => "authentication required".to_string(),
            Self::Forbidden => "access denied".to_string(),
            Self::NotFound(message) | Self::Conflict(message) | Self::InvalidRequest(message) => {
                message.clone()
            }
            Self::PayloadTooLarge => "request body too large".to_string(),
            Self::Integrity(_) => "internal error".to_string(),
            Self::StorageUnavailable(_) => "storage unavailable".to_string(),
        }
    }

    /// Maps a store failure on a write or lookup path.
    #[must_use]
    pub fn from_store(err: StoreError) -> Self {
        match err {
            StoreError::Invalid(message) => Self::InvalidRequest(message),
            StoreError::RoleInUse(role_id) => {
                Self::Conflict(format!("role {role_id} is assigned to users"))
            }
            StoreError::Conflict(message) => Self::Conflict(message),
            other => GuardError::from_store(other).into(),
        }
    }
}

impl From<GuardError> for ApiError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::Unauthenticated => Self::Unauthenticated,
            GuardError::Forbidden(_) => Self::Forbidden,
            GuardError::Integrity(message) => Self::Integrity(message),
            GuardError::StorageUnavailable(message) => Self::StorageUnavailable(message),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        Self::Integrity(err.to_string())
    }
}

// ============================================================================
// SECTION: API
// ============================================================================

/// Business handlers behind the HTTP routes.
#[derive(Clone)]
pub struct HotelierApi {
    /// Guard shared by every operation.
    guard: RequestGuard,
}

impl HotelierApi {
    /// Creates the API over `guard`.
    #[must_use]
    pub const fn new(guard: RequestGuard) -> Self {
        Self {
            guard,
        }
    }

    /// Returns the guard.
    #[must_use]
    pub const fn guard(&self) -> &RequestGuard {
        &self.guard
    }

    // ------------------------------------------------------------------------
    // Business collections
    // ------------------------------------------------------------------------

    /// Lists the records of `collection` visible to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the guard rejects the call or storage fails.
    pub fn list_resources(
        &self,
        caller: &Caller,
        collection: Collection,
    ) -> Result<Vec<ResourceRecord>, ApiError> {
        let subject = self.authorize(caller, Operation::ListResources(collection), None)?;
        let module = collection.module();
        filtered_listing(self.guard.engine(), &subject, module, |filter| {
            self.store().list_resources(module, filter).map_err(ApiError::from_store)
        })
    }

    /// Returns one record of `collection`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the guard rejects the call, the record is
    /// missing, or storage fails.
    pub fn get_resource(
        &self,
        caller: &Caller,
        collection: Collection,
        resource_id: &ResourceId,
    ) -> Result<ResourceRecord, ApiError> {
        let subject =
            self.authorize(caller, Operation::GetResource(collection), Some(resource_id))?;
        let module = collection.module();
        match self.store().get_resource(module, resource_id).map_err(ApiError::from_store)? {
            Some(record) => Ok(record),
            None => Err(self.hidden_or_missing(&subject, module, resource_id.as_str())),
        }
    }

    /// Creates a record in `collection`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the guard rejects the call, the id is taken
    /// or malformed, or storage fails.
    pub fn create_resource(
        &self,
        caller: &Caller,
        collection: Collection,
        input: NewResource,
    ) -> Result<ResourceRecord, ApiError> {
        let subject = self.authorize(caller, Operation::CreateResource(collection), None)?;
        let module = collection.module();
        validate_id("resource_id", input.resource_id.as_str())?;
        let existing =
            self.store().get_resource(module, &input.resource_id).map_err(ApiError::from_store)?;
        self.ensure_absent(&subject, module, &input.resource_id, existing.is_some())?;
        let record = ResourceRecord {
            module,
            resource_id: input.resource_id,
            name: input.name,
            attributes: input.attributes,
        };
        self.store().save_resource(&record).map_err(ApiError::from_store)?;
        Ok(record)
    }

    /// Replaces the name and attributes of an existing record.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the guard rejects the call, the record is
    /// missing, or storage fails.
    pub fn update_resource(
        &self,
        caller: &Caller,
        collection: Collection,
        resource_id: &ResourceId,
        update: ResourceUpdate,
    ) -> Result<ResourceRecord, ApiError> {
        let subject =
            self.authorize(caller, Operation::UpdateResource(collection), Some(resource_id))?;
        let module = collection.module();
        if self.store().get_resource(module, resource_id).map_err(ApiError::from_store)?.is_none()
        {
            return Err(self.hidden_or_missing(&subject, module, resource_id.as_str()));
        }
        let record = ResourceRecord {
            module,
            resource_id: resource_id.clone(),
            name: update.name,
            attributes: update.attributes,
        };
        self.store().save_resource(&record).map_err(ApiError::from_store)?;
        Ok(record)
    }

    /// Deletes a record.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the guard rejects the call, the record is
    /// missing, or storage fails.
    pub fn delete_resource(
        &self,
        caller: &Caller,
        collection: Collection,
        resource_id: &ResourceId,
    ) -> Result<(), ApiError> {
        let subject =
            self.authorize(caller, Operation::DeleteResource(collection), Some(resource_id))?;
        let module = collection.module();
        if self.store().delete_resource(module, resource_id).map_err(ApiError::from_store)? {
            Ok(())
        } else {
            Err(self.hidden_or_missing(&subject, module, resource_id.as_str()))
        }
    }

    // ------------------------------------------------------------------------
    // Roles
    // ------------------------------------------------------------------------

    /// Lists roles visible to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the guard rejects the call or storage fails.
    pub fn list_roles(&self, caller: &Caller) -> Result<Vec<Role>, ApiError> {
        let subject = self.authorize(caller, Operation::ListRoles, None)?;
        filtered_listing(self.guard.engine(), &subject, Module::UserRole, |filter| {
            self.store().list_roles(filter).map_err(ApiError::from_store)
        })
    }

    /// Returns one role.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the guard rejects the call, the role is
    /// missing, or storage fails.
    pub fn get_role(&self, caller: &Caller, role_id: &RoleId) -> Result<Role, ApiError> {
        let target = ResourceId::new(role_id.as_str());
        let subject = self.authorize(caller, Operation::GetRole, Some(&target))?;
        match self.store().load_role(role_id).map_err(ApiError::from_store)? {
            Some(role) => Ok(role),
            None => Err(self.hidden_or_missing(&subject, Module::UserRole, role_id.as_str())),
        }
    }

    /// Creates a role no broader than the caller's own.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the guard rejects the call, the role is
    /// malformed, taken, or beyond the caller's reach, or storage fails.
    pub fn create_role(&self, caller: &Caller, role: Role) -> Result<Role, ApiError> {
        let subject = self.authorize(caller, Operation::CreateRole, None)?;
        validate_id("role_id", role.role_id.as_str())?;
        role.validate().map_err(|err| ApiError::InvalidRequest(err.to_string()))?;
        let target = ResourceId::new(role.role_id.as_str());
        let existing = self.store().load_role(&role.role_id).map_err(ApiError::from_store)?;
        self.ensure_absent(&subject, Module::UserRole, &target, existing.is_some())?;
        self.ensure_within_reach(&subject, &role)?;
        self.store().save_role(&role).map_err(ApiError::from_store)?;
        Ok(role)
    }

    /// Replaces an existing role. Both the stored and the new role must be
    /// within the caller's reach. Takes effect on the next request of every
    /// user holding it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the guard rejects the call, the body does not
    /// match the path, the role is missing or beyond the caller's reach, or
    /// storage fails.
    pub fn update_role(
        &self,
        caller: &Caller,
        role_id: &RoleId,
        role: Role,
    ) -> Result<Role, ApiError> {
        let target = ResourceId::new(role_id.as_str());
        let subject = self.authorize(caller, Operation::UpdateRole, Some(&target))?;
        if role.role_id != *role_id {
            return Err(ApiError::InvalidRequest("role_id does not match path".to_string()));
        }
        role.validate().map_err(|err| ApiError::InvalidRequest(err.to_string()))?;
        let Some(current) = self.store().load_role(role_id).map_err(ApiError::from_store)? else {
            return Err(self.hidden_or_missing(&subject, Module::UserRole, role_id.as_str()));
        };
        self.ensure_within_reach(&subject, &current)?;
        self.ensure_within_reach(&subject, &role)?;
        self.store().save_role(&role).map_err(ApiError::from_store)?;
        Ok(role)
    }

    /// Deletes a role that no user references.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Conflict`] when the role is still assigned, and
    /// other [`ApiError`] variants as for the remaining role operations.
    pub fn delete_role(&self, caller: &Caller, role_id: &RoleId) -> Result<(), ApiError> {
        let target = ResourceId::new(role_id.as_str());
        let subject = self.authorize(caller, Operation::DeleteRole, Some(&target))?;
        if self.store().delete_role(role_id).map_err(ApiError::from_store)? {
            Ok(())
        } else {
            Err(self.hidden_or_missing(&subject, Module::UserRole, role_id.as_str()))
        }
    }

    // ------------------------------------------------------------------------
    // Users and grants
    // ------------------------------------------------------------------------

    /// Lists users visible to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the guard rejects the call or storage fails.
    pub fn list_users(&self, caller: &Caller) -> Result<Vec<UserRecord>, ApiError> {
        let subject = self.authorize(caller, Operation::ListUsers, None)?;
        filtered_listing(self.guard.engine(), &subject, Module::User, |filter| {
            self.store().list_users(filter).map_err(ApiError::from_store)
        })
    }

    /// Returns one user.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the guard rejects the call, the user is
    /// missing, or storage fails.
    pub fn get_user(&self, caller: &Caller, user_id: &UserId) -> Result<UserRecord, ApiError> {
        let target = ResourceId::new(user_id.as_str());
        let subject = self.authorize(caller, Operation::GetUser, Some(&target))?;
        match self.store().load_user(user_id).map_err(ApiError::from_store)? {
            Some(user) => Ok(user),
            None => Err(self.hidden_or_missing(&subject, Module::User, user_id.as_str())),
        }
    }

    /// Creates a user. The role must be assignable by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the guard rejects the call, the id is taken,
    /// the role is unknown or beyond the caller's reach, or storage fails.
    pub fn create_user(&self, caller: &Caller, user: UserRecord) -> Result<UserRecord, ApiError> {
        let subject = self.authorize(caller, Operation::CreateUser, None)?;
        validate_id("user_id", user.user_id.as_str())?;
        let target = ResourceId::new(user.user_id.as_str());
        let existing = self.store().load_user(&user.user_id).map_err(ApiError::from_store)?;
        self.ensure_absent(&subject, Module::User, &target, existing.is_some())?;
        self.ensure_assignable(&subject, &user.role_id)?;
        self.store().save_user(&user).map_err(ApiError::from_store)?;
        Ok(user)
    }

    /// Changes a user's role or display name. A new role must be assignable
    /// by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the guard rejects the call, the user is
    /// missing, the new role is unknown or beyond the caller's reach, or
    /// storage fails.
    pub fn update_user(
        &self,
        caller: &Caller,
        user_id: &UserId,
        update: UserUpdate,
    ) -> Result<UserRecord, ApiError> {
        let target = ResourceId::new(user_id.as_str());
        let subject = self.authorize(caller, Operation::UpdateUser, Some(&target))?;
        let Some(current) = self.store().load_user(user_id).map_err(ApiError::from_store)? else {
            return Err(self.hidden_or_missing(&subject, Module::User, user_id.as_str()));
        };
        if current.role_id != update.role_id {
            self.ensure_assignable(&subject, &update.role_id)?;
        }
        let user = UserRecord {
            user_id: user_id.clone(),
            role_id: update.role_id,
            display_name: update.display_name,
        };
        self.store().save_user(&user).map_err(ApiError::from_store)?;
        Ok(user)
    }

    /// Deletes a user and their grant.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the guard rejects the call, the user is
    /// missing, or storage fails.
    pub fn delete_user(&self, caller: &Caller, user_id: &UserId) -> Result<(), ApiError> {
        let target = ResourceId::new(user_id.as_str());
        let subject = self.authorize(caller, Operation::DeleteUser, Some(&target))?;
        if self.store().delete_user(user_id).map_err(ApiError::from_store)? {
            Ok(())
        } else {
            Err(self.hidden_or_missing(&subject, Module::User, user_id.as_str()))
        }
    }

    /// Replaces the granted ids of `user_id` for the module labelled
    /// `module_label`. The caller may only grant ids they can see.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the guard rejects the call, the module is
    /// unknown or has no partial support, an id is not visible to the caller,
    /// the target user is missing, or storage fails.
    pub fn assign_grant(
        &self,
        caller: &Caller,
        user_id: &UserId,
        module_label: &str,
        assignment: GrantAssignment,
    ) -> Result<ResourceGrant, ApiError> {
        let target = ResourceId::new(user_id.as_str());
        let subject = self.authorize(caller, Operation::AssignGrant, Some(&target))?;
        let engine = self.guard.engine();
        let module = Module::parse(module_label)
            .ok_or_else(|| ApiError::InvalidRequest(format!("unknown module {module_label}")))?;
        if !engine.catalog().supports_partial(module).map_err(EngineError::from)? {
            return Err(ApiError::InvalidRequest(format!(
                "module {module} does not support partial scope"
            )));
        }
        for resource_id in &assignment.resource_ids {
            validate_id("resource_ids", resource_id.as_str())?;
        }
        let visible = engine.resolve_accessible_ids(&subject, module)?;
        if !assignment.resource_ids.iter().all(|resource_id| visible.contains(resource_id)) {
            return Err(ApiError::Forbidden);
        }
        if self.store().load_user(user_id).map_err(ApiError::from_store)?.is_none() {
            return Err(self.hidden_or_missing(&subject, Module::User, user_id.as_str()));
        }
        self.store()
            .assign_grant(user_id, module, assignment.resource_ids)
            .map_err(ApiError::from_store)
    }

    /// Describes the caller's own access. Requires authentication only.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the caller is unknown or their role is
    /// malformed, or storage fails.
    pub fn my_access(&self, caller: &Caller) -> Result<AccessReport, ApiError> {
        let user_id = caller.user_id.as_ref().ok_or(ApiError::Unauthenticated)?;
        let subject = self.guard.load_subject(user_id)?;
        let engine = self.guard.engine();
        let mut modules = Vec::with_capacity(Module::ALL.len());
        for module in Module::ALL {
            let capability = subject
                .role
                .permission(module)
                .map(|permission| permission.capability)
                .ok_or_else(|| {
                    ApiError::Integrity(format!(
                        "role {} has no entry for {module}",
                        subject.role.role_id
                    ))
                })?;
            let mut actions = Vec::new();
            for action in Action::ALL {
                if engine.can_perform(&subject.role, module, action)? {
                    actions.push(action);
                }
            }
            modules.push(ModuleAccess {
                module,
                capability,
                scope: engine.effective_scope(&subject.role, module)?,
                actions,
                resource_ids: engine.resolve_accessible_ids(&subject, module)?,
            });
        }
        Ok(AccessReport {
            user_id: subject.user.user_id,
            role_id: subject.role.role_id,
            is_external: subject.role.is_external,
            modules,
        })
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    /// Returns the store behind the guard.
    const fn store(&self) -> &SharedAccessStore {
        self.guard.store()
    }

    /// Runs the guard for `operation` and returns the fresh subject.
    fn authorize(
        &self,
        caller: &Caller,
        operation: Operation,
        resource_id: Option<&ResourceId>,
    ) -> Result<AccessSubject, ApiError> {
        let label = operation.label();
        let request = GuardRequest {
            operation: &label,
            requirement: operation.requirement(),
            user_id: caller.user_id.as_ref(),
            resource_id,
            request_id: caller.request_id.as_deref(),
        };
        Ok(self.guard.authorize(&request)?.into_subject())
    }

    /// Reports a missing target as not found only to callers with `all` scope.
    fn hidden_or_missing(&self, subject: &AccessSubject, module: Module, id: &str) -> ApiError {
        match self.guard.engine().effective_scope(&subject.role, module) {
            Ok(AccessScope::All) => ApiError::NotFound(format!("{module} {id} not found")),
            Ok(AccessScope::None | AccessScope::Partial) => ApiError::Forbidden,
            Err(err) => err.into(),
        }
    }

    /// Rejects assigning `role_id` unless the caller can read the role and
    /// the role is within the caller's reach.
    fn ensure_assignable(&self, subject: &AccessSubject, role_id: &RoleId) -> Result<(), ApiError> {
        let engine = self.guard.engine();
        let target = ResourceId::new(role_id.as_str());
        if !engine.can_perform(&subject.role, Module::UserRole, Action::Read)?
            || !engine.can_access_resource(subject, Module::UserRole, &target)?
        {
            return Err(ApiError::Forbidden);
        }
        let role = self
            .store()
            .load_role(role_id)
            .map_err(ApiError::from_store)?
            .ok_or_else(|| ApiError::InvalidRequest(format!("unknown role {role_id}")))?;
        self.ensure_within_reach(subject, &role)
    }

    /// Rejects `role` when any module pair exceeds the caller's effective
    /// pair, or when an external caller targets an internal role.
    fn ensure_within_reach(&self, subject: &AccessSubject, role: &Role) -> Result<(), ApiError> {
        if subject.role.is_external && !role.is_external {
            return Err(ApiError::Forbidden);
        }
        let engine = self.guard.engine();
        for module in Module::ALL {
            let own = subject.role.permission(module).ok_or_else(|| {
                ApiError::Integrity(format!(
                    "role {} has no entry for {module}",
                    subject.role.role_id
                ))
            })?;
            let wanted = role.permission(module).ok_or_else(|| {
                ApiError::InvalidRequest(format!("role {} has no entry for {module}", role.role_id))
            })?;
            if wanted.capability > own.capability
                || engine.effective_scope(role, module)?
                    > engine.effective_scope(&subject.role, module)?
            {
                return Err(ApiError::Forbidden);
            }
        }
        Ok(())
    }

    /// Rejects a create on a taken id without revealing hidden records.
    fn ensure_absent(
        &self,
        subject: &AccessSubject,
        module: Module,
        resource_id: &ResourceId,
        exists: bool,
    ) -> Result<(), ApiError> {
        if !exists {
            return Ok(());
        }
        if self.guard.engine().can_access_resource(subject, module, resource_id)? {
            Err(ApiError::Conflict(format!("{module} {resource_id} already exists")))
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates an identifier supplied on a write.
fn validate_id(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::InvalidRequest(format!("{field} must be non-empty")));
    }
    if value.len() > MAX_ID_BYTES {
        return Err(ApiError::InvalidRequest(format!("{field} exceeds {MAX_ID_BYTES} bytes")));
    }
    if value.chars().any(char::is_control) {
        return Err(ApiError::InvalidRequest(format!("{field} contains control characters")));
    }
    Ok(())
}
