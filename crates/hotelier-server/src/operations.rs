// crates/hotelier-server/src/operations.rs
// ============================================================================
// Module: Operation Registry
// Description: Registration table of every protected HTTP operation.
// Purpose: Declare module, action, and resource scoping without reflection.
// Dependencies: hotelier-core
// ============================================================================

//! ## Overview
//! Each route maps to exactly one [`Operation`]. [`Operation::requirement`]
//! is the only place a route's module, action, and resource scoping are
//! declared; the guard reads nothing else.

use hotelier_core::Action;
use hotelier_core::Module;
use hotelier_core::OperationRequirement;

// ============================================================================
// SECTION: Collections
// ============================================================================

/// Business collections exposed under `/api/{collection}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// `/api/portfolios`
    Portfolios,
    /// `/api/properties`
    Properties,
    /// `/api/audits`
    Audits,
    /// `/api/bank-details`
    BankDetails,
    /// `/api/service-types`
    ServiceTypes,
    /// `/api/system-settings`
    SystemSettings,
}

impl Collection {
    /// Every collection.
    pub const ALL: [Self; 6] = [
        Self::Portfolios,
        Self::Properties,
        Self::Audits,
        Self::BankDetails,
        Self::ServiceTypes,
        Self::SystemSettings,
    ];

    /// Returns the URL path segment.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Portfolios => "portfolios",
            Self::Properties => "properties",
            Self::Audits => "audits",
            Self::BankDetails => "bank-details",
            Self::ServiceTypes => "service-types",
            Self::SystemSettings => "system-settings",
        }
    }

    /// Returns the module backing the collection.
    #[must_use]
    pub const fn module(self) -> Module {
        match self {
            Self::Portfolios => Module::Portfolio,
            Self::Properties => Module::Property,
            Self::Audits => Module::Audit,
            Self::BankDetails => Module::BankDetails,
            Self::ServiceTypes => Module::ServiceType,
            Self::SystemSettings => Module::SystemSettings,
        }
    }

    /// Parses a URL path segment.
    #[must_use]
    pub fn from_path(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|collection| collection.path() == segment)
    }
}

// ============================================================================
// SECTION: Operations
// ============================================================================

/// Protected operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `GET /api/{collection}`
    ListResources(Collection),
    /// `POST /api/{collection}`
    CreateResource(Collection),
    /// `GET /api/{collection}/{id}`
    GetResource(Collection),
    /// `PUT /api/{collection}/{id}`
    UpdateResource(Collection),
    /// `DELETE /api/{collection}/{id}`
    DeleteResource(Collection),
    /// `GET /api/roles`
    ListRoles,
    /// `POST /api/roles`
    CreateRole,
    /// `GET /api/roles/{id}`
    GetRole,
    /// `PUT /api/roles/{id}`
    UpdateRole,
    /// `DELETE /api/roles/{id}`
    DeleteRole,
    /// `GET /api/users`
    ListUsers,
    /// `POST /api/users`
    CreateUser,
    /// `GET /api/users/{id}`
    GetUser,
    /// `PUT /api/users/{id}`
    UpdateUser,
    /// `DELETE /api/users/{id}`
    DeleteUser,
    /// `PUT /api/users/{id}/grants/{module}`
    AssignGrant,
}

impl Operation {
    /// Returns every registered operation.
    #[must_use]
    pub fn all() -> Vec<Self> {
        let mut operations = Vec::new();
        for collection in Collection::ALL {
            operations.extend([
                Self::ListResources(collection),
                Self::CreateResource(collection),
                Self::GetResource(collection),
                Self::UpdateResource(collection),
                Self::DeleteResource(collection),
            ]);
        }
        operations.extend([
            Self::ListRoles,
            Self::CreateRole,
            Self::GetRole,
            Self::UpdateRole,
            Self::DeleteRole,
            Self::ListUsers,
            Self::CreateUser,
            Self::GetUser,
            Self::UpdateUser,
            Self::DeleteUser,
            Self::AssignGrant,
        ]);
        operations
    }

    /// Returns the declared requirement.
    #[must_use]
    pub const fn requirement(self) -> OperationRequirement {
        match self {
            Self::ListResources(collection) => {
                OperationRequirement::collection(collection.module(), Action::Read)
            }
            Self::CreateResource(collection) => {
                OperationRequirement::collection(collection.module(), Action::Create)
            }
            Self::GetResource(collection) => {
                OperationRequirement::resource(collection.module(), Action::Read)
            }
            Self::UpdateResource(collection) => {
                OperationRequirement::resource(collection.module(), Action::Update)
            }
            Self::DeleteResource(collection) => {
                OperationRequirement::resource(collection.module(), Action::Delete)
            }
            Self::ListRoles => OperationRequirement::collection(Module::UserRole, Action::Read),
            Self::CreateRole => OperationRequirement::collection(Module::UserRole, Action::Create),
            Self::GetRole => OperationRequirement::resource(Module::UserRole, Action::Read),
            Self::UpdateRole => OperationRequirement::resource(Module::UserRole, Action::Update),
            Self::DeleteRole => OperationRequirement::resource(Module::UserRole, Action::Delete),
            Self::ListUsers => OperationRequirement::collection(Module::User, Action::Read),
            Self::CreateUser => OperationRequirement::collection(Module::User, Action::Create),
            Self::GetUser => OperationRequirement::resource(Module::User, Action::Read),
            Self::UpdateUser | Self::AssignGrant => {
                OperationRequirement::resource(Module::User, Action::Update)
            }
            Self::DeleteUser => OperationRequirement::resource(Module::User, Action::Delete),
        }
    }

    /// Returns the audit label, e.g. `properties.get` or `users.assign_grant`.
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::ListResources(collection) => format!("{}.list", collection.path()),
            Self::CreateResource(collection) => format!("{}.create", collection.path()),
            Self::GetResource(collection) => format!("{}.get", collection.path()),
            Self::UpdateResource(collection) => format!("{}.update", collection.path()),
            Self::DeleteResource(collection) => format!("{}.delete", collection.path()),
            Self::ListRoles => "roles.list".to_string(),
            Self::CreateRole => "roles.create".to_string(),
            Self::GetRole => "roles.get".to_string(),
            Self::UpdateRole => "roles.update".to_string(),
            Self::DeleteRole => "roles.delete".to_string(),
            Self::ListUsers => "users.list".to_string(),
            Self::CreateUser => "users.create".to_string(),
            Self::GetUser => "users.get".to_string(),
            Self::UpdateUser => "users.update".to_string(),
            Self::DeleteUser => "users.delete".to_string(),
            Self::AssignGrant => "users.assign_grant".to_string(),
        }
    }
}
