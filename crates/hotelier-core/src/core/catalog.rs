// crates/hotelier-core/src/core/catalog.rs
// ============================================================================
// Module: Permission Catalog
// Description: Static vocabulary of modules, actions, levels, and scopes.
// Purpose: Single source of truth for per-module capability thresholds.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! The permission catalog names every protected module, the ordered
//! capability levels, and the ordered access scopes. For each module it records
//! the minimum [`CapabilityLevel`] per [`Action`] and whether the module
//! supports [`AccessScope::Partial`]. No other component may hard-code these
//! thresholds.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Vocabulary
// ============================================================================

/// Protected resource family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    /// Hotel portfolios.
    Portfolio,
    /// Individual properties.
    Property,
    /// Property audits.
    Audit,
    /// Bank details attached to properties.
    BankDetails,
    /// Service type reference data.
    ServiceType,
    /// User accounts.
    User,
    /// Roles assignable to users.
    UserRole,
    /// System-wide settings.
    SystemSettings,
}

impl Module {
    /// Every module, in catalog order.
    pub const ALL: [Self; 8] = [
        Self::Portfolio,
        Self::Property,
        Self::Audit,
        Self::BankDetails,
        Self::ServiceType,
        Self::User,
        Self::UserRole,
        Self::SystemSettings,
    ];

    /// Returns the canonical snake-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Portfolio => "portfolio",
            Self::Property => "property",
            Self::Audit => "audit",
            Self::BankDetails => "bank_details",
            Self::ServiceType => "service_type",
            Self::User => "user",
            Self::UserRole => "user_role",
            Self::SystemSettings => "system_settings",
        }
    }

    /// Parses a canonical label. Matching is case-insensitive.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|module| module.as_str().eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation kind requested on a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Create a resource.
    Create,
    /// Read or list resources.
    Read,
    /// Update a resource.
    Update,
    /// Delete a resource.
    Delete,
}

impl Action {
    /// Every action.
    pub const ALL: [Self; 4] = [Self::Create, Self::Read, Self::Update, Self::Delete];

    /// Returns the canonical label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Parses a canonical label. Matching is case-insensitive.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.as_str().eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How much a role may do within a module.
///
/// # Invariants
/// - Totally ordered: `View < Update < All` (declaration order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityLevel {
    /// Read only.
    View,
    /// Read, create, and update.
    Update,
    /// Every action, including delete.
    All,
}

impl CapabilityLevel {
    /// Every level, lowest first.
    pub const ALL: [Self; 3] = [Self::View, Self::Update, Self::All];

    /// Returns the canonical label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Update => "update",
            Self::All => "all",
        }
    }

    /// Returns true when this level is at or above `minimum`.
    #[must_use]
    pub fn satisfies(self, minimum: Self) -> bool {
        self >= minimum
    }
}

/// How much of a module's resource universe a role may see.
///
/// # Invariants
/// - Ordered by permissiveness: `None < Partial < All`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessScope {
    /// No resources are visible.
    None,
    /// Only resources explicitly granted to the user.
    Partial,
    /// Every resource in the module.
    All,
}

impl AccessScope {
    /// Every scope, least permissive first.
    pub const ALL: [Self; 3] = [Self::None, Self::Partial, Self::All];

    /// Returns the canonical label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Partial => "partial",
            Self::All => "all",
        }
    }
}

// ============================================================================
// SECTION: Catalog Entries
// ============================================================================

/// Thresholds and scope support for a single module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Module described by this entry.
    pub module: Module,
    /// Minimum level for [`Action::Create`].
    pub create: CapabilityLevel,
    /// Minimum level for [`Action::Read`].
    pub read: CapabilityLevel,
    /// Minimum level for [`Action::Update`].
    pub update: CapabilityLevel,
    /// Minimum level for [`Action::Delete`].
    pub delete: CapabilityLevel,
    /// Whether [`AccessScope::Partial`] is meaningful for this module.
    pub supports_partial: bool,
}

impl CatalogEntry {
    /// Builds an entry with the standard thresholds.
    #[must_use]
    pub const fn standard(module: Module, supports_partial: bool) -> Self {
        Self {
            module,
            create: CapabilityLevel::Update,
            read: CapabilityLevel::View,
            update: CapabilityLevel::Update,
            delete: CapabilityLevel::All,
            supports_partial,
        }
    }

    /// Builds an entry where writes require [`CapabilityLevel::All`].
    #[must_use]
    pub const fn restricted(module: Module, supports_partial: bool) -> Self {
        Self {
            module,
            create: CapabilityLevel::All,
            read: CapabilityLevel::View,
            update: CapabilityLevel::All,
            delete: CapabilityLevel::All,
            supports_partial,
        }
    }

    /// Returns the minimum level required for `action`.
    #[must_use]
    pub const fn minimum(&self, action: Action) -> CapabilityLevel {
        match action {
            Action::Create => self.create,
            Action::Read => self.read,
            Action::Update => self.update,
            Action::Delete => self.delete,
        }
    }

    /// Returns true when read <= create/update <= delete.
    #[must_use]
    pub fn is_monotone(&self) -> bool {
        self.read <= self.create
            && self.read <= self.update
            && self.create <= self.delete
            && self.update <= self.delete
    }
}

/// Built-in catalog table.
const BUILTIN_ENTRIES: [CatalogEntry; 8] = [
    CatalogEntry::standard(Module::Portfolio, true),
    CatalogEntry::standard(Module::Property, true),
    CatalogEntry::standard(Module::Audit, false),
    CatalogEntry::standard(Module::BankDetails, true),
    CatalogEntry::standard(Module::ServiceType, false),
    CatalogEntry::standard(Module::User, true),
    CatalogEntry::restricted(Module::UserRole, false),
    CatalogEntry::restricted(Module::SystemSettings, false),
];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Catalog construction and lookup errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// No entry exists for the module.
    #[error("permission catalog has no entry for module {0}")]
    MissingEntry(Module),
    /// The module was listed more than once.
    #[error("permission catalog lists module {0} more than once")]
    DuplicateEntry(Module),
    /// Thresholds for the module are not ordered read <= write <= delete.
    #[error("permission catalog thresholds for module {0} are not monotone")]
    NonMonotone(Module),
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Read-only permission catalog.
///
/// # Invariants
/// - At most one entry per module; every entry is monotone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionCatalog {
    /// Entries keyed by module.
    entries: BTreeMap<Module, CatalogEntry>,
}

impl PermissionCatalog {
    /// Returns the built-in catalog used by production deployments.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_ENTRIES.iter().map(|entry| (entry.module, *entry)).collect(),
        }
    }

    /// Builds a catalog from explicit entries.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when a module repeats or an entry is not
    /// monotone.
    pub fn from_entries(
        entries: impl IntoIterator<Item = CatalogEntry>,
    ) -> Result<Self, CatalogError> {
        let mut map = BTreeMap::new();
        for entry in entries {
            if !entry.is_monotone() {
                return Err(CatalogError::NonMonotone(entry.module));
            }
            if map.insert(entry.module, entry).is_some() {
                return Err(CatalogError::DuplicateEntry(entry.module));
            }
        }
        Ok(Self {
            entries: map,
        })
    }

    /// Returns true when every [`Module`] has an entry.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        Module::ALL.iter().all(|module| self.entries.contains_key(module))
    }

    /// Returns the entry for `module`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MissingEntry`] when the module is absent.
    pub fn entry(&self, module: Module) -> Result<&CatalogEntry, CatalogError> {
        self.entries.get(&module).ok_or(CatalogError::MissingEntry(module))
    }

    /// Returns the minimum capability level for `(module, action)`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MissingEntry`] when the module is absent.
    pub fn minimum_level(
        &self,
        module: Module,
        action: Action,
    ) -> Result<CapabilityLevel, CatalogError> {
        self.entry(module).map(|entry| entry.minimum(action))
    }

    /// Returns whether `module` supports partial scope.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MissingEntry`] when the module is absent.
    pub fn supports_partial(&self, module: Module) -> Result<bool, CatalogError> {
        self.entry(module).map(|entry| entry.supports_partial)
    }

    /// Iterates entries in module order.
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }
}

impl Default for PermissionCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
