// crates/hotelier-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Access Store
// Description: Durable user, role, grant, and resource store on SQLite WAL.
// Purpose: Back the request guard and collaborators with persistent state.
// Dependencies: hotelier-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`SqliteAccessStore`] implements [`UserDirectory`], [`RoleStore`],
//! [`GrantStore`], and [`ResourceDirectory`] over a single mutex-guarded
//! connection. Referential rules run inside the same transaction as the write
//! they protect: a role referenced by a user cannot be deleted, a user must
//! reference an existing role, and a grant belongs to an existing user and is
//! removed with it. Listing filters are pushed into SQL through `json_each`
//! so restricted queries never materialize rows outside the accessible set.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use hotelier_core::GrantStore;
use hotelier_core::ListingFilter;
use hotelier_core::Module;
use hotelier_core::ModulePermission;
use hotelier_core::ResourceDirectory;
use hotelier_core::ResourceGrant;
use hotelier_core::ResourceId;
use hotelier_core::ResourceRecord;
use hotelier_core::Role;
use hotelier_core::RoleId;
use hotelier_core::RoleStore;
use hotelier_core::StoreError;
use hotelier_core::UserDirectory;
use hotelier_core::UserId;
use hotelier_core::UserRecord;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode.
    #[default]
    Wal,
    /// Delete journal mode.
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode.
    #[default]
    Full,
    /// Normal synchronous mode.
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` access store.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Builds a config for `path` with default pragmas.
    #[must_use]
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Stored row cannot be decoded.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid input or store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Role is still referenced by a user.
    #[error("role {0} is still assigned to users")]
    RoleInUse(RoleId),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::RoleInUse(role_id) => Self::RoleInUse(role_id),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed access store.
#[derive(Clone)]
pub struct SqliteAccessStore {
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteAccessStore {
    /// Opens an `SQLite`-backed access store, creating the schema on first use.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Locks the connection.
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))
    }
}

impl std::fmt::Debug for SqliteAccessStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteAccessStore").finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Users
// ============================================================================

impl SqliteAccessStore {
    /// Loads one user row.
    fn load_user_row(&self, user_id: &UserId) -> Result<Option<UserRecord>, SqliteStoreError> {
        let guard = self.lock()?;
        guard
            .query_row(
                "SELECT user_id, role_id, display_name FROM users WHERE user_id = ?1",
                params![user_id.as_str()],
                |row| {
                    Ok(UserRecord {
                        user_id: UserId::new(row.get::<_, String>(0)?),
                        role_id: RoleId::new(row.get::<_, String>(1)?),
                        display_name: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))
    }

    /// Upserts a user after checking the role exists.
    fn save_user_row(&self, user: &UserRecord) -> Result<(), SqliteStoreError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let role_exists: Option<i64> = tx
            .query_row(
                "SELECT 1 FROM roles WHERE role_id = ?1",
                params![user.role_id.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        if role_exists.is_none() {
            return Err(SqliteStoreError::Invalid(format!("unknown role {}", user.role_id)));
        }
        tx.execute(
            "INSERT INTO users (user_id, role_id, display_name) VALUES (?1, ?2, ?3) ON \
             CONFLICT(user_id) DO UPDATE SET role_id = excluded.role_id, display_name = \
             excluded.display_name",
            params![user.user_id.as_str(), user.role_id.as_str(), user.display_name],
        )
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        drop(guard);
        Ok(())
    }

    /// Deletes a user; the grant row cascades.
    fn delete_user_row(&self, user_id: &UserId) -> Result<bool, SqliteStoreError> {
        let guard = self.lock()?;
        let removed = guard
            .execute("DELETE FROM users WHERE user_id = ?1", params![user_id.as_str()])
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        drop(guard);
        Ok(removed > 0)
    }

    /// Lists users passing `filter`.
    fn list_user_rows(&self, filter: &ListingFilter) -> Result<Vec<UserRecord>, SqliteStoreError> {
        let ids = filter_param(filter)?;
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare(
                "SELECT user_id, role_id, display_name FROM users WHERE ?1 IS NULL OR user_id IN \
                 (SELECT value FROM json_each(?1)) ORDER BY user_id",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let rows = stmt
            .query_map(params![ids], |row| {
                Ok(UserRecord {
                    user_id: UserId::new(row.get::<_, String>(0)?),
                    role_id: RoleId::new(row.get::<_, String>(1)?),
                    display_name: row.get(2)?,
                })
            })
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(|err| SqliteStoreError::Db(err.to_string()))
    }
}

impl UserDirectory for SqliteAccessStore {
    fn load_user(&self, user_id: &UserId) -> Result<Option<UserRecord>, StoreError> {
        self.load_user_row(user_id).map_err(StoreError::from)
    }

    fn save_user(&self, user: &UserRecord) -> Result<(), StoreError> {
        self.save_user_row(user).map_err(StoreError::from)
    }

    fn delete_user(&self, user_id: &UserId) -> Result<bool, StoreError> {
        self.delete_user_row(user_id).map_err(StoreError::from)
    }

    fn list_users(&self, filter: &ListingFilter) -> Result<Vec<UserRecord>, StoreError> {
        self.list_user_rows(filter).map_err(StoreError::from)
    }
}

// ============================================================================
// SECTION: Roles
// ============================================================================

/// Raw role row before permission decoding.
type RoleRow = (String, String, bool, String);

impl SqliteAccessStore {
    /// Loads one role row.
    fn load_role_row(&self, role_id: &RoleId) -> Result<Option<Role>, SqliteStoreError> {
        let row: Option<RoleRow> = {
            let guard = self.lock()?;
            guard
                .query_row(
                    "SELECT role_id, name, is_external, permissions_json FROM roles WHERE \
                     role_id = ?1",
                    params![role_id.as_str()],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
                )
                .optional()
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?
        };
        row.map(decode_role).transpose()
    }

    /// Upserts a validated role.
    fn save_role_row(&self, role: &Role) -> Result<(), SqliteStoreError> {
        role.validate().map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        let permissions = serde_json::to_string(&role.permissions)
            .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        let guard = self.lock()?;
        guard
            .execute(
                "INSERT INTO roles (role_id, name, is_external, permissions_json) VALUES (?1, \
                 ?2, ?3, ?4) ON CONFLICT(role_id) DO UPDATE SET name = excluded.name, \
                 is_external = excluded.is_external, permissions_json = \
                 excluded.permissions_json",
                params![role.role_id.as_str(), role.name, role.is_external, permissions],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        drop(guard);
        Ok(())
    }

    /// Deletes a role unless a user references it.
    fn delete_role_row(&self, role_id: &RoleId) -> Result<bool, SqliteStoreError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let in_use: i64 = tx
            .query_row(
                "SELECT COUNT(*) FROM users WHERE role_id = ?1",
                params![role_id.as_str()],
                |row| row.get(0),
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        if in_use > 0 {
            return Err(SqliteStoreError::RoleInUse(role_id.clone()));
        }
        let removed = tx
            .execute("DELETE FROM roles WHERE role_id = ?1", params![role_id.as_str()])
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        drop(guard);
        Ok(removed > 0)
    }

    /// Lists roles passing `filter`.
    fn list_role_rows(&self, filter: &ListingFilter) -> Result<Vec<Role>, SqliteStoreError> {
        let ids = filter_param(filter)?;
        let rows: Vec<RoleRow> = {
            let guard = self.lock()?;
            let mut stmt = guard
                .prepare(
                    "SELECT role_id, name, is_external, permissions_json FROM roles WHERE ?1 IS \
                     NULL OR role_id IN (SELECT value FROM json_each(?1)) ORDER BY role_id",
                )
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let rows = stmt
                .query_map(params![ids], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                })
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            rows.collect::<Result<Vec<_>, _>>()
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?
        };
        rows.into_iter().map(decode_role).collect()
    }
}

impl RoleStore for SqliteAccessStore {
    fn load_role(&self, role_id: &RoleId) -> Result<Option<Role>, StoreError> {
        self.load_role_row(role_id).map_err(StoreError::from)
    }

    fn save_role(&self, role: &Role) -> Result<(), StoreError> {
        self.save_role_row(role).map_err(StoreError::from)
    }

    fn delete_role(&self, role_id: &RoleId) -> Result<bool, StoreError> {
        self.delete_role_row(role_id).map_err(StoreError::from)
    }

    fn list_roles(&self, filter: &ListingFilter) -> Result<Vec<Role>, StoreError> {
        self.list_role_rows(filter).map_err(StoreError::from)
    }
}

// ============================================================================
// SECTION: Grants
// ============================================================================

/// Granted ids per module as stored in `grants.modules_json`.
type GrantModules = BTreeMap<Module, BTreeSet<ResourceId>>;

impl SqliteAccessStore {
    /// Loads the grant row for a user.
    fn load_grant_row(&self, user_id: &UserId) -> Result<Option<ResourceGrant>, SqliteStoreError> {
        let json: Option<String> = {
            let guard = self.lock()?;
            guard
                .query_row(
                    "SELECT modules_json FROM grants WHERE user_id = ?1",
                    params![user_id.as_str()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?
        };
        json.map(|json| {
            let modules = decode_grant_modules(user_id, &json)?;
            Ok(ResourceGrant {
                user_id: user_id.clone(),
                modules,
            })
        })
        .transpose()
    }

    /// Replaces the ids for one module, creating the grant row on first use.
    fn assign_grant_row(
        &self,
        user_id: &UserId,
        module: Module,
        ids: BTreeSet<ResourceId>,
    ) -> Result<ResourceGrant, SqliteStoreError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let user_exists: Option<i64> = tx
            .query_row(
                "SELECT 1 FROM users WHERE user_id = ?1",
                params![user_id.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        if user_exists.is_none() {
            return Err(SqliteStoreError::Invalid(format!("unknown user {user_id}")));
        }
        let existing: Option<String> = tx
            .query_row(
                "SELECT modules_json FROM grants WHERE user_id = ?1",
                params![user_id.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let mut grant = ResourceGrant::new(user_id.clone());
        if let Some(json) = existing {
            grant.modules = decode_grant_modules(user_id, &json)?;
        }
        grant.assign(module, ids);
        let json = serde_json::to_string(&grant.modules)
            .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        tx.execute(
            "INSERT INTO grants (user_id, modules_json) VALUES (?1, ?2) ON CONFLICT(user_id) DO \
             UPDATE SET modules_json = excluded.modules_json",
            params![user_id.as_str(), json],
        )
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        drop(guard);
        Ok(grant)
    }

    /// Deletes the grant row for a user.
    fn delete_grant_row(&self, user_id: &UserId) -> Result<bool, SqliteStoreError> {
        let guard = self.lock()?;
        let removed = guard
            .execute("DELETE FROM grants WHERE user_id = ?1", params![user_id.as_str()])
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        drop(guard);
        Ok(removed > 0)
    }
}

impl GrantStore for SqliteAccessStore {
    fn load_grant(&self, user_id: &UserId) -> Result<Option<ResourceGrant>, StoreError> {
        self.load_grant_row(user_id).map_err(StoreError::from)
    }

    fn assign_grant(
        &self,
        user_id: &UserId,
        module: Module,
        ids: BTreeSet<ResourceId>,
    ) -> Result<ResourceGrant, StoreError> {
        self.assign_grant_row(user_id, module, ids).map_err(StoreError::from)
    }

    fn delete_grant(&self, user_id: &UserId) -> Result<bool, StoreError> {
        self.delete_grant_row(user_id).map_err(StoreError::from)
    }
}

// ============================================================================
// SECTION: Resources
// ============================================================================

/// Raw resource row before attribute decoding.
type ResourceRow = (String, String, String);

impl SqliteAccessStore {
    /// Loads one resource row.
    fn get_resource_row(
        &self,
        module: Module,
        resource_id: &ResourceId,
    ) -> Result<Option<ResourceRecord>, SqliteStoreError> {
        let row: Option<ResourceRow> = {
            let guard = self.lock()?;
            guard
                .query_row(
                    "SELECT resource_id, name, attributes_json FROM resources WHERE module = ?1 \
                     AND resource_id = ?2",
                    params![module.as_str(), resource_id.as_str()],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                )
                .optional()
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?
        };
        row.map(|row| decode_resource(module, row)).transpose()
    }

    /// Lists resource rows of `module` passing `filter`.
    fn list_resource_rows(
        &self,
        module: Module,
        filter: &ListingFilter,
    ) -> Result<Vec<ResourceRecord>, SqliteStoreError> {
        let ids = filter_param(filter)?;
        let rows: Vec<ResourceRow> = {
            let guard = self.lock()?;
            let mut stmt = guard
                .prepare(
                    "SELECT resource_id, name, attributes_json FROM resources WHERE module = ?1 \
                     AND (?2 IS NULL OR resource_id IN (SELECT value FROM json_each(?2))) ORDER \
                     BY resource_id",
                )
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let rows = stmt
                .query_map(params![module.as_str(), ids], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
                })
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            rows.collect::<Result<Vec<_>, _>>()
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?
        };
        rows.into_iter().map(|row| decode_resource(module, row)).collect()
    }

    /// Upserts a resource row.
    fn save_resource_row(&self, record: &ResourceRecord) -> Result<(), SqliteStoreError> {
        let attributes = serde_json::to_string(&record.attributes)
            .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        let guard = self.lock()?;
        guard
            .execute(
                "INSERT INTO resources (module, resource_id, name, attributes_json) VALUES (?1, \
                 ?2, ?3, ?4) ON CONFLICT(module, resource_id) DO UPDATE SET name = \
                 excluded.name, attributes_json = excluded.attributes_json",
                params![
                    record.module.as_str(),
                    record.resource_id.as_str(),
                    record.name,
                    attributes
                ],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        drop(guard);
        Ok(())
    }

    /// Deletes a resource row.
    fn delete_resource_row(
        &self,
        module: Module,
        resource_id: &ResourceId,
    ) -> Result<bool, SqliteStoreError> {
        let guard = self.lock()?;
        let removed = guard
            .execute(
                "DELETE FROM resources WHERE module = ?1 AND resource_id = ?2",
                params![module.as_str(), resource_id.as_str()],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        drop(guard);
        Ok(removed > 0)
    }
}

impl ResourceDirectory for SqliteAccessStore {
    fn get_resource(
        &self,
        module: Module,
        resource_id: &ResourceId,
    ) -> Result<Option<ResourceRecord>, StoreError> {
        self.get_resource_row(module, resource_id).map_err(StoreError::from)
    }

    fn list_resources(
        &self,
        module: Module,
        filter: &ListingFilter,
    ) -> Result<Vec<ResourceRecord>, StoreError> {
        self.list_resource_rows(module, filter).map_err(StoreError::from)
    }

    fn save_resource(&self, record: &ResourceRecord) -> Result<(), StoreError> {
        self.save_resource_row(record).map_err(StoreError::from)
    }

    fn delete_resource(
        &self,
        module: Module,
        resource_id: &ResourceId,
    ) -> Result<bool, StoreError> {
        self.delete_resource_row(module, resource_id).map_err(StoreError::from)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Encodes a listing filter as a JSON id array, or `None` when unrestricted.
fn filter_param(filter: &ListingFilter) -> Result<Option<String>, SqliteStoreError> {
    match filter {
        ListingFilter::Unrestricted => Ok(None),
        ListingFilter::Restricted(ids) => serde_json::to_string(ids)
            .map(Some)
            .map_err(|err| SqliteStoreError::Invalid(err.to_string())),
    }
}

/// Decodes a role row.
fn decode_role(row: RoleRow) -> Result<Role, SqliteStoreError> {
    let (role_id, name, is_external, permissions_json) = row;
    let permissions: BTreeMap<Module, ModulePermission> = serde_json::from_str(&permissions_json)
        .map_err(|err| {
        SqliteStoreError::Corrupt(format!("invalid permissions for role {role_id}: {err}"))
    })?;
    Ok(Role {
        role_id: RoleId::new(role_id),
        name,
        is_external,
        permissions,
    })
}

/// Decodes the module map of a grant row.
fn decode_grant_modules(user_id: &UserId, json: &str) -> Result<GrantModules, SqliteStoreError> {
    serde_json::from_str(json).map_err(|err| {
        SqliteStoreError::Corrupt(format!("invalid grant for user {user_id}: {err}"))
    })
}

/// Decodes a resource row.
fn decode_resource(module: Module, row: ResourceRow) -> Result<ResourceRecord, SqliteStoreError> {
    let (resource_id, name, attributes_json) = row;
    let attributes = serde_json::from_str(&attributes_json).map_err(|err| {
        SqliteStoreError::Corrupt(format!("invalid attributes for {module}/{resource_id}: {err}"))
    })?;
    Ok(ResourceRecord {
        module,
        resource_id: ResourceId::new(resource_id),
        name,
        attributes,
    })
}

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.is_empty() {
        return Err(SqliteStoreError::Invalid("store path must be non-empty".to_string()));
    }
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability and referential checks.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS roles (
                    role_id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    is_external INTEGER NOT NULL DEFAULT 0,
                    permissions_json TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS users (
                    user_id TEXT PRIMARY KEY,
                    role_id TEXT NOT NULL,
                    display_name TEXT NOT NULL DEFAULT '',
                    FOREIGN KEY (role_id) REFERENCES roles(role_id) ON DELETE RESTRICT
                );
                CREATE INDEX IF NOT EXISTS idx_users_role_id ON users (role_id);
                CREATE TABLE IF NOT EXISTS grants (
                    user_id TEXT PRIMARY KEY,
                    modules_json TEXT NOT NULL,
                    FOREIGN KEY (user_id) REFERENCES users(user_id) ON DELETE CASCADE
                );
                CREATE TABLE IF NOT EXISTS resources (
                    module TEXT NOT NULL,
                    resource_id TEXT NOT NULL,
                    name TEXT NOT NULL DEFAULT '',
                    attributes_json TEXT NOT NULL DEFAULT 'null',
                    PRIMARY KEY (module, resource_id)
                );",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}
