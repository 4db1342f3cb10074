// crates/hotelier-core/src/core/grant.rs
// ============================================================================
// Module: Resource Grants
// Description: Per-user explicit resource id lists for partial scope.
// Purpose: Hold the only per-user authorization data.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`ResourceGrant`] lists, per module, the resource ids a user may touch when
//! the user's role has [`crate::AccessScope::Partial`] on that module. There is
//! at most one grant per user; it is created on first assignment and updated in
//! place afterwards.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::core::catalog::Module;
use crate::core::identifiers::ResourceId;
use crate::core::identifiers::UserId;

/// Per-user resource grant record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGrant {
    /// Owning user.
    pub user_id: UserId,
    /// Granted ids per module.
    #[serde(default)]
    pub modules: BTreeMap<Module, BTreeSet<ResourceId>>,
}

impl ResourceGrant {
    /// Creates an empty grant for `user_id`.
    #[must_use]
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            modules: BTreeMap::new(),
        }
    }

    /// Returns a copy with `ids` assigned to `module`.
    #[must_use]
    pub fn with_ids<I, R>(mut self, module: Module, ids: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<ResourceId>,
    {
        self.assign(module, ids.into_iter().map(Into::into).collect());
        self
    }

    /// Replaces the id set for `module`.
    pub fn assign(&mut self, module: Module, ids: BTreeSet<ResourceId>) {
        self.modules.insert(module, ids);
    }

    /// Returns the id set for `module`, if one was assigned.
    #[must_use]
    pub fn ids_for(&self, module: Module) -> Option<&BTreeSet<ResourceId>> {
        self.modules.get(&module)
    }
}
