// crates/hotelier-core/src/core/access.rs
// ============================================================================
// Module: Accessible Id Sets
// Description: Resolved visibility values and the storage-level filter.
// Purpose: Give stores and collaborators one vocabulary for "what is visible".
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`AccessibleIds`] is what the engine resolves for a user and module: either
//! the sentinel [`AccessibleIds::All`] or an explicit id set. [`ListingFilter`]
//! is what a store receives once the empty case has been short-circuited.
//! Business code builds it through [`crate::runtime::ListingPlan`], never from
//! role or grant fields directly.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::core::identifiers::ResourceId;

/// Resolved accessible-id-set for a user and module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "ids", rename_all = "snake_case")]
pub enum AccessibleIds {
    /// Every resource in the module.
    All,
    /// Exactly these resources (possibly none).
    Only(BTreeSet<ResourceId>),
}

impl AccessibleIds {
    /// Returns the empty set.
    #[must_use]
    pub const fn none() -> Self {
        Self::Only(BTreeSet::new())
    }

    /// Returns true when `resource_id` is visible.
    #[must_use]
    pub fn contains(&self, resource_id: &ResourceId) -> bool {
        match self {
            Self::All => true,
            Self::Only(ids) => ids.contains(resource_id),
        }
    }

    /// Returns true when nothing is visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Only(ids) if ids.is_empty())
    }

    /// Returns true for the [`AccessibleIds::All`] sentinel.
    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

/// Filter passed to storage for a collection query.
///
/// # Invariants
/// - `Restricted` never holds an empty set when built by
///   [`crate::runtime::ListingPlan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingFilter {
    /// Query without restriction.
    Unrestricted,
    /// Query only these ids.
    Restricted(BTreeSet<ResourceId>),
}

impl ListingFilter {
    /// Returns true when a record with `resource_id` passes the filter.
    #[must_use]
    pub fn permits(&self, resource_id: &ResourceId) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Restricted(ids) => ids.contains(resource_id),
        }
    }
}
