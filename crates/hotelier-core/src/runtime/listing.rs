// crates/hotelier-core/src/runtime/listing.rs
// ============================================================================
// Module: Listing Filter Contract
// Description: Turns an accessible-id-set into a storage query plan.
// Purpose: Make the engine the only source of collection filters.
// Dependencies: crate::core, crate::runtime::engine
// ============================================================================

//! ## Overview
//! Every collection operation must ask the engine for the accessible-id-set
//! before touching storage, then apply exactly one of three behaviors:
//! unrestricted query, empty result without a query, or a query restricted to
//! the set. [`filtered_listing`] is the sanctioned way to do all three; it
//! never calls the query closure when nothing is visible.

use std::collections::BTreeSet;

use crate::core::AccessibleIds;
use crate::core::ListingFilter;
use crate::core::Module;
use crate::core::ResourceId;
use crate::runtime::engine::AccessSubject;
use crate::runtime::engine::AuthorizationEngine;
use crate::runtime::engine::EngineError;

/// Query plan derived from an accessible-id-set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingPlan {
    /// Query storage without restriction.
    Unrestricted,
    /// Return an empty collection without querying storage.
    Empty,
    /// Query storage restricted to a non-empty id set.
    Restricted(BTreeSet<ResourceId>),
}

impl ListingPlan {
    /// Builds the plan for a resolved accessible-id-set.
    #[must_use]
    pub fn from_accessible(ids: AccessibleIds) -> Self {
        match ids {
            AccessibleIds::All => Self::Unrestricted,
            AccessibleIds::Only(ids) if ids.is_empty() => Self::Empty,
            AccessibleIds::Only(ids) => Self::Restricted(ids),
        }
    }

    /// Resolves the plan for `subject` on `module` through `engine`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the role or catalog is malformed.
    pub fn resolve(
        engine: &AuthorizationEngine,
        subject: &AccessSubject,
        module: Module,
    ) -> Result<Self, EngineError> {
        engine.resolve_accessible_ids(subject, module).map(Self::from_accessible)
    }

    /// Returns the storage filter, or `None` when storage must not be queried.
    #[must_use]
    pub fn into_filter(self) -> Option<ListingFilter> {
        match self {
            Self::Unrestricted => Some(ListingFilter::Unrestricted),
            Self::Empty => None,
            Self::Restricted(ids) => Some(ListingFilter::Restricted(ids)),
        }
    }
}

/// Runs a collection query for `module` under the listing contract.
///
/// `query` receives the storage filter and is not called at all when the
/// subject can see nothing.
///
/// # Errors
///
/// Returns the engine error (converted into `E`) or whatever `query` returns.
pub fn filtered_listing<T, E, F>(
    engine: &AuthorizationEngine,
    subject: &AccessSubject,
    module: Module,
    query: F,
) -> Result<Vec<T>, E>
where
    E: From<EngineError>,
    F: FnOnce(&ListingFilter) -> Result<Vec<T>, E>,
{
    match ListingPlan::resolve(engine, subject, module)?.into_filter() {
        None => Ok(Vec::new()),
        Some(filter) => query(&filter),
    }
}
