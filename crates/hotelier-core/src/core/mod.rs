// crates/hotelier-core/src/core/mod.rs
// ============================================================================
// Module: Hotelier Core Types
// Description: Data model for catalog, roles, grants, and records.
// Purpose: Re-export the value types the engine and stores exchange.
// Dependencies: crate::core::*
// ============================================================================

//! ## Overview
//! Plain value types with no I/O. Everything here is cheap to clone and safe
//! to share across threads.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod access;
pub mod catalog;
pub mod grant;
pub mod identifiers;
pub mod records;
pub mod role;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use access::AccessibleIds;
pub use access::ListingFilter;
pub use catalog::AccessScope;
pub use catalog::Action;
pub use catalog::CapabilityLevel;
pub use catalog::CatalogEntry;
pub use catalog::CatalogError;
pub use catalog::Module;
pub use catalog::PermissionCatalog;
pub use grant::ResourceGrant;
pub use identifiers::ResourceId;
pub use identifiers::RoleId;
pub use identifiers::UserId;
pub use records::ResourceRecord;
pub use records::UserRecord;
pub use role::ModulePermission;
pub use role::Role;
pub use role::RoleError;
