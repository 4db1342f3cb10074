// crates/hotelier-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Access Store
// Description: Durable access store backend using SQLite WAL.
// Purpose: Persist users, roles, grants, and business records.
// Dependencies: hotelier-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed implementation of every Hotelier store
//! interface. Reads are never cached, so role and grant changes are visible to
//! the next authorization decision. Database contents are treated as
//! untrusted and malformed rows fail closed as corruption.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteAccessStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
