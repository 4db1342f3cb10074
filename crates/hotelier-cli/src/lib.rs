// crates/hotelier-cli/src/lib.rs
// ============================================================================
// Module: Hotelier CLI Library
// Description: Offline administration helpers behind the `hotelier` binary.
// Purpose: Keep store-touching command logic testable outside `main`.
// Dependencies: hotelier-core, hotelier-store-sqlite
// ============================================================================

//! ## Overview
//! The binary parses arguments and prints results; this library does the work.
//! [`admin::explain_access`] replays one authorization decision against a
//! store, and [`admin::bootstrap_admin`] seeds the first administrator.

pub mod admin;
