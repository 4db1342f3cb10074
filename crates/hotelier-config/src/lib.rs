// crates/hotelier-config/src/lib.rs
// ============================================================================
// Module: Hotelier Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for hotelier.toml semantics.
// Dependencies: hotelier-core, hotelier-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `hotelier-config` defines the configuration model for the Hotelier server
//! and CLI. Config inputs are untrusted: files are size-limited, must be
//! utf-8, and are validated fail-closed before anything starts.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
