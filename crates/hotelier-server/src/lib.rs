// crates/hotelier-server/src/lib.rs
// ============================================================================
// Module: Hotelier Server
// Description: HTTP/JSON transport for the Hotelier authorization engine.
// Purpose: Expose guarded portfolio, property, role, and user operations.
// Dependencies: hotelier-core, hotelier-config, hotelier-store-sqlite, axum, tokio
// ============================================================================

//! ## Overview
//! Hotelier server exposes the hotel-portfolio backend over HTTP. Every route
//! is registered as an [`operations::Operation`] and passes through
//! [`hotelier_core::RequestGuard`] before any store access. Callers who may
//! not see a resource get the same response whether it exists or not.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod api;
pub mod audit;
pub mod auth;
pub mod operations;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use api::AccessReport;
pub use api::ApiError;
pub use api::Caller;
pub use api::HotelierApi;
pub use audit::FileAuditSink;
pub use audit::StderrAuditSink;
pub use auth::AuthContext;
pub use auth::Authenticator;
pub use auth::DefaultAuthenticator;
pub use auth::RequestContext;
pub use operations::Collection;
pub use operations::Operation;
pub use server::HotelierServer;
pub use server::HotelierServerError;
