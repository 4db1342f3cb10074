// crates/hotelier-server/src/auth.rs
// ============================================================================
// Module: Caller Authentication
// Description: Maps transport credentials onto a known user identity.
// Purpose: Resolve who is calling before the guard decides what they may do.
// Dependencies: hotelier-config, hotelier-core, sha2, thiserror
// ============================================================================

//! ## Overview
//! Authentication only answers "which user is this". It never decides access;
//! that is the guard's job. Two modes exist: `local_only` maps loopback peers
//! to the configured local user, `bearer_token` maps a configured token to its
//! bound user. Failures are fail-closed and leave the caller anonymous.
//! Tokens are never retained; only a sha256 fingerprint is kept.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::IpAddr;

use hotelier_config::ServerAuthConfig;
use hotelier_config::ServerAuthMode;
use hotelier_core::UserId;
use sha2::Digest;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted `Authorization` header size.
const MAX_AUTH_HEADER_BYTES: usize = 8 * 1024;

/// Maximum accepted request identifier length.
const MAX_REQUEST_ID_BYTES: usize = 128;

// ============================================================================
// SECTION: Request Context
// ============================================================================

/// Per-request transport facts used for authentication.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Peer IP address when available.
    pub peer_ip: Option<IpAddr>,
    /// Raw `Authorization` header value.
    pub auth_header: Option<String>,
    /// Caller-supplied request identifier.
    pub request_id: Option<String>,
}

impl RequestContext {
    /// Builds an HTTP request context.
    #[must_use]
    pub const fn http(peer_ip: Option<IpAddr>, auth_header: Option<String>) -> Self {
        Self {
            peer_ip,
            auth_header,
            request_id: None,
        }
    }

    /// Returns a copy with the request identifier set. Oversized or
    /// non-printable identifiers are dropped.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        let request_id = request_id.into();
        if request_id.len() <= MAX_REQUEST_ID_BYTES
            && !request_id.is_empty()
            && request_id.chars().all(|ch| ch.is_ascii_graphic())
        {
            self.request_id = Some(request_id);
        }
        self
    }

    /// Returns true when the peer IP is loopback.
    #[must_use]
    pub fn peer_is_loopback(&self) -> bool {
        self.peer_ip.is_some_and(|ip| ip.is_loopback())
    }
}

// ============================================================================
// SECTION: Auth Context
// ============================================================================

/// Authentication method used for the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// Loopback access in local-only mode.
    Local,
    /// Bearer token authentication.
    BearerToken,
}

impl AuthMethod {
    /// Returns the method label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::BearerToken => "bearer_token",
        }
    }
}

/// Authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// Authentication method.
    pub method: AuthMethod,
    /// User the credentials map to.
    pub user_id: UserId,
    /// Sha256 fingerprint of the bearer token, hex encoded.
    pub token_fingerprint: Option<String>,
}

/// Authentication failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Missing or invalid credentials.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
}

// ============================================================================
// SECTION: Authenticator
// ============================================================================

/// Resolves callers to user identities.
pub trait Authenticator: Send + Sync {
    /// Authenticate the request.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when the credentials are missing or invalid.
    fn authenticate(&self, ctx: &RequestContext) -> Result<AuthContext, AuthError>;
}

/// Authenticator derived from `[server.auth]`.
pub struct DefaultAuthenticator {
    /// Configured mode.
    mode: ServerAuthMode,
    /// User assumed by loopback callers in local-only mode.
    local_user: UserId,
    /// Bearer token to user bindings.
    tokens: Vec<(String, UserId)>,
}

impl DefaultAuthenticator {
    /// Builds the authenticator from validated auth configuration.
    #[must_use]
    pub fn from_config(config: &ServerAuthConfig) -> Self {
        let tokens = config
            .tokens
            .iter()
            .map(|binding| (binding.token.clone(), binding.user_id.clone()))
            .collect();
        Self {
            mode: config.mode,
            local_user: config.local_user.clone(),
            tokens,
        }
    }

    /// Returns the configured auth mode.
    #[must_use]
    pub const fn mode(&self) -> ServerAuthMode {
        self.mode
    }
}

impl std::fmt::Debug for DefaultAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultAuthenticator")
            .field("mode", &self.mode)
            .field("local_user", &self.local_user)
            .field("tokens", &self.tokens.len())
            .finish()
    }
}

impl Authenticator for DefaultAuthenticator {
    fn authenticate(&self, ctx: &RequestContext) -> Result<AuthContext, AuthError> {
        match self.mode {
            ServerAuthMode::LocalOnly => {
                if !ctx.peer_is_loopback() {
                    return Err(AuthError::Unauthenticated(
                        "local-only mode requires loopback access".to_string(),
                    ));
                }
                Ok(AuthContext {
                    method: AuthMethod::Local,
                    user_id: self.local_user.clone(),
                    token_fingerprint: None,
                })
            }
            ServerAuthMode::BearerToken => {
                let token = parse_bearer_token(ctx.auth_header.as_deref())?;
                let user_id = self
                    .tokens
                    .iter()
                    .find(|(candidate, _)| {
                        bool::from(candidate.as_bytes().ct_eq(token.as_bytes()))
                    })
                    .map(|(_, user_id)| user_id)
                    .ok_or_else(|| AuthError::Unauthenticated("invalid bearer token".to_string()))?;
                Ok(AuthContext {
                    method: AuthMethod::BearerToken,
                    user_id: user_id.clone(),
                    token_fingerprint: Some(token_fingerprint(token)),
                })
            }
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Extracts the token from a `Bearer` authorization header.
fn parse_bearer_token(auth_header: Option<&str>) -> Result<&str, AuthError> {
    let header = auth_header
        .ok_or_else(|| AuthError::Unauthenticated("missing authorization".to_string()))?;
    if header.len() > MAX_AUTH_HEADER_BYTES {
        return Err(AuthError::Unauthenticated("authorization header too large".to_string()));
    }
    let mut parts = header.trim().splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    let token = parts.next().unwrap_or_default().trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::Unauthenticated("invalid authorization header".to_string()));
    }
    Ok(token)
}

/// Returns the lowercase hex sha256 digest of `token`.
#[must_use]
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push(hex_digit(byte >> 4));
        out.push(hex_digit(byte & 0x0f));
    }
    out
}

/// Maps a nibble to its lowercase hex digit.
fn hex_digit(nibble: u8) -> char {
    match nibble {
        0..=9 => char::from(b'0' + nibble),
        _ => char::from(b'a' + nibble - 10),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
