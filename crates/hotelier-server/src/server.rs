// crates/hotelier-server/src/server.rs
// ============================================================================
// Module: Hotelier HTTP Server
// Description: axum routes for the Hotelier API.
// Purpose: Authenticate callers, dispatch to the API, and map errors to HTTP.
// Dependencies: hotelier-config, hotelier-core, hotelier-store-sqlite, axum, tokio
// ============================================================================

//! ## Overview
//! The server resolves the caller through [`crate::auth::Authenticator`] and
//! hands every request to [`crate::api::HotelierApi`], which runs the guard
//! before any business logic. Failed authentication does not short-circuit:
//! the guard sees an anonymous caller and audits the rejection. Store access is
//! synchronous, so handlers shift onto a blocking context when the runtime
//! allows it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::ConnectInfo;
use axum::extract::DefaultBodyLimit;
use axum::extract::Path;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::put;
use hotelier_config::HotelierConfig;
use hotelier_config::ServerAuthMode;
use hotelier_config::StoreType;
use hotelier_core::AuthorizationEngine;
use hotelier_core::GuardAuditSink;
use hotelier_core::InMemoryAccessStore;
use hotelier_core::RequestGuard;
use hotelier_core::ResourceId;
use hotelier_core::Role;
use hotelier_core::RoleId;
use hotelier_core::SharedAccessStore;
use hotelier_core::UserId;
use hotelier_core::UserRecord;
use hotelier_store_sqlite::SqliteAccessStore;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::net::TcpListener;

use crate::api::ApiError;
use crate::api::Caller;
use crate::api::GrantAssignment;
use crate::api::HotelierApi;
use crate::api::NewResource;
use crate::api::ResourceUpdate;
use crate::api::UserUpdate;
use crate::audit::build_audit_sink;
use crate::auth::Authenticator;
use crate::auth::DefaultAuthenticator;
use crate::auth::RequestContext;
use crate::operations::Collection;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Header carrying the caller's request identifier.
const REQUEST_ID_HEADER: &str = "x-request-id";

// ============================================================================
// SECTION: Server
// ============================================================================

/// Hotelier HTTP server instance.
pub struct HotelierServer {
    /// Validated configuration.
    config: HotelierConfig,
    /// Shared handler state.
    state: Arc<ServerState>,
}

impl HotelierServer {
    /// Builds a server from configuration, opening the configured store and
    /// audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`HotelierServerError`] when the configuration is invalid or
    /// the store or audit sink cannot be opened.
    pub fn from_config(config: HotelierConfig) -> Result<Self, HotelierServerError> {
        config.validate().map_err(|err| HotelierServerError::Config(err.to_string()))?;
        let store = build_access_store(&config)?;
        let audit = build_audit_sink(&config.audit)
            .map_err(|err| HotelierServerError::Init(format!("audit sink: {err}")))?;
        Self::new(config, store, audit)
    }

    /// Builds a server over an existing store and audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`HotelierServerError::Config`] when the configuration is
    /// invalid.
    pub fn new(
        config: HotelierConfig,
        store: SharedAccessStore,
        audit: Arc<dyn GuardAuditSink>,
    ) -> Result<Self, HotelierServerError> {
        config.validate().map_err(|err| HotelierServerError::Config(err.to_string()))?;
        let engine = Arc::new(AuthorizationEngine::builtin());
        let api = HotelierApi::new(RequestGuard::new(engine, store, audit));
        let authenticator = DefaultAuthenticator::from_config(&config.server.auth);
        let state = Arc::new(ServerState {
            api,
            authenticator: Arc::new(authenticator),
            max_body_bytes: config.server.max_body_bytes,
        });
        Ok(Self {
            config,
            state,
        })
    }

    /// Returns the API behind the routes.
    #[must_use]
    pub fn api(&self) -> &HotelierApi {
        &self.state.api
    }

    /// Builds the axum router.
    #[must_use]
    pub fn router(&self) -> Router {
        build_router(Arc::clone(&self.state))
    }

    /// Binds the configured address and serves until the process stops.
    ///
    /// # Errors
    ///
    /// Returns [`HotelierServerError`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), HotelierServerError> {
        let addr = self
            .config
            .server
            .bind_addr()
            .map_err(|err| HotelierServerError::Config(err.to_string()))?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|_| HotelierServerError::Transport("http bind failed".to_string()))?;
        self.serve_listener(listener).await
    }

    /// Serves on an already bound listener.
    ///
    /// # Errors
    ///
    /// Returns [`HotelierServerError::Transport`] when serving fails.
    pub async fn serve_listener(self, listener: TcpListener) -> Result<(), HotelierServerError> {
        emit_local_only_warning(&self.config);
        let app = self.router();
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .map_err(|_| HotelierServerError::Transport("http server failed".to_string()))
    }
}

/// Opens the access store selected by `[store]`.
fn build_access_store(config: &HotelierConfig) -> Result<SharedAccessStore, HotelierServerError> {
    let store = match config.store.store_type {
        StoreType::Memory => SharedAccessStore::from_store(InMemoryAccessStore::new()),
        StoreType::Sqlite => {
            let sqlite_config = config.store.sqlite_config().ok_or_else(|| {
                HotelierServerError::Config("sqlite store requires path".to_string())
            })?;
            let store = SqliteAccessStore::new(&sqlite_config)
                .map_err(|err| HotelierServerError::Init(err.to_string()))?;
            SharedAccessStore::from_store(store)
        }
    };
    Ok(store)
}

// ============================================================================
// SECTION: Router
// ============================================================================

/// Shared state for HTTP handlers.
struct ServerState {
    /// Business handlers.
    api: HotelierApi,
    /// Caller authentication.
    authenticator: Arc<dyn Authenticator>,
    /// Maximum allowed request body size.
    max_body_bytes: usize,
}

impl ServerState {
    /// Resolves the caller for a request. Authentication failures yield an
    /// anonymous caller so the guard records the rejection.
    fn caller(&self, peer: SocketAddr, headers: &HeaderMap) -> Caller {
        let auth_header =
            headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok()).map(str::to_string);
        let mut context = RequestContext::http(Some(peer.ip()), auth_header);
        if let Some(request_id) =
            headers.get(REQUEST_ID_HEADER).and_then(|value| value.to_str().ok())
        {
            context = context.with_request_id(request_id);
        }
        let user_id = self.authenticator.authenticate(&context).ok().map(|auth| auth.user_id);
        Caller {
            user_id,
            request_id: context.request_id,
        }
    }

    /// Decodes a JSON body within the configured size limit.
    fn parse_body<T: DeserializeOwned>(&self, bytes: &Bytes) -> Result<T, ApiError> {
        if bytes.len() > self.max_body_bytes {
            return Err(ApiError::PayloadTooLarge);
        }
        serde_json::from_slice(bytes.as_ref())
            .map_err(|err| ApiError::InvalidRequest(format!("invalid json body: {err}")))
    }
}

/// Builds the route table.
fn build_router(state: Arc<ServerState>) -> Router {
    let body_limit = state.max_body_bytes;
    Router::new()
        .route("/api/me/access", get(my_access))
        .route("/api/roles", get(list_roles).post(create_role))
        .route("/api/roles/{id}", get(get_role).put(update_role).delete(delete_role))
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/api/users/{id}/grants/{module}", put(assign_grant))
        .route("/api/{collection}", get(list_resources).post(create_resource))
        .route(
            "/api/{collection}/{id}",
            get(get_resource).put(update_resource).delete(delete_resource),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// `GET /api/me/access`
async fn my_access(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    let caller = state.caller(peer, &headers);
    respond(StatusCode::OK, run_blocking(|| state.api.my_access(&caller)))
}

/// `GET /api/{collection}`
async fn list_resources(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path(collection): Path<String>,
) -> Response {
    let caller = state.caller(peer, &headers);
    let result = parse_collection(&collection)
        .and_then(|collection| run_blocking(|| state.api.list_resources(&caller, collection)));
    respond(StatusCode::OK, result)
}

/// `POST /api/{collection}`
async fn create_resource(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path(collection): Path<String>,
    bytes: Bytes,
) -> Response {
    let caller = state.caller(peer, &headers);
    let result = parse_collection(&collection).and_then(|collection| {
        let input: NewResource = state.parse_body(&bytes)?;
        run_blocking(|| state.api.create_resource(&caller, collection, input))
    });
    respond(StatusCode::CREATED, result)
}

/// `GET /api/{collection}/{id}`
async fn get_resource(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path((collection, id)): Path<(String, String)>,
) -> Response {
    let caller = state.caller(peer, &headers);
    let resource_id = ResourceId::new(id);
    let result = parse_collection(&collection).and_then(|collection| {
        run_blocking(|| state.api.get_resource(&caller, collection, &resource_id))
    });
    respond(StatusCode::OK, result)
}

/// `PUT /api/{collection}/{id}`
async fn update_resource(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path((collection, id)): Path<(String, String)>,
    bytes: Bytes,
) -> Response {
    let caller = state.caller(peer, &headers);
    let resource_id = ResourceId::new(id);
    let result = parse_collection(&collection).and_then(|collection| {
        let update: ResourceUpdate = state.parse_body(&bytes)?;
        run_blocking(|| state.api.update_resource(&caller, collection, &resource_id, update))
    });
    respond(StatusCode::OK, result)
}

/// `DELETE /api/{collection}/{id}`
async fn delete_resource(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path((collection, id)): Path<(String, String)>,
) -> Response {
    let caller = state.caller(peer, &headers);
    let resource_id = ResourceId::new(id);
    let result = parse_collection(&collection).and_then(|collection| {
        run_blocking(|| state.api.delete_resource(&caller, collection, &resource_id))
    });
    respond_empty(result)
}

/// `GET /api/roles`
async fn list_roles(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    let caller = state.caller(peer, &headers);
    respond(StatusCode::OK, run_blocking(|| state.api.list_roles(&caller)))
}

/// `POST /api/roles`
async fn create_role(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    bytes: Bytes,
) -> Response {
    let caller = state.caller(peer, &headers);
    let result = state
        .parse_body::<Role>(&bytes)
        .and_then(|role| run_blocking(|| state.api.create_role(&caller, role)));
    respond(StatusCode::CREATED, result)
}

/// `GET /api/roles/{id}`
async fn get_role(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let caller = state.caller(peer, &headers);
    let role_id = RoleId::new(id);
    respond(StatusCode::OK, run_blocking(|| state.api.get_role(&caller, &role_id)))
}

/// `PUT /api/roles/{id}`
async fn update_role(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path(id): Path<String>,
    bytes: Bytes,
) -> Response {
    let caller = state.caller(peer, &headers);
    let role_id = RoleId::new(id);
    let result = state
        .parse_body::<Role>(&bytes)
        .and_then(|role| run_blocking(|| state.api.update_role(&caller, &role_id, role)));
    respond(StatusCode::OK, result)
}

/// `DELETE /api/roles/{id}`
async fn delete_role(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let caller = state.caller(peer, &headers);
    let role_id = RoleId::new(id);
    respond_empty(run_blocking(|| state.api.delete_role(&caller, &role_id)))
}

/// `GET /api/users`
async fn list_users(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    let caller = state.caller(peer, &headers);
    respond(StatusCode::OK, run_blocking(|| state.api.list_users(&caller)))
}

/// `POST /api/users`
async fn create_user(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    bytes: Bytes,
) -> Response {
    let caller = state.caller(peer, &headers);
    let result = state
        .parse_body::<UserRecord>(&bytes)
        .and_then(|user| run_blocking(|| state.api.create_user(&caller, user)));
    respond(StatusCode::CREATED, result)
}

/// `GET /api/users/{id}`
async fn get_user(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let caller = state.caller(peer, &headers);
    let user_id = UserId::new(id);
    respond(StatusCode::OK, run_blocking(|| state.api.get_user(&caller, &user_id)))
}

/// `PUT /api/users/{id}`
async fn update_user(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path(id): Path<String>,
    bytes: Bytes,
) -> Response {
    let caller = state.caller(peer, &headers);
    let user_id = UserId::new(id);
    let result = state
        .parse_body::<UserUpdate>(&bytes)
        .and_then(|update| run_blocking(|| state.api.update_user(&caller, &user_id, update)));
    respond(StatusCode::OK, result)
}

/// `DELETE /api/users/{id}`
async fn delete_user(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let caller = state.caller(peer, &headers);
    let user_id = UserId::new(id);
    respond_empty(run_blocking(|| state.api.delete_user(&caller, &user_id)))
}

/// `PUT /api/users/{id}/grants/{module}`
async fn assign_grant(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path((id, module)): Path<(String, String)>,
    bytes: Bytes,
) -> Response {
    let caller = state.caller(peer, &headers);
    let user_id = UserId::new(id);
    let result = state.parse_body::<GrantAssignment>(&bytes).and_then(|assignment| {
        run_blocking(|| state.api.assign_grant(&caller, &user_id, &module, assignment))
    });
    respond(StatusCode::OK, result)
}

// ============================================================================
// SECTION: Responses
// ============================================================================

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    /// Stable error code.
    error: &'static str,
    /// Caller-safe message.
    message: String,
}

/// Maps an API error to its HTTP status.
#[must_use]
pub const fn status_for(error: &ApiError) -> StatusCode {
    match error {
        ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
        ApiError::Forbidden => StatusCode::FORBIDDEN,
        ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        ApiError::Conflict(_) => StatusCode::CONFLICT,
        ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        ApiError::Integrity(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ApiError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Renders an API error.
fn error_response(error: &ApiError) -> Response {
    let body = ErrorBody {
        error: error.code(),
        message: error.public_message(),
    };
    (status_for(error), Json(body)).into_response()
}

/// Renders a JSON result with `status` on success.
fn respond<T: Serialize>(status: StatusCode, result: Result<T, ApiError>) -> Response {
    match result {
        Ok(value) => (status, Json(value)).into_response(),
        Err(error) => error_response(&error),
    }
}

/// Renders a body-less result as `204 No Content` on success.
fn respond_empty(result: Result<(), ApiError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(&error),
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves a collection path segment. Unknown collections are not routes.
fn parse_collection(segment: &str) -> Result<Collection, ApiError> {
    Collection::from_path(segment)
        .ok_or_else(|| ApiError::NotFound(format!("unknown collection {segment}")))
}

/// Runs store-bound work, shifting to a blocking context when available.
fn run_blocking<T>(work: impl FnOnce() -> T) -> T {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == tokio::runtime::RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(work)
        }
        _ => work(),
    }
}

/// Prints the local-only startup warning.
fn emit_local_only_warning(config: &HotelierConfig) {
    if config.server.auth.mode == ServerAuthMode::LocalOnly {
        let _ = writeln!(
            std::io::stderr(),
            "hotelier: WARNING: server running in local-only mode; every loopback caller acts as \
             user {}; configure server.auth to enable bearer_token",
            config.server.auth.local_user
        );
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Hotelier server errors.
#[derive(Debug, thiserror::Error)]
pub enum HotelierServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only routing assertions."
    )]

    use axum::http::StatusCode;

    use super::parse_collection;
    use super::status_for;
    use crate::api::ApiError;
    use crate::operations::Collection;

    #[test]
    fn unknown_collection_is_not_found() {
        assert!(matches!(parse_collection("invoices"), Err(ApiError::NotFound(_))));
        assert_eq!(parse_collection("bank-details").unwrap(), Collection::BankDetails);
    }

    #[test]
    fn forbidden_and_unauthenticated_statuses() {
        assert_eq!(status_for(&ApiError::Unauthenticated), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(&ApiError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            status_for(&ApiError::StorageUnavailable(String::new())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(&ApiError::Integrity(String::new())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
