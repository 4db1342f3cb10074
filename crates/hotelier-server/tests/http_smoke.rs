// crates/hotelier-server/tests/http_smoke.rs
// ============================================================================
// Module: HTTP Transport Smoke Tests
// Description: Raw TCP requests against a live server on an ephemeral port.
// Purpose: Verify status mapping and identical forbidden bodies on the wire.
// Dependencies: hotelier-server, hotelier-config, hotelier-core, tokio
// ============================================================================

//! ## Overview
//! Starts the axum server on `127.0.0.1:0` with bearer-token auth and a seeded
//! in-memory store, then speaks HTTP/1.1 over a plain `TcpStream`.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::net::SocketAddr;
use std::sync::Arc;

use hotelier_config::HotelierConfig;
use hotelier_core::AccessScope;
use hotelier_core::CapabilityLevel;
use hotelier_core::GrantStore;
use hotelier_core::InMemoryAccessStore;
use hotelier_core::Module;
use hotelier_core::ModulePermission;
use hotelier_core::NoopGuardAuditSink;
use hotelier_core::ResourceDirectory;
use hotelier_core::ResourceId;
use hotelier_core::ResourceRecord;
use hotelier_core::Role;
use hotelier_core::RoleStore;
use hotelier_core::SharedAccessStore;
use hotelier_core::UserDirectory;
use hotelier_core::UserId;
use hotelier_core::UserRecord;
use hotelier_server::HotelierServer;
use serde_json::Value;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::net::TcpStream;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const CONFIG: &str = r#"
[server]
max_body_bytes = 1024

[server.auth]
mode = "bearer_token"

[[server.auth.tokens]]
token = "admin-token"
user_id = "admin"

[[server.auth.tokens]]
token = "pm-token"
user_id = "pm"
"#;

fn seeded_store() -> SharedAccessStore {
    let store = InMemoryAccessStore::new();
    store.save_role(&Role::uniform("admin", "Administrator", ModulePermission::FULL)).unwrap();
    store
        .save_role(
            &Role::uniform("pm", "Property Manager", ModulePermission::NO_ACCESS).with_permission(
                Module::Property,
                ModulePermission::new(CapabilityLevel::Update, AccessScope::Partial),
            ),
        )
        .unwrap();
    store.save_user(&UserRecord::new("admin", "admin")).unwrap();
    store.save_user(&UserRecord::new("pm", "pm")).unwrap();
    store
        .assign_grant(&UserId::new("pm"), Module::Property, [ResourceId::new("p1")].into())
        .unwrap();
    store.save_resource(&ResourceRecord::new(Module::Property, "p1", "Harbour View")).unwrap();
    store.save_resource(&ResourceRecord::new(Module::Property, "p2", "Old Mill")).unwrap();
    SharedAccessStore::from_store(store)
}

async fn start_server() -> SocketAddr {
    let config = HotelierConfig::from_toml_str(CONFIG).unwrap();
    let server =
        HotelierServer::new(config, seeded_store(), Arc::new(NoopGuardAuditSink)).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = server.serve_listener(listener).await;
    });
    addr
}

struct RawResponse {
    status: u16,
    body: String,
}

async fn send(
    addr: SocketAddr,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: &str,
) -> RawResponse {
    let mut request =
        format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n");
    if let Some(token) = token {
        request.push_str(&format!("Authorization: Bearer {token}\r\n"));
    }
    if !body.is_empty() {
        request.push_str("Content-Type: application/json\r\n");
    }
    request.push_str(&format!("Content-Length: {}\r\n\r\n{body}", body.len()));

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let text = String::from_utf8_lossy(&raw).into_owned();
    let (head, body) = text.split_once("\r\n\r\n").unwrap_or((text.as_str(), ""));
    let status = head.split_whitespace().nth(1).unwrap().parse().unwrap();
    RawResponse {
        status,
        body: body.to_string(),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn missing_token_is_unauthorized() {
    let addr = start_server().await;
    let response = send(addr, "GET", "/api/properties", None, "").await;
    assert_eq!(response.status, 401);
    let response = send(addr, "GET", "/api/properties", Some("wrong"), "").await;
    assert_eq!(response.status, 401);
}

#[tokio::test(flavor = "multi_thread")]
async fn listing_is_filtered_per_caller() {
    let addr = start_server().await;
    let admin = send(addr, "GET", "/api/properties", Some("admin-token"), "").await;
    assert_eq!(admin.status, 200);
    let admin: Value = serde_json::from_str(&admin.body).unwrap();
    assert_eq!(admin.as_array().unwrap().len(), 2);

    let pm = send(addr, "GET", "/api/properties", Some("pm-token"), "").await;
    assert_eq!(pm.status, 200);
    let pm: Value = serde_json::from_str(&pm.body).unwrap();
    let ids: Vec<&str> = pm
        .as_array()
        .unwrap()
        .iter()
        .map(|record| record["resource_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["p1"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn hidden_and_missing_properties_share_one_response() {
    let addr = start_server().await;
    let hidden = send(addr, "GET", "/api/properties/p2", Some("pm-token"), "").await;
    let missing = send(addr, "GET", "/api/properties/p404", Some("pm-token"), "").await;
    assert_eq!(hidden.status, 403);
    assert_eq!(missing.status, 403);
    assert_eq!(hidden.body, missing.body);
    let body: Value = serde_json::from_str(&hidden.body).unwrap();
    assert_eq!(body["error"], "forbidden");
    assert_eq!(body["message"], "access denied");

    let admin_missing = send(addr, "GET", "/api/properties/p404", Some("admin-token"), "").await;
    assert_eq!(admin_missing.status, 404);
}

#[tokio::test(flavor = "multi_thread")]
async fn create_and_delete_round_trip_status_codes() {
    let addr = start_server().await;
    let body = r#"{"resource_id":"pf1","name":"Coastal"}"#;
    let created = send(addr, "POST", "/api/portfolios", Some("admin-token"), body).await;
    assert_eq!(created.status, 201);
    let duplicate = send(addr, "POST", "/api/portfolios", Some("admin-token"), body).await;
    assert_eq!(duplicate.status, 409);
    let deleted = send(addr, "DELETE", "/api/portfolios/pf1", Some("admin-token"), "").await;
    assert_eq!(deleted.status, 204);
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_and_oversized_bodies_are_rejected() {
    let addr = start_server().await;
    let malformed = send(addr, "POST", "/api/portfolios", Some("admin-token"), "{not json").await;
    assert_eq!(malformed.status, 400);
    let oversized = format!(r#"{{"resource_id":"x","name":"{}"}}"#, "a".repeat(2048));
    let response = send(addr, "POST", "/api/portfolios", Some("admin-token"), &oversized).await;
    assert_eq!(response.status, 413);
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_collection_is_not_found_and_me_access_needs_no_permission() {
    let addr = start_server().await;
    let unknown = send(addr, "GET", "/api/invoices", Some("admin-token"), "").await;
    assert_eq!(unknown.status, 404);
    let me = send(addr, "GET", "/api/me/access", Some("pm-token"), "").await;
    assert_eq!(me.status, 200);
    let report: Value = serde_json::from_str(&me.body).unwrap();
    assert_eq!(report["user_id"], "pm");
}
