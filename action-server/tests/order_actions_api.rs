use std::sync::Arc;

use action_server::acl::RoleRules;
use action_server::api::build_app;
use action_server::auth::JwtConfig;
use action_server::discovery::{
    DISCOVERY_CACHE_KEY, StaticModuleList, StoreError, StoreResult, StoredBlob,
};
use action_server::{Config, ExpiringBlobStore, MemoryBlobStore, ServerState, StaticRoleRules};
use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

const SECRET: &str = "order-actions-integration-test-secret-0123456789";
const MANAGER_ROLE: i64 = 2;

struct Harness {
    app: Router,
    state: ServerState,
    store: Arc<MemoryBlobStore>,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryBlobStore::new());
    let state = state_with_store(store.clone());

    Harness {
        app: build_app(state.clone()),
        state,
        store,
    }
}

fn state_with_store(store: Arc<dyn ExpiringBlobStore>) -> ServerState {
    let config = Config::for_tests(JwtConfig {
        secret: SECRET.to_string(),
        expiration_minutes: 60,
        issuer: "admin-backend".to_string(),
        audience: "order-actions".to_string(),
    });

    let rules = StaticRoleRules::new();
    rules.set_rules(MANAGER_ROLE, RoleRules::new().deny("action_cancel"));

    ServerState::with_adapters(
        config,
        store,
        Arc::new(rules),
        Arc::new(StaticModuleList::default()),
    )
}

/// Store whose backend fails every call
struct BrokenStore;

#[async_trait]
impl ExpiringBlobStore for BrokenStore {
    async fn get(&self, _key: &str) -> StoreResult<Option<StoredBlob>> {
        Err(StoreError::Corrupt("backend unavailable".into()))
    }

    async fn put(&self, _key: &str, _blob: StoredBlob) -> StoreResult<()> {
        Err(StoreError::Corrupt("backend unavailable".into()))
    }
}

fn token(state: &ServerState, role_id: Option<i64>, permissions: &[&str]) -> String {
    let permissions: Vec<String> = permissions.iter().map(|p| p.to_string()).collect();
    state
        .jwt_service
        .generate_token("7", "clerk", "staff", role_id, &permissions)
        .unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(path: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

fn post_raw(path: &str, token: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

#[tokio::test]
async fn test_health_is_public() {
    let h = harness();
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["enabled"], true);
    assert_eq!(body["discovery_ttl_secs"], 86_400);
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let h = harness();
    let req = Request::builder()
        .uri("/api/order-actions/permissions")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "E3001");
}

#[tokio::test]
async fn test_missing_orders_view_is_forbidden() {
    let h = harness();
    let token = token(&h.state, Some(MANAGER_ROLE), &["customers:view"]);

    let (status, body) = send(&h.app, get("/api/order-actions/permissions", &token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "E2001");
}

#[tokio::test]
async fn test_permissions_deny_only_cancel() {
    let h = harness();
    let token = token(&h.state, Some(MANAGER_ROLE), &["orders:view"]);

    let (status, body) = send(&h.app, get("/api/order-actions/permissions", &token)).await;
    assert_eq!(status, StatusCode::OK);

    let map = body.as_object().unwrap();
    assert_eq!(map.len(), 16);
    for (id, entry) in map {
        assert_eq!(entry["id"], id.as_str());
        assert_eq!(entry["allowed"], id != "cancel", "unexpected value for {}", id);
    }
}

#[tokio::test]
async fn test_unknown_role_is_allow_all() {
    let h = harness();
    let token = token(&h.state, Some(99), &["orders:view"]);

    let (status, body) = send(&h.app, get("/api/order-actions/permissions", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        body.as_object()
            .unwrap()
            .values()
            .all(|entry| entry["allowed"] == true)
    );
}

#[tokio::test]
async fn test_bootstrap_carries_permissions() {
    let h = harness();
    let token = token(&h.state, Some(MANAGER_ROLE), &["orders:view"]);

    let (status, body) = send(&h.app, get("/api/order-actions/bootstrap", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["enabled"], true);
    assert_eq!(body["collect_url"], "/api/order-actions/collect");
    assert_eq!(body["settle_delay_ms"], 2000);
    assert_eq!(body["permissions"]["cancel"]["allowed"], false);
    assert_eq!(body["permissions"]["hold"]["allowed"], true);
    assert!(body["form_key"].is_null());
}

#[tokio::test]
async fn test_bootstrap_passes_host_form_key_through() {
    let h = harness();
    let token = token(&h.state, Some(MANAGER_ROLE), &["orders:view"]);

    let mut req = get("/api/order-actions/bootstrap", &token);
    req.headers_mut()
        .insert("x-form-key", "k7Fz2".parse().unwrap());
    let (status, body) = send(&h.app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["form_key"], "k7Fz2");
}

#[tokio::test]
async fn test_collect_empty_does_not_touch_store() {
    let h = harness();
    let token = token(&h.state, Some(MANAGER_ROLE), &["orders:view"]);

    let req = post_raw(
        "/api/order-actions/collect",
        &token,
        json!({ "actions": {} }).to_string(),
    );
    let (status, body) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "No actions to collect.");
    assert_eq!(body["count"], 0);

    let req = post_raw("/api/order-actions/collect", &token, "{}");
    let (_, body) = send(&h.app, req).await;
    assert_eq!(body["count"], 0);

    assert!(h.store.get(DISCOVERY_CACHE_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn test_collect_merges_and_reports_total() {
    let h = harness();
    let token = token(&h.state, Some(MANAGER_ROLE), &["orders:view"]);

    let req = post_raw(
        "/api/order-actions/collect",
        &token,
        json!({ "actions": { "print_labels": "Print Labels", "sync": "Sync" } }).to_string(),
    );
    let (status, body) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Actions collected successfully.");
    assert_eq!(body["count"], 2);

    let req = post_raw(
        "/api/order-actions/collect",
        &token,
        json!({ "actions": { "sync": "Renamed", "export": "Export" } }).to_string(),
    );
    let (_, body) = send(&h.app, req).await;
    assert_eq!(body["count"], 3);

    let discovered = h.state.discovery().get_discovered().await;
    assert_eq!(discovered.label("sync"), Some("Sync"));

    // discovered ids show up in the catalog and the permission map
    let (_, catalog) = send(&h.app, get("/api/order-actions/catalog", &token)).await;
    let ids: Vec<&str> = catalog
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|d| d["id"].as_str())
        .collect();
    assert!(ids.contains(&"print_labels"));
    assert!(ids.contains(&"view"));

    let (_, perms) = send(&h.app, get("/api/order-actions/permissions", &token)).await;
    assert_eq!(perms["export"]["allowed"], true);
}

#[tokio::test]
async fn test_collect_malformed_body_reports_failure() {
    let h = harness();
    let token = token(&h.state, Some(MANAGER_ROLE), &["orders:view"]);

    let req = post_raw("/api/order-actions/collect", &token, "{not json");
    let (status, body) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
    assert!(h.store.get(DISCOVERY_CACHE_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn test_collect_store_failure_is_reported_in_payload() {
    let state = state_with_store(Arc::new(BrokenStore));
    let app = build_app(state.clone());
    let token = token(&state, Some(MANAGER_ROLE), &["orders:view"]);

    let req = post_raw(
        "/api/order-actions/collect",
        &token,
        json!({ "actions": { "print_labels": "Print Labels" } }).to_string(),
    );
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(!body["message"].as_str().unwrap_or_default().is_empty());

    // Permissions still resolve from the built-in catalog
    let (status, body) = send(&app, get("/api/order-actions/permissions", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cancel"]["allowed"], false);
}
