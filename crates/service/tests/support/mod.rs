//! In-process stand-in for the CRM API, bound to an ephemeral port.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use configs::AppConfig;
use serde_json::{json, Value};
use service::storage::{DurableStorage, MemoryStorage};
use service::AppContext;
use tokio::net::TcpListener;

pub const EMAIL: &str = "owner@example.com";
pub const PASSWORD: &str = "correct-horse-battery";
pub const REFRESH_COOKIE: &str = "refresh_token";

#[derive(Default)]
pub struct MockCrm {
    valid_token: Mutex<Option<String>>,
    issued: AtomicUsize,
    pub login_calls: AtomicUsize,
    pub login_with_bearer: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub refresh_fails: AtomicBool,
    pub refresh_delay_ms: AtomicU64,
    pub contacts_calls: AtomicUsize,
    pub deals_calls: AtomicUsize,
    pub locked_calls: AtomicUsize,
    pub broken_calls: AtomicUsize,
    links: Mutex<Vec<Value>>,
}

impl MockCrm {
    fn issue(&self) -> String {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let token = format!("token-{n}");
        *self.valid_token.lock().unwrap() = Some(token.clone());
        token
    }

    /// Invalidate whatever token the client currently holds.
    pub fn expire_tokens(&self) {
        *self.valid_token.lock().unwrap() = None;
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        let Some(valid) = self.valid_token.lock().unwrap().clone() else {
            return false;
        };
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| v == format!("Bearer {valid}"))
            .unwrap_or(false)
    }
}

pub struct TestApi {
    pub base_url: String,
    pub state: Arc<MockCrm>,
}

impl TestApi {
    pub fn config(&self) -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.api.base_url = self.base_url.clone();
        cfg.normalize_and_validate().expect("valid test config");
        cfg
    }

    pub async fn context(&self) -> anyhow::Result<AppContext> {
        self.context_with(Arc::new(MemoryStorage::new())).await
    }

    pub async fn context_with(&self, storage: Arc<dyn DurableStorage>) -> anyhow::Result<AppContext> {
        AppContext::with_storage(&self.config(), storage).await
    }
}

pub async fn start_mock() -> anyhow::Result<TestApi> {
    let state = Arc::new(MockCrm::default());
    let app = Router::new()
        .route("/api/public/auth/login", post(login))
        .route("/api/public/auth/refresh", get(refresh))
        .route("/api/public/crm/ping", get(ping))
        .route("/api/private/crm/contacts/", get(contacts))
        .route("/api/private/crm/deals/", get(deals))
        .route("/api/private/crm/locked", get(locked))
        .route("/api/private/crm/broken", get(broken))
        .route("/association/create/", post(create_link))
        .route("/association/all/", get(list_links))
        .with_state(state.clone());

    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("mock server error: {}", e); }
    });
    Ok(TestApi { base_url, state })
}

fn unauthorized(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "message": message }))).into_response()
}

async fn login(State(state): State<Arc<MockCrm>>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    state.login_calls.fetch_add(1, Ordering::SeqCst);
    if headers.contains_key(header::AUTHORIZATION) {
        state.login_with_bearer.fetch_add(1, Ordering::SeqCst);
    }
    if body["email"] != EMAIL {
        return Json(json!({ "status": false, "data": null, "message": "User not found" })).into_response();
    }
    if body["password"] == PASSWORD {
        let token = state.issue();
        let cookie = format!("{REFRESH_COOKIE}=session-1; Path=/; HttpOnly");
        return (
            [(header::SET_COOKIE, cookie)],
            Json(json!({ "status": true, "data": { "accessToken": token }, "message": "Login successful" })),
        )
            .into_response();
    }
    unauthorized("Invalid credentials")
}

async fn refresh(State(state): State<Arc<MockCrm>>, headers: HeaderMap) -> Response {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    let delay = state.refresh_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    let has_session = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains(&format!("{REFRESH_COOKIE}=")))
        .unwrap_or(false);
    if !has_session || state.refresh_fails.load(Ordering::SeqCst) {
        return unauthorized("refresh session invalid");
    }
    let token = state.issue();
    Json(json!({ "data": { "accessToken": token }, "message": "Token refreshed" })).into_response()
}

async fn ping(State(state): State<Arc<MockCrm>>, headers: HeaderMap) -> Response {
    Json(json!({
        "data": { "authorized": state.authorized(&headers), "stamped": headers.contains_key(header::AUTHORIZATION) },
        "message": "pong"
    }))
    .into_response()
}

async fn contacts(State(state): State<Arc<MockCrm>>, headers: HeaderMap) -> Response {
    state.contacts_calls.fetch_add(1, Ordering::SeqCst);
    if !state.authorized(&headers) {
        return unauthorized("token expired");
    }
    Json(json!({
        "contacts": [
            contact("1", "ada@example.com", "Ada", "Lovelace"),
            contact("2", "grace@example.com", "Grace", "Hopper"),
            contact("3", "alan@example.org", "Alan", "Turing"),
        ]
    }))
    .into_response()
}

fn contact(id: &str, email: &str, first: &str, last: &str) -> Value {
    json!({
        "id": id,
        "properties": {
            "createdate": "2024-01-01T00:00:00.000Z",
            "email": email,
            "firstname": first,
            "hs_object_id": id,
            "lastmodifieddate": "2024-01-02T00:00:00.000Z",
            "lastname": last,
            "phone": null,
            "company": null,
            "website": null,
            "lifecyclestage": "lead"
        },
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-02T00:00:00Z",
        "archived": false
    })
}

async fn deals(State(state): State<Arc<MockCrm>>, headers: HeaderMap) -> Response {
    state.deals_calls.fetch_add(1, Ordering::SeqCst);
    if !state.authorized(&headers) {
        return unauthorized("token expired");
    }
    Json(json!({
        "deals": [
            { "id": "D1", "properties": { "dealname": "Annual renewal", "amount": "1200", "dealstage": "closedwon" } },
            { "id": "D2", "properties": { "dealname": "Pilot project", "amount": "300" } }
        ]
    }))
    .into_response()
}

async fn locked(State(state): State<Arc<MockCrm>>) -> Response {
    state.locked_calls.fetch_add(1, Ordering::SeqCst);
    unauthorized("never allowed")
}

async fn broken(State(state): State<Arc<MockCrm>>) -> Response {
    state.broken_calls.fetch_add(1, Ordering::SeqCst);
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "message": "upstream exploded" }))).into_response()
}

async fn create_link(State(state): State<Arc<MockCrm>>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let deal_id = body["deal_id"].as_str().unwrap_or_default().to_string();
    if email.is_empty() || deal_id.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": "Email and deal_id are required." })),
        )
            .into_response();
    }
    if !matches!(deal_id.as_str(), "D1" | "D2") {
        return Json(json!({ "success": false, "error": "Deal not found" })).into_response();
    }
    let mut links = state.links.lock().unwrap();
    let id = links.len() as i64 + 1;
    links.push(json!({ "id": id, "email": email, "deal_id": deal_id }));
    Json(json!({ "success": true, "id": id })).into_response()
}

async fn list_links(State(state): State<Arc<MockCrm>>) -> Response {
    let links = state.links.lock().unwrap().clone();
    Json(json!({ "success": true, "associations": links })).into_response()
}
