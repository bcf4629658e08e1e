use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use invoice_dashboard::actions::InvoiceActions;
use invoice_dashboard::app::{router, AppState};
use invoice_dashboard::auth::{issue_session_token, SessionClaims};
use invoice_dashboard::cache::InMemoryRevalidator;
use invoice_dashboard::config::{InvoiceConfig, SecurityConfig, DEFAULT_ROUTE_MATCHER};
use invoice_dashboard::database::MemoryInvoiceStore;
use invoice_dashboard::middleware::RouteGate;

pub const SECRET: &str = "integration-secret";
pub const LISTING: &str = "/dashboard/invoices";
pub const CUSTOMER: &str = "3958dc9e-712f-4377-85e9-fec4b6a6442a";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryInvoiceStore>,
    pub cache: Arc<InMemoryRevalidator>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers.get(header::LOCATION).and_then(|v| v.to_str().ok())
    }
}

pub fn security() -> SecurityConfig {
    SecurityConfig {
        session_secret: SECRET.to_string(),
        session_cookie: "session".to_string(),
        session_expiry_hours: 1,
        login_path: "/login".to_string(),
        protected_prefix: "/dashboard".to_string(),
        route_matcher: DEFAULT_ROUTE_MATCHER.to_string(),
    }
}

/// Router wired to an in-memory store that knows one customer
pub fn spawn_app(delete_enabled: bool) -> TestApp {
    let store = Arc::new(MemoryInvoiceStore::with_customers([CUSTOMER]));
    let cache = Arc::new(InMemoryRevalidator::new());
    let settings = InvoiceConfig {
        listing_path: LISTING.to_string(),
        delete_enabled,
    };
    let actions = InvoiceActions::new(store.clone(), cache.clone(), settings);
    let gate = RouteGate::from_config(&security()).expect("default matcher compiles");

    TestApp {
        router: router(AppState::new(actions), gate),
        store,
        cache,
    }
}

pub fn session_cookie() -> String {
    let claims = SessionClaims::new(Uuid::new_v4(), "user@nextmail.com");
    let token = issue_session_token(&claims, SECRET).expect("token");
    format!("session={}", token)
}

/// Signed-in form POST
pub fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::COOKIE, session_cookie())
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub async fn send(app: &TestApp, request: Request<Body>) -> Result<TestResponse> {
    let response = app.router.clone().oneshot(request).await?;
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };

    Ok(TestResponse { status, headers, body })
}
