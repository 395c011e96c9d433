// In-process mock of the point-of-sale backend for integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, RawQuery, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use pos_client::domain::{Clock, StatusSink};
use pos_client::{ClientConfig, PosClient};
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

pub const USERNAME: &str = "manager@example.com";
pub const PASSWORD: &str = "manager123";
pub const TOKEN: &str = "tok123";
const BEARER: &str = "Bearer tok123";

// Shared start time for the test clock.
pub const START: u64 = 1_700_000_000;

// Switches and recordings for one mock backend instance.
#[derive(Default)]
pub struct MockState {
    pub login_calls: AtomicUsize,
    pub order_calls: AtomicUsize,
    pub report_calls: AtomicUsize,
    pub login_delay_ms: AtomicU64,
    pub reject_orders: AtomicBool,
    pub fail_reports: AtomicBool,
    pub odd_reports: AtomicBool,
    pub report_queries: Mutex<Vec<Option<String>>>,
    pub order_bodies: Mutex<Vec<Value>>,
}

impl MockState {
    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn order_calls(&self) -> usize {
        self.order_calls.load(Ordering::SeqCst)
    }

    pub fn report_calls(&self) -> usize {
        self.report_calls.load(Ordering::SeqCst)
    }

    pub fn report_queries(&self) -> Vec<Option<String>> {
        self.report_queries.lock().expect("mock mutex poisoned").clone()
    }

    pub fn order_bodies(&self) -> Vec<Value> {
        self.order_bodies.lock().expect("mock mutex poisoned").clone()
    }
}

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

async fn login(State(state): State<Arc<MockState>>, Form(form): Form<LoginForm>) -> Response {
    state.login_calls.fetch_add(1, Ordering::SeqCst);
    let delay = state.login_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    if form.username == USERNAME && form.password == PASSWORD {
        let body = json!({"access_token": TOKEN, "token_type": "bearer"});
        (StatusCode::OK, Json(body)).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, "invalid credentials").into_response()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some(BEARER)
}

async fn create_order(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.order_calls.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, "not authenticated").into_response();
    }
    state
        .order_bodies
        .lock()
        .expect("mock mutex poisoned")
        .push(body.clone());

    if state.reject_orders.load(Ordering::SeqCst) {
        return (StatusCode::UNPROCESSABLE_ENTITY, "total does not match items").into_response();
    }

    let record = json!({"id": 42, "total": body["total"], "status": "pending"});
    (StatusCode::CREATED, Json(record)).into_response()
}

async fn report(
    State(state): State<Arc<MockState>>,
    Path(period): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    state.report_calls.fetch_add(1, Ordering::SeqCst);
    state
        .report_queries
        .lock()
        .expect("mock mutex poisoned")
        .push(query);
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, "not authenticated").into_response();
    }
    if state.fail_reports.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable").into_response();
    }
    if state.odd_reports.load(Ordering::SeqCst) {
        return Json(json!({"rows": []})).into_response();
    }

    let body = match period.as_str() {
        "daily" => json!({
            "period": "2025-01-01 to 2025-01-02",
            "start_date": "2025-01-01",
            "end_date": "2025-01-02",
            "total_sales": 21.5,
            "total_orders": 3,
            "average_daily_sales": 10.75,
            "sales_data": [
                {"date": "2025-01-01", "total_sales": 21.5, "order_count": 3, "total_items": 5, "average_order_value": 7.17},
                {"date": "2025-01-02", "total_sales": 0.0, "order_count": 0, "total_items": 0, "average_order_value": 0}
            ]
        }),
        _ => json!({
            "report": [],
            "summary": {
                "total_orders": 0,
                "total_revenue": 0,
                "total_discounts": 0,
                "total_taxes": 0,
                "net_revenue": 0
            }
        }),
    };
    Json(body).into_response()
}

pub struct MockBackend {
    pub base_url: String,
    pub state: Arc<MockState>,
}

// Start a mock backend on an ephemeral port for the current test runtime.
pub async fn spawn_backend() -> MockBackend {
    let state = Arc::new(MockState::default());
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/orders/", post(create_order))
        .route("/api/analytics/reports/{period}", get(report))
        .with_state(state.clone());

    // Bind before spawning so the port accepts connections immediately.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock backend failed");
    });

    MockBackend {
        base_url: format!("http://{addr}"),
        state,
    }
}

// Clock the tests can move forward.
pub struct TestClock(AtomicU64);

impl TestClock {
    pub fn advance(&self, by: Duration) {
        self.0.fetch_add(by.as_secs(), Ordering::SeqCst);
    }
}

impl Clock for TestClock {
    fn now_epoch_seconds(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct CapturedStatus(Mutex<Vec<(String, bool)>>);

impl CapturedStatus {
    pub fn records(&self) -> Vec<(String, bool)> {
        self.0.lock().expect("status mutex poisoned").clone()
    }
}

impl StatusSink for CapturedStatus {
    fn record(&self, message: &str, succeeded: bool) {
        self.0
            .lock()
            .expect("status mutex poisoned")
            .push((message.to_string(), succeeded));
    }
}

pub struct Harness {
    pub client: PosClient,
    pub clock: Arc<TestClock>,
    pub status: Arc<CapturedStatus>,
}

pub fn config_for(backend: &MockBackend, username: &str, password: &str) -> ClientConfig {
    let base_url = Url::parse(&backend.base_url).expect("mock url should parse");
    ClientConfig::new(base_url, username, password).with_request_timeout(Duration::from_secs(5))
}

pub fn harness(config: &ClientConfig) -> Harness {
    let clock = Arc::new(TestClock(AtomicU64::new(START)));
    let status = Arc::new(CapturedStatus::default());
    let client = PosClient::connect_with(config, clock.clone(), status.clone())
        .expect("client should build");
    Harness {
        client,
        clock,
        status,
    }
}
