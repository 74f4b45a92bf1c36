// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared fixtures: a fake Strava API served by axum on an ephemeral port.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use strava_run_dashboard::config::Config;
use strava_run_dashboard::models::Credential;
use strava_run_dashboard::routes::create_router;
use strava_run_dashboard::services::{
    ActivityFetcher, Collector, DatasetWriter, SharedCredentialStore, StravaClient,
    SupervisorHandle,
};
use strava_run_dashboard::AppState;

#[allow(dead_code)]
pub const INITIAL_TOKEN: &str = "initial-token";
#[allow(dead_code)]
pub const INITIAL_REFRESH: &str = "initial-refresh";

/// One recorded activity listing request.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct ListCall {
    pub page: u32,
    pub per_page: u32,
    pub after: Option<i64>,
    pub token: String,
}

#[derive(Default)]
struct Inner {
    pages: Vec<Vec<Value>>,
    current_token: String,
    list_failure: Option<u16>,
    refresh_failure: Option<u16>,
    refreshed_tokens: Vec<String>,
    list_calls: Vec<ListCall>,
    refresh_calls: Vec<HashMap<String, String>>,
}

/// Handle to a running fake Strava API.
#[derive(Clone)]
pub struct FakeStrava {
    pub base_url: String,
    pub token_url: String,
    inner: Arc<Mutex<Inner>>,
}

#[allow(dead_code)]
impl FakeStrava {
    /// Start a fake API that accepts `INITIAL_TOKEN` and serves `pages`.
    pub async fn start(pages: Vec<Vec<Value>>) -> Self {
        let inner = Arc::new(Mutex::new(Inner {
            pages,
            current_token: INITIAL_TOKEN.to_string(),
            ..Inner::default()
        }));

        let app = Router::new()
            .route("/api/v3/athlete/activities", get(list_activities))
            .route("/oauth/token", post(refresh_token))
            .with_state(inner.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake strava");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake strava server");
        });

        Self {
            base_url: format!("http://{}/api/v3", addr),
            token_url: format!("http://{}/oauth/token", addr),
            inner,
        }
    }

    /// Reject every token until a refresh issues a new one.
    pub fn expire_token(&self) {
        self.inner.lock().unwrap().current_token = "rotated-elsewhere".to_string();
    }

    /// Make every listing request fail with `status`.
    pub fn fail_listing(&self, status: u16) {
        self.inner.lock().unwrap().list_failure = Some(status);
    }

    /// Make every refresh request fail with `status`.
    pub fn fail_refresh(&self, status: u16) {
        self.inner.lock().unwrap().refresh_failure = Some(status);
    }

    /// Refreshes issue tokens the listing endpoint keeps rejecting.
    pub fn reject_refreshed_tokens(&self) {
        self.inner.lock().unwrap().refreshed_tokens.push("never-valid".to_string());
    }

    pub fn list_calls(&self) -> Vec<ListCall> {
        self.inner.lock().unwrap().list_calls.clone()
    }

    pub fn refresh_calls(&self) -> Vec<HashMap<String, String>> {
        self.inner.lock().unwrap().refresh_calls.clone()
    }

    pub fn client(&self) -> StravaClient {
        StravaClient::with_endpoints(
            "client-id".to_string(),
            "client-secret".to_string(),
            self.base_url.clone(),
            self.token_url.clone(),
        )
    }
}

async fn list_activities(
    State(inner): State<Arc<Mutex<Inner>>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default()
        .to_string();
    let page: u32 = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let per_page: u32 = params
        .get("per_page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(30);

    let mut inner = inner.lock().unwrap();
    inner.list_calls.push(ListCall {
        page,
        per_page,
        after: params.get("after").and_then(|a| a.parse().ok()),
        token: token.clone(),
    });

    if let Some(status) = inner.list_failure {
        let status = StatusCode::from_u16(status).unwrap();
        return (status, "upstream failure").into_response();
    }
    if token != inner.current_token {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Authorization Error"})),
        )
            .into_response();
    }

    let body = inner
        .pages
        .get(page as usize - 1)
        .cloned()
        .unwrap_or_default();
    Json(Value::Array(body)).into_response()
}

async fn refresh_token(
    State(inner): State<Arc<Mutex<Inner>>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let mut inner = inner.lock().unwrap();
    inner.refresh_calls.push(form);

    if let Some(status) = inner.refresh_failure {
        let status = StatusCode::from_u16(status).unwrap();
        return (status, json!({"message": "Bad Request"}).to_string()).into_response();
    }

    let access_token = format!("fresh-token-{}", inner.refresh_calls.len());
    // A queued rejection leaves the listing endpoint on its old token.
    if inner.refreshed_tokens.pop().is_none() {
        inner.current_token = access_token.clone();
    }

    Json(json!({
        "token_type": "Bearer",
        "access_token": access_token,
        "refresh_token": "fresh-refresh",
        "expires_at": 1_900_000_000,
        "expires_in": 21600
    }))
    .into_response()
}

/// Strava-shaped activity JSON with map metadata.
#[allow(dead_code)]
pub fn activity(id: u64, kind: &str, date: &str, meters: f64, seconds: u64) -> Value {
    let average_speed = if seconds > 0 {
        meters / seconds as f64
    } else {
        0.0
    };
    json!({
        "id": id,
        "type": kind,
        "sport_type": kind,
        "name": format!("{} {}", kind, id),
        "visibility": "everyone",
        "start_date_local": format!("{}Z", date),
        "distance": meters,
        "moving_time": seconds,
        "elapsed_time": seconds + 60,
        "total_elevation_gain": 25.0,
        "average_speed": average_speed,
        "average_heartrate": 150.0,
        "map": {
            "id": format!("a{}", id),
            "summary_polyline": format!("poly{}", id),
            "resource_state": 2
        }
    })
}

/// `count` runs of 5 km starting at `first_id`, one per day in June 2025.
#[allow(dead_code)]
pub fn runs(first_id: u64, count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            let day = 1 + (i % 28);
            activity(
                first_id + i as u64,
                "Run",
                &format!("2025-06-{:02}T07:30:00", day),
                5000.0,
                1500,
            )
        })
        .collect()
}

#[allow(dead_code)]
pub fn initial_credential() -> Credential {
    Credential {
        access_token: INITIAL_TOKEN.to_string(),
        refresh_token: INITIAL_REFRESH.to_string(),
        expires_at: Some(1_700_000_000),
    }
}

/// Collector wired to the fake API, writing into `data_dir`.
#[allow(dead_code)]
pub fn test_collector(
    fake: &FakeStrava,
    store: SharedCredentialStore,
    data_dir: &Path,
    page_size: u32,
) -> Collector {
    let fetcher = ActivityFetcher::new(fake.client(), store);
    let dataset = DatasetWriter::new(data_dir, None);
    Collector::new(fetcher, dataset, 30, page_size)
}

/// Create a test app backed by the fake API.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app(collector: Collector) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        config: Config::default(),
        collector,
        supervisor: SupervisorHandle::default(),
    });

    (create_router(state.clone()), state)
}
