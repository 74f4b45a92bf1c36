// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dashboard page, forced refresh and collection status.

use crate::error::{AppError, Result};
use crate::models::{bin_all, summarize};
use crate::services::dashboard::{render_charts, render_empty_page, render_page, render_summary};
use crate::services::{CollectionStatus, DatasetSnapshot};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(dashboard))
        .route("/refresh", post(refresh))
        .route("/api/status", get(status))
}

/// Collection status as reported to clients.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StatusResponse {
    Ok {
        last_updated: String,
        data_points: usize,
        latest_activity: Option<String>,
    },
    Error {
        message: String,
    },
}

impl From<&DatasetSnapshot> for StatusResponse {
    fn from(snapshot: &DatasetSnapshot) -> Self {
        StatusResponse::Ok {
            last_updated: format_utc_rfc3339(snapshot.last_updated),
            data_points: snapshot.data_points,
            latest_activity: snapshot
                .latest_activity
                .map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string()),
        }
    }
}

/// Render the dashboard from a fresh fetch.
///
/// A period without runs renders the empty-state page, not an error.
async fn dashboard(State(state): State<Arc<AppState>>) -> Result<Html<String>> {
    let runs = match state.collector.load_runs(Utc::now()).await {
        Ok(runs) => runs,
        Err(AppError::NoData) => {
            return Ok(Html(render_empty_page(
                "No running activities found for this period.",
            )));
        }
        Err(e) => return Err(e),
    };

    let stats = summarize(&runs)?;
    let distributions = bin_all(&runs);

    Ok(Html(render_page(
        &render_summary(&stats),
        &render_charts(&distributions, &state.config.chart),
    )))
}

/// Run a collection now.
async fn refresh(State(state): State<Arc<AppState>>) -> Response {
    match state.collector.collect_once(Utc::now()).await {
        Ok(snapshot) => Json(StatusResponse::from(&snapshot)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Forced refresh failed");
            let body = StatusResponse::Error {
                message: e.to_string(),
            };
            (e.status_code(), Json(body)).into_response()
        }
    }
}

async fn status(State(state): State<Arc<AppState>>) -> (StatusCode, Json<StatusResponse>) {
    let body = match state.collector.status().await {
        CollectionStatus::Collected(snapshot) => StatusResponse::from(&snapshot),
        CollectionStatus::Pending => StatusResponse::Error {
            message: "No data collected yet".to_string(),
        },
        CollectionStatus::Failed { message, .. } => StatusResponse::Error { message },
    };

    (StatusCode::OK, Json(body))
}
