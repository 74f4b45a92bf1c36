// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types for the pipeline stages, plus the application error that
//! converts to consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Credential persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Credential file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Credential file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No credential has been stored")]
    Empty,
}

/// Token refresh errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The provider rejected the refresh or could not be reached.
    /// `status` is `None` when the request never got a response.
    #[error("Token refresh failed (status {status:?}): {body}")]
    RefreshFailed { status: Option<u16>, body: String },

    /// The API still answered 401 after a successful refresh.
    #[error("Access token rejected after refresh")]
    StillRejected,

    #[error("Failed to persist refreshed credential: {0}")]
    Store(#[from] StoreError),
}

/// Activity listing errors.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Access token expired and could not be renewed: {0}")]
    AuthExpired(#[from] AuthError),

    #[error("Strava API returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Network error talking to Strava: {0}")]
    Network(String),

    #[error("Failed to decode Strava response: {0}")]
    Decode(String),

    #[error("Failed to load credential: {0}")]
    Credentials(#[from] StoreError),
}

impl FetchError {
    /// Whether the API rejected the access token (HTTP 401).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, FetchError::Upstream { status: 401, .. })
    }
}

/// Activity transform errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    #[error("No running activities in input")]
    EmptyInput,

    /// Non-fatal: the run keeps null map fields.
    #[error("No map metadata for activity {activity_id}")]
    MissingJoinKey { activity_id: u64 },

    #[error("Activity {activity_id} has an invalid start_date_local: {value}")]
    InvalidStartDate { activity_id: u64, value: String },
}

/// Dataset (CSV) write errors.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Dataset I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),
}

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// No runs in the requested period. Not a failure: the dashboard renders
    /// an empty state and a collection records zero data points. The 404
    /// mapping is only a fallback for a handler that propagates it.
    #[error("No running activities for this period")]
    NoData,

    #[error("Strava authorization error: {0}")]
    Auth(String),

    #[error("Strava API error: {0}")]
    StravaApi(String),

    #[error("Invalid activity data: {0}")]
    InvalidData(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// HTTP status used when this error reaches a client.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NoData => StatusCode::NOT_FOUND,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::StravaApi(_) => StatusCode::BAD_GATEWAY,
            AppError::InvalidData(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Storage(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::AuthExpired(_) | FetchError::Credentials(_) => {
                AppError::Auth(err.to_string())
            }
            _ => AppError::StravaApi(err.to_string()),
        }
    }
}

impl From<TransformError> for AppError {
    fn from(err: TransformError) -> Self {
        match err {
            TransformError::EmptyInput => AppError::NoData,
            other => AppError::InvalidData(other.to_string()),
        }
    }
}

impl From<DatasetError> for AppError {
    fn from(err: DatasetError) -> Self {
        AppError::Storage(err.to_string())
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (error, details) = match &self {
            AppError::NoData => ("no_data", None),
            AppError::Auth(msg) => ("strava_auth_error", Some(msg.clone())),
            AppError::StravaApi(msg) => ("strava_error", Some(msg.clone())),
            AppError::InvalidData(msg) => ("invalid_data", Some(msg.clone())),
            AppError::Storage(msg) => {
                tracing::error!(error = %msg, "Storage error");
                ("storage_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                ("internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
