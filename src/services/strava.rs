// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client and token refresh.
//!
//! Handles:
//! - Paged activity listing for the authenticated athlete
//! - Token refresh when the access token is rejected
//! - Per-call timeouts on every outbound request

use crate::error::{AuthError, FetchError};
use crate::models::{Credential, RawActivity};
use crate::services::credentials::SharedCredentialStore;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Strava REST API root.
pub const STRAVA_API_BASE_URL: &str = "https://www.strava.com/api/v3";

/// Strava OAuth token endpoint.
pub const STRAVA_TOKEN_URL: &str = "https://www.strava.com/oauth/token";

/// Timeout applied to every outbound call.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    base_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl StravaClient {
    /// Create a new Strava client with OAuth credentials.
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self::with_endpoints(
            client_id,
            client_secret,
            STRAVA_API_BASE_URL.to_string(),
            STRAVA_TOKEN_URL.to_string(),
        )
    }

    /// Create a client against non-default endpoints (used by tests).
    pub fn with_endpoints(
        client_id: String,
        client_secret: String,
        base_url: String,
        token_url: String,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to build HTTP client, using defaults");
                reqwest::Client::new()
            });

        Self {
            http,
            base_url,
            token_url,
            client_id,
            client_secret,
        }
    }

    /// List one page of the athlete's activities.
    pub async fn list_activities(
        &self,
        access_token: &str,
        query: &ActivityQuery,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<RawActivity>, FetchError> {
        let url = format!("{}/athlete/activities", self.base_url);

        let mut params = vec![
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ];
        if let Some(after) = query.after {
            params.push(("after", after.timestamp().to_string()));
        }
        if let Some(before) = query.before {
            params.push(("before", before.timestamp().to_string()));
        }

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&params)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("Strava rate limit hit (429)");
            }

            return Err(FetchError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }

    /// Exchange a refresh token for a new token pair.
    pub async fn refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenRefreshResponse, AuthError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AuthError::RefreshFailed {
                status: None,
                body: format!("Token refresh request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Strava token refresh failed");
            return Err(AuthError::RefreshFailed {
                status: Some(status.as_u16()),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::RefreshFailed {
                status: None,
                body: format!("Failed to parse token response: {}", e),
            })
    }
}

/// Optional time window for activity listing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityQuery {
    pub after: Option<DateTime<Utc>>,
    pub before: Option<DateTime<Utc>>,
}

/// Token refresh response from Strava.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
}

impl From<TokenRefreshResponse> for Credential {
    fn from(response: TokenRefreshResponse) -> Self {
        Credential {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at: Some(response.expires_at),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TokenRefresher - renews and persists the credential
// ─────────────────────────────────────────────────────────────────────────────

/// Renews a rejected access token and persists the result.
///
/// Refreshes are serialized through one lock so that a scheduled collection
/// and an on-demand dashboard request cannot both spend the same refresh
/// token. The lock is per process: two processes sharing a token file can
/// still race.
#[derive(Clone)]
pub struct TokenRefresher {
    client: StravaClient,
    store: SharedCredentialStore,
    refresh_lock: Arc<Mutex<()>>,
}

impl TokenRefresher {
    pub fn new(client: StravaClient, store: SharedCredentialStore) -> Self {
        Self {
            client,
            store,
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Replace `stale` with a fresh credential.
    ///
    /// If another task refreshed while we waited for the lock, the stored
    /// credential already differs from `stale` and is returned as is.
    pub async fn refresh(&self, stale: &Credential) -> Result<Credential, AuthError> {
        let _guard = self.refresh_lock.lock().await;

        let current = self.store.load()?;
        if current.access_token != stale.access_token {
            tracing::info!("Credential already refreshed by another task");
            return Ok(current);
        }

        tracing::info!("Access token rejected, refreshing");
        let fresh: Credential = self
            .client
            .refresh_token(&current.refresh_token)
            .await?
            .into();

        self.store.save(&fresh)?;
        tracing::info!(expires_at = ?fresh.expires_at, "Token refreshed and stored");
        Ok(fresh)
    }
}
