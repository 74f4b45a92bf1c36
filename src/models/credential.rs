// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth credential model.

use serde::{Deserialize, Serialize};

/// Strava OAuth credential (single slot, one per process).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token expiry (Unix timestamp), when the provider reported one
    #[serde(default)]
    pub expires_at: Option<i64>,
}
