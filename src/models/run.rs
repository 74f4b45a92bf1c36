// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Normalized running activity (one row of the run table).

use chrono::NaiveDateTime;
use serde::Serialize;

/// One running activity with derived imperial metrics.
///
/// Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunRecord {
    pub id: u64,
    pub sport_type: String,
    pub name: String,
    pub visibility: Option<String>,
    pub start_date_local: NaiveDateTime,
    pub distance: f64,
    pub moving_time: u64,
    pub elapsed_time: u64,
    pub average_speed: Option<f64>,
    pub average_cadence: Option<f64>,
    pub total_elevation_gain: f64,
    pub elev_high: Option<f64>,
    pub elev_low: Option<f64>,
    pub average_heartrate: Option<f64>,
    pub max_heartrate: Option<f64>,
    pub average_watts: Option<f64>,
    pub max_watts: Option<f64>,
    pub weighted_average_watts: Option<f64>,
    pub kilojoules: Option<f64>,

    // ─── Map metadata (null when no match) ─────────────────────
    pub summary_polyline: Option<String>,
    pub map_resource_state: Option<i64>,

    // ─── Derived ───────────────────────────────────────────────
    pub distance_mile: f64,
    pub moving_time_minute: f64,
    /// Minutes per mile as `M:SS`; null for zero-distance runs
    pub pace: Option<String>,
    pub total_elevation_gain_ft: f64,
    /// ISO week number of `start_date_local`
    pub week: u32,
    pub weekly_milages_cumsum: f64,
}

impl RunRecord {
    /// Pace as decimal minutes per mile.
    pub fn pace_minutes(&self) -> Option<f64> {
        self.pace
            .as_deref()
            .and_then(crate::time_utils::parse_pace)
    }
}
