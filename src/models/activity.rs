// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava activity as returned by the athlete activity listing.

use serde::{Deserialize, Serialize};

/// Coarse activity type (`type` field on the API).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityType {
    Run,
    Ride,
    #[serde(other)]
    Other,
}

/// Summary activity from `GET /athlete/activities`.
///
/// Only the fields the run table needs are modeled; the rest of the
/// payload is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawActivity {
    pub id: u64,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    #[serde(default)]
    pub sport_type: String,
    #[serde(default)]
    pub name: String,
    pub visibility: Option<String>,
    pub start_date_local: String,
    /// Distance in meters
    #[serde(default)]
    pub distance: f64,
    /// Seconds
    #[serde(default)]
    pub moving_time: u64,
    /// Seconds
    #[serde(default)]
    pub elapsed_time: u64,
    pub average_speed: Option<f64>,
    pub average_cadence: Option<f64>,
    /// Meters
    #[serde(default)]
    pub total_elevation_gain: f64,
    pub elev_high: Option<f64>,
    pub elev_low: Option<f64>,
    pub average_heartrate: Option<f64>,
    pub max_heartrate: Option<f64>,
    pub average_watts: Option<f64>,
    pub max_watts: Option<f64>,
    pub weighted_average_watts: Option<f64>,
    pub kilojoules: Option<f64>,
    pub map: Option<ActivityMap>,
}

impl RawActivity {
    pub fn is_run(&self) -> bool {
        self.activity_type == ActivityType::Run
    }

    /// Only rides and runs carry usable map metadata.
    pub fn carries_map(&self) -> bool {
        matches!(self.activity_type, ActivityType::Run | ActivityType::Ride)
    }
}

/// Map metadata nested in each activity.
///
/// `id` is the activity id encoded as a string with an `a` prefix
/// (e.g. `"a14583201234"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityMap {
    pub id: String,
    pub summary_polyline: Option<String>,
    pub resource_state: Option<i64>,
}
