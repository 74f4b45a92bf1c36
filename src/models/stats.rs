// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Summary statistics over the run table, shown at the top of the dashboard.
//!
//! Recomputed on every request; never persisted.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::TransformError;
use crate::models::RunRecord;
use crate::time_utils::format_pace;

/// Scalar aggregates for a set of runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    /// Earliest run date
    pub start_date: NaiveDate,
    /// Latest run date
    pub end_date: NaiveDate,
    pub run_count: usize,
    pub total_distance_miles: f64,
    pub total_moving_time_hours: f64,
    pub total_elevation_gain_ft: f64,
    /// Mean pace as `M:SS` (None when no run has a pace)
    pub average_pace: Option<String>,
    pub average_heartrate: Option<f64>,
    pub average_watts: Option<f64>,
}

impl SummaryStats {
    /// "YYYY-MM-DD ~ YYYY-MM-DD"
    pub fn time_period(&self) -> String {
        format!(
            "{} ~ {}",
            self.start_date.format("%Y-%m-%d"),
            self.end_date.format("%Y-%m-%d")
        )
    }
}

/// Aggregate a non-empty run table.
///
/// Means skip missing values. Average pace goes through the formatted
/// `M:SS` strings so it matches what each row displays.
pub fn summarize(records: &[RunRecord]) -> Result<SummaryStats, TransformError> {
    let dates = records.iter().map(|r| r.start_date_local.date());
    let start_date = dates.clone().min().ok_or(TransformError::EmptyInput)?;
    let end_date = dates.max().ok_or(TransformError::EmptyInput)?;

    Ok(SummaryStats {
        start_date,
        end_date,
        run_count: records.len(),
        total_distance_miles: records.iter().map(|r| r.distance_mile).sum(),
        total_moving_time_hours: records.iter().map(|r| r.moving_time_minute).sum::<f64>() / 60.0,
        total_elevation_gain_ft: records.iter().map(|r| r.total_elevation_gain_ft).sum(),
        average_pace: mean(records.iter().filter_map(RunRecord::pace_minutes)).map(format_pace),
        average_heartrate: mean(records.iter().filter_map(|r| r.average_heartrate)),
        average_watts: mean(records.iter().filter_map(|r| r.average_watts)),
    })
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}
