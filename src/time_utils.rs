// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time and pace formatting.

use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Timestamp used in dataset snapshot file names (`YYYYMMDD_HHMMSS`, local time).
pub fn snapshot_timestamp(date: DateTime<Local>) -> String {
    date.format("%Y%m%d_%H%M%S").to_string()
}

/// Parse Strava's `start_date_local`.
///
/// Strava marks local times with a misleading `Z`; it is dropped and the
/// value kept as a naive wall-clock time.
pub fn parse_local_datetime(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim().trim_end_matches('Z');
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

/// Convert decimal minutes to `M:SS`.
///
/// Rounds half-up to the nearest whole second, so 8.0467 becomes "8:03"
/// and 7.9999 becomes "8:00".
pub fn format_pace(decimal_minutes: f64) -> String {
    let total_seconds = (decimal_minutes * 60.0).round().max(0.0) as u64;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Convert `M:SS` back to decimal minutes.
pub fn parse_pace(pace: &str) -> Option<f64> {
    let (minutes, seconds) = pace.split_once(':')?;
    let minutes: u32 = minutes.trim().parse().ok()?;
    let seconds: u32 = seconds.trim().parse().ok()?;
    Some(f64::from(minutes) + f64::from(seconds) / 60.0)
}
