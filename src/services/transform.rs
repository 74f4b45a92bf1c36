// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Raw activities → run table.
//!
//! Steps:
//! 1. Keep `Run` activities for the table
//! 2. Index map metadata from runs and rides by normalized id
//! 3. Left-join each run to its map metadata
//! 4. Derive imperial units, pace, ISO week and weekly running mileage

use crate::error::TransformError;
use crate::models::{ActivityMap, RawActivity, RunRecord};
use crate::time_utils::{format_pace, parse_local_datetime};
use chrono::Datelike;
use std::collections::HashMap;

/// Meters per mile.
pub const METERS_PER_MILE: f64 = 1609.34;

/// Feet per meter.
pub const FEET_PER_METER: f64 = 3.28084;

/// Build the run table from a raw activity listing.
///
/// Runs without map metadata keep null map fields. Fails with
/// `EmptyInput` when the listing holds no runs.
pub fn transform(raw: &[RawActivity]) -> Result<Vec<RunRecord>, TransformError> {
    let maps = index_maps(raw);
    let mut weekly_miles: HashMap<(i32, u32), f64> = HashMap::new();
    let mut records = Vec::new();

    for activity in raw.iter().filter(|a| a.is_run()) {
        let map = maps.get(&activity.id).copied();
        if map.is_none() {
            let warning = TransformError::MissingJoinKey {
                activity_id: activity.id,
            };
            tracing::warn!(activity_id = activity.id, "{}", warning);
        }

        let mut record = to_run_record(activity, map)?;

        let iso = record.start_date_local.iso_week();
        let running = weekly_miles.entry((iso.year(), iso.week())).or_insert(0.0);
        *running += record.distance_mile;
        record.weekly_milages_cumsum = round_to(*running, 2);

        records.push(record);
    }

    if records.is_empty() {
        return Err(TransformError::EmptyInput);
    }

    tracing::debug!(
        activities = raw.len(),
        runs = records.len(),
        "Transformed activities into run table"
    );
    Ok(records)
}

/// Map id → activity id.
///
/// Map ids look like `"a14583201234"`. Every `a` is removed before parsing,
/// so an id with an `a` anywhere else is mangled the same way.
pub fn normalize_map_id(raw: &str) -> Option<u64> {
    raw.replace('a', "").parse().ok()
}

/// Index map metadata of runs and rides; the first record per id wins.
fn index_maps(raw: &[RawActivity]) -> HashMap<u64, &ActivityMap> {
    let mut maps = HashMap::new();

    for map in raw
        .iter()
        .filter(|a| a.carries_map())
        .filter_map(|a| a.map.as_ref())
    {
        match normalize_map_id(&map.id) {
            Some(id) => {
                maps.entry(id).or_insert(map);
            }
            None => tracing::warn!(map_id = %map.id, "Skipping map metadata with unparseable id"),
        }
    }

    maps
}

fn to_run_record(
    activity: &RawActivity,
    map: Option<&ActivityMap>,
) -> Result<RunRecord, TransformError> {
    let start_date_local = parse_local_datetime(&activity.start_date_local).ok_or_else(|| {
        TransformError::InvalidStartDate {
            activity_id: activity.id,
            value: activity.start_date_local.clone(),
        }
    })?;

    let distance_mile = activity.distance / METERS_PER_MILE;
    let moving_time_minute = activity.moving_time as f64 / 60.0;
    let pace = (distance_mile > 0.0).then(|| format_pace(moving_time_minute / distance_mile));

    Ok(RunRecord {
        id: activity.id,
        sport_type: activity.sport_type.clone(),
        name: activity.name.clone(),
        visibility: activity.visibility.clone(),
        start_date_local,
        distance: activity.distance,
        moving_time: activity.moving_time,
        elapsed_time: activity.elapsed_time,
        average_speed: activity.average_speed,
        average_cadence: activity.average_cadence,
        total_elevation_gain: activity.total_elevation_gain,
        elev_high: activity.elev_high,
        elev_low: activity.elev_low,
        average_heartrate: activity.average_heartrate,
        max_heartrate: activity.max_heartrate,
        average_watts: activity.average_watts,
        max_watts: activity.max_watts,
        weighted_average_watts: activity.weighted_average_watts,
        kilojoules: activity.kilojoules,
        summary_polyline: map.and_then(|m| m.summary_polyline.clone()),
        map_resource_state: map.and_then(|m| m.resource_state),
        distance_mile,
        moving_time_minute,
        pace,
        total_elevation_gain_ft: activity.total_elevation_gain * FEET_PER_METER,
        week: start_date_local.iso_week().week(),
        // Filled in by the weekly fold.
        weekly_milages_cumsum: 0.0,
    })
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActivityType;
    use serde_json::json;

    fn activity(id: u64, kind: &str, date: &str, meters: f64, seconds: u64) -> RawActivity {
        serde_json::from_value(json!({
            "id": id,
            "type": kind,
            "sport_type": kind,
            "name": format!("{} {}", kind, id),
            "start_date_local": date,
            "distance": meters,
            "moving_time": seconds,
            "elapsed_time": seconds,
            "total_elevation_gain": 30.0,
            "map": {"id": format!("a{}", id), "summary_polyline": format!("poly{}", id), "resource_state": 2}
        }))
        .expect("valid activity json")
    }

    #[test]
    fn test_single_run_example() {
        let raw = vec![activity(1, "Run", "2025-06-02T08:00:00", 5000.0, 1500)];

        let runs = transform(&raw).unwrap();

        assert_eq!(runs.len(), 1);
        let run = &runs[0];
        assert!((run.distance_mile - 3.10686).abs() < 1e-3);
        assert_eq!(run.moving_time_minute, 25.0);
        assert_eq!(run.pace.as_deref(), Some("8:03"));
        assert!((run.total_elevation_gain_ft - 98.4252).abs() < 1e-6);
        assert_eq!(run.week, 23);
        assert_eq!(run.weekly_milages_cumsum, 3.11);
    }

    #[test]
    fn test_only_runs_survive() {
        let raw = vec![
            activity(1, "Ride", "2025-06-02T08:00:00", 20000.0, 3600),
            activity(2, "Run", "2025-06-03T08:00:00", 5000.0, 1500),
            activity(3, "Swim", "2025-06-04T08:00:00", 1000.0, 1200),
            activity(4, "Run", "2025-06-05T08:00:00", 8000.0, 2400),
        ];

        let runs = transform(&raw).unwrap();

        let ids: Vec<u64> = runs.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 4]);
        assert!(raw
            .iter()
            .filter(|a| ids.contains(&a.id))
            .all(|a| a.activity_type == ActivityType::Run));
    }

    #[test]
    fn test_transform_is_idempotent() {
        let raw = vec![
            activity(1, "Run", "2025-06-02T08:00:00", 5000.0, 1500),
            activity(2, "Run", "2025-06-04T08:00:00", 10000.0, 3300),
        ];

        assert_eq!(transform(&raw).unwrap(), transform(&raw).unwrap());
    }

    #[test]
    fn test_weekly_cumsum_resets_per_iso_week() {
        let raw = vec![
            activity(1, "Run", "2025-06-02T08:00:00", 5000.0, 1500), // Mon, week 23
            activity(2, "Run", "2025-06-09T08:00:00", 8000.0, 2400), // Mon, week 24
            activity(3, "Run", "2025-06-08T18:00:00", 3000.0, 900),  // Sun, week 23
            activity(4, "Run", "2025-06-10T08:00:00", 4000.0, 1200), // week 24
        ];

        let runs = transform(&raw).unwrap();

        assert_eq!(runs.iter().map(|r| r.week).collect::<Vec<_>>(), vec![23, 24, 23, 24]);
        for week in [23, 24] {
            let in_week: Vec<&RunRecord> = runs.iter().filter(|r| r.week == week).collect();
            assert!(in_week
                .windows(2)
                .all(|w| w[0].weekly_milages_cumsum <= w[1].weekly_milages_cumsum));
            let total: f64 = in_week.iter().map(|r| r.distance_mile).sum();
            let last = in_week.last().unwrap().weekly_milages_cumsum;
            assert!((last - round_to(total, 2)).abs() < 1e-9);
        }
        assert_eq!(runs[2].weekly_milages_cumsum, round_to(8000.0 / METERS_PER_MILE, 2));
    }

    #[test]
    fn test_same_week_number_in_different_years_is_separate() {
        let raw = vec![
            activity(1, "Run", "2024-06-03T08:00:00", 5000.0, 1500), // 2024 week 23
            activity(2, "Run", "2025-06-02T08:00:00", 5000.0, 1500), // 2025 week 23
        ];

        let runs = transform(&raw).unwrap();

        assert_eq!(runs[0].week, runs[1].week);
        assert_eq!(runs[1].weekly_milages_cumsum, runs[0].weekly_milages_cumsum);
    }

    #[test]
    fn test_map_metadata_joined_from_ride_or_run() {
        let mut run = activity(7, "Run", "2025-06-02T08:00:00", 5000.0, 1500);
        run.map = None;
        let mut ride = activity(99, "Ride", "2025-06-02T09:00:00", 20000.0, 3600);
        // A ride whose map metadata points at the run
        ride.map = Some(ActivityMap {
            id: "a7".to_string(),
            summary_polyline: Some("ride-poly".to_string()),
            resource_state: Some(3),
        });

        let runs = transform(&[run, ride]).unwrap();

        assert_eq!(runs[0].summary_polyline.as_deref(), Some("ride-poly"));
        assert_eq!(runs[0].map_resource_state, Some(3));
    }

    #[test]
    fn test_missing_map_leaves_null_fields() {
        let mut run = activity(1, "Run", "2025-06-02T08:00:00", 5000.0, 1500);
        run.map = None;

        let runs = transform(&[run]).unwrap();

        assert_eq!(runs[0].summary_polyline, None);
        assert_eq!(runs[0].map_resource_state, None);
        assert_eq!(runs[0].pace.as_deref(), Some("8:03"));
    }

    #[test]
    fn test_normalize_map_id_strips_every_a() {
        assert_eq!(normalize_map_id("a14583201234"), Some(14583201234));
        assert_eq!(normalize_map_id("123"), Some(123));
        assert_eq!(normalize_map_id("1a2a3"), Some(123));
        assert_eq!(normalize_map_id("aa42"), Some(42));
        assert_eq!(normalize_map_id("b42"), None);
        assert_eq!(normalize_map_id("A42"), None);
        assert_eq!(normalize_map_id(""), None);
    }

    #[test]
    fn test_zero_distance_has_no_pace() {
        let raw = vec![activity(1, "Run", "2025-06-02T08:00:00", 0.0, 1500)];

        let runs = transform(&raw).unwrap();

        assert_eq!(runs[0].pace, None);
        assert_eq!(runs[0].distance_mile, 0.0);
    }

    #[test]
    fn test_no_runs_is_empty_input() {
        assert_eq!(transform(&[]), Err(TransformError::EmptyInput));

        let rides = vec![activity(1, "Ride", "2025-06-02T08:00:00", 20000.0, 3600)];
        assert_eq!(transform(&rides), Err(TransformError::EmptyInput));
    }

    #[test]
    fn test_invalid_start_date_is_fatal() {
        let raw = vec![activity(5, "Run", "yesterday", 5000.0, 1500)];

        assert_eq!(
            transform(&raw),
            Err(TransformError::InvalidStartDate {
                activity_id: 5,
                value: "yesterday".to_string()
            })
        );
    }
}
