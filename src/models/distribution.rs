// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Histogram bins for the dashboard charts.

use serde::Serialize;

use crate::models::RunRecord;

/// Metrics charted on the dashboard, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricId {
    DistanceMile,
    MovingTimeMinute,
    Pace,
    TotalElevationGainFt,
    AverageHeartrate,
    AverageWatts,
}

impl MetricId {
    pub const ALL: [MetricId; 6] = [
        MetricId::DistanceMile,
        MetricId::MovingTimeMinute,
        MetricId::Pace,
        MetricId::TotalElevationGainFt,
        MetricId::AverageHeartrate,
        MetricId::AverageWatts,
    ];

    /// Lower bin edges; the last bin is open-ended.
    pub fn edges(self) -> &'static [f64] {
        match self {
            MetricId::DistanceMile => &[0.0, 3.0, 6.0, 9.0, 12.0, 15.0, 18.0, 20.0],
            MetricId::MovingTimeMinute => &[0.0, 30.0, 45.0, 60.0, 75.0, 90.0, 105.0, 120.0],
            MetricId::Pace => &[0.0, 7.0, 8.0, 9.0, 10.0],
            MetricId::TotalElevationGainFt => &[0.0, 50.0, 150.0, 250.0, 350.0, 450.0, 550.0],
            MetricId::AverageHeartrate => &[0.0, 140.0, 150.0, 160.0, 170.0, 180.0],
            MetricId::AverageWatts => &[0.0, 150.0, 160.0, 170.0, 180.0, 190.0, 200.0, 210.0],
        }
    }

    /// One label per bin.
    pub fn labels(self) -> &'static [&'static str] {
        match self {
            MetricId::DistanceMile => &["<3", "3-6", "6-9", "9-12", "12-15", "15-18", "18-20", ">20"],
            MetricId::MovingTimeMinute => &[
                "<30", "30-45", "45-60", "60-75", "75-90", "90-105", "105-120", ">120",
            ],
            MetricId::Pace => &["<7", "7-8", "8-9", "9-10", ">10"],
            MetricId::TotalElevationGainFt => &[
                "<50", "50-150", "150-250", "250-350", "350-450", "450-550", ">550",
            ],
            MetricId::AverageHeartrate => &["<140", "140-150", "150-160", "160-170", "170-180", ">180"],
            MetricId::AverageWatts => &[
                "<150", "150-160", "160-170", "170-180", "180-190", "190-200", "200-210", ">210",
            ],
        }
    }

    /// Chart title.
    pub fn title(self) -> &'static str {
        match self {
            MetricId::DistanceMile => "Distance (miles)",
            MetricId::MovingTimeMinute => "Moving Time (minutes)",
            MetricId::Pace => "Pace (min/mile)",
            MetricId::TotalElevationGainFt => "Elevation Gain (ft)",
            MetricId::AverageHeartrate => "Average Heart Rate (bpm)",
            MetricId::AverageWatts => "Average Watts",
        }
    }

    /// X axis label.
    pub fn axis_label(self) -> &'static str {
        match self {
            MetricId::DistanceMile => "Distance (miles)",
            MetricId::MovingTimeMinute => "Time (minutes)",
            MetricId::Pace => "Pace (min/mile)",
            MetricId::TotalElevationGainFt => "Elevation (ft)",
            MetricId::AverageHeartrate => "Heart Rate (bpm)",
            MetricId::AverageWatts => "Watts",
        }
    }

    /// Metric value for one run; pace is decimal minutes.
    pub fn value(self, record: &RunRecord) -> Option<f64> {
        let value = match self {
            MetricId::DistanceMile => Some(record.distance_mile),
            MetricId::MovingTimeMinute => Some(record.moving_time_minute),
            MetricId::Pace => record.pace_minutes(),
            MetricId::TotalElevationGainFt => Some(record.total_elevation_gain_ft),
            MetricId::AverageHeartrate => record.average_heartrate,
            MetricId::AverageWatts => record.average_watts,
        };
        value.filter(|v| !v.is_nan())
    }
}

/// One histogram bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    pub label: &'static str,
    /// Inclusive lower edge
    pub lower: f64,
    /// Exclusive upper edge; None for the open-ended last bin
    pub upper: Option<f64>,
    pub count: usize,
    /// Share of non-null values, rounded to one decimal
    pub percentage: f64,
}

impl Bin {
    /// On-chart text; blank for empty bins.
    pub fn text_label(&self) -> String {
        if self.percentage > 0.0 {
            format!("{:.1}%", self.percentage)
        } else {
            String::new()
        }
    }
}

/// Binned counts for one metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinnedDistribution {
    pub metric: MetricId,
    pub bins: Vec<Bin>,
    /// Number of non-null values binned
    pub total: usize,
}

/// Bin one metric across all runs.
///
/// Bins are `[lo, hi)` with the last one `[lo, inf)`, so a value sitting on an
/// edge lands in the higher bin. Values below the first edge are counted in
/// the first bin.
pub fn bin(records: &[RunRecord], metric: MetricId) -> BinnedDistribution {
    let edges = metric.edges();
    let mut counts = vec![0usize; edges.len()];

    let mut total = 0;
    for value in records.iter().filter_map(|r| metric.value(r)) {
        let index = edges.partition_point(|&edge| edge <= value).saturating_sub(1);
        counts[index] += 1;
        total += 1;
    }

    let bins = counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Bin {
            label: metric.labels()[i],
            lower: edges[i],
            upper: edges.get(i + 1).copied(),
            count,
            percentage: percentage(count, total),
        })
        .collect();

    BinnedDistribution {
        metric,
        bins,
        total,
    }
}

/// Bin every dashboard metric, in display order.
pub fn bin_all(records: &[RunRecord]) -> Vec<BinnedDistribution> {
    MetricId::ALL.iter().map(|&m| bin(records, m)).collect()
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 1000.0).round() / 10.0
}
