// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod activity;
pub mod credential;
pub mod distribution;
pub mod run;
pub mod stats;

pub use activity::{ActivityMap, ActivityType, RawActivity};
pub use credential::Credential;
pub use distribution::{bin, bin_all, Bin, BinnedDistribution, MetricId};
pub use run::RunRecord;
pub use stats::{summarize, SummaryStats};
