// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava running dashboard
//!
//! Pulls recent activities from the Strava API, turns the runs into a
//! table with derived imperial metrics, writes CSV snapshots on a schedule
//! and serves a dashboard of summary numbers and distribution charts.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::{Collector, SupervisorHandle};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub collector: Collector,
    pub supervisor: SupervisorHandle,
}
