// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - pipeline stages and background work.

pub mod collector;
pub mod credentials;
pub mod dashboard;
pub mod dataset;
pub mod fetcher;
pub mod strava;
pub mod supervisor;
pub mod transform;

pub use collector::{CollectionStatus, Collector, DatasetSnapshot};
pub use credentials::{
    CredentialStore, FileCredentialStore, MemoryCredentialStore, SharedCredentialStore,
};
pub use dashboard::{ChartOptions, PlotlyJs};
pub use dataset::{DatasetPaths, DatasetWriter};
pub use fetcher::ActivityFetcher;
pub use strava::{StravaClient, TokenRefresher};
pub use supervisor::{Supervisor, SupervisorHandle, TaskHealth, TaskState};
pub use transform::transform;
