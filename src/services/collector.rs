// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data collection: fetch → transform → persist, once or on a schedule.
//!
//! The collector also answers on-demand loads for the dashboard and keeps
//! the outcome of the latest collection for the status endpoint.

use crate::error::AppError;
use crate::models::RunRecord;
use crate::services::dataset::{DatasetPaths, DatasetWriter};
use crate::services::fetcher::ActivityFetcher;
use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveDateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

/// Wait before retrying after a failed collection.
pub const RETRY_BACKOFF: Duration = Duration::from_secs(60 * 60);

/// Outcome of a successful collection.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSnapshot {
    pub last_updated: DateTime<Utc>,
    pub data_points: usize,
    /// Start time of the most recent run
    pub latest_activity: Option<NaiveDateTime>,
    /// Files written (None when the period had no runs)
    pub files: Option<DatasetPaths>,
}

/// State of the most recent collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CollectionStatus {
    /// Nothing collected yet.
    #[default]
    Pending,
    Collected(DatasetSnapshot),
    Failed {
        message: String,
        at: DateTime<Utc>,
    },
}

/// Runs the pipeline and writes datasets.
#[derive(Clone)]
pub struct Collector {
    fetcher: ActivityFetcher,
    dataset: DatasetWriter,
    lookback_days: i64,
    page_size: u32,
    retry_backoff: Duration,
    status: Arc<RwLock<CollectionStatus>>,
    /// Serializes collection cycles (dataset writes).
    run_lock: Arc<Mutex<()>>,
}

impl Collector {
    pub fn new(
        fetcher: ActivityFetcher,
        dataset: DatasetWriter,
        lookback_days: i64,
        page_size: u32,
    ) -> Self {
        Self {
            fetcher,
            dataset,
            lookback_days,
            page_size,
            retry_backoff: RETRY_BACKOFF,
            status: Arc::new(RwLock::new(CollectionStatus::default())),
            run_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Override the failure backoff.
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Fetch and transform runs within the lookback window ending at `now`.
    ///
    /// A period without runs surfaces as `AppError::NoData`.
    pub async fn load_runs(&self, now: DateTime<Utc>) -> Result<Vec<RunRecord>, AppError> {
        let after = ChronoDuration::try_days(self.lookback_days)
            .and_then(|lookback| now.checked_sub_signed(lookback))
            .ok_or_else(|| {
                anyhow::anyhow!("Lookback of {} days is out of range", self.lookback_days)
            })?;
        let activities = self
            .fetcher
            .fetch_activities(Some(after), None, self.page_size)
            .await?;

        let runs = crate::services::transform::transform(&activities)?;
        Ok(runs)
    }

    /// Run one collection cycle and record its outcome.
    pub async fn collect_once(&self, now: DateTime<Utc>) -> Result<DatasetSnapshot, AppError> {
        let _guard = self.run_lock.lock().await;
        tracing::info!("Starting data collection");

        let result = self.collect_locked(now).await;

        let status = match &result {
            Ok(snapshot) => CollectionStatus::Collected(snapshot.clone()),
            Err(e) => CollectionStatus::Failed {
                message: e.to_string(),
                at: now,
            },
        };
        *self.status.write().await = status;

        result
    }

    async fn collect_locked(&self, now: DateTime<Utc>) -> Result<DatasetSnapshot, AppError> {
        let runs = match self.load_runs(now).await {
            Ok(runs) => runs,
            Err(AppError::NoData) => {
                tracing::info!("No runs in collection window, nothing written");
                return Ok(DatasetSnapshot {
                    last_updated: now,
                    data_points: 0,
                    latest_activity: None,
                    files: None,
                });
            }
            Err(e) => return Err(e),
        };

        let files = self
            .dataset
            .write(&runs, now.with_timezone(&Local))?;

        tracing::info!(runs = runs.len(), "Collected runs");

        Ok(DatasetSnapshot {
            last_updated: now,
            data_points: runs.len(),
            latest_activity: runs.iter().map(|r| r.start_date_local).max(),
            files: Some(files),
        })
    }

    /// Latest collection outcome.
    pub async fn status(&self) -> CollectionStatus {
        self.status.read().await.clone()
    }

    /// Collect now, then every `interval` until cancelled.
    ///
    /// A failed cycle is retried after the backoff instead of the full
    /// interval.
    pub async fn run_continuous(
        &self,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> anyhow::Result<()> {
        tracing::info!(
            interval_secs = interval.as_secs(),
            "Starting continuous data collection"
        );

        loop {
            let delay = match self.collect_once(Utc::now()).await {
                Ok(snapshot) => {
                    tracing::info!(
                        data_points = snapshot.data_points,
                        "Data collection completed successfully"
                    );
                    interval
                }
                Err(e) => {
                    tracing::error!(error = %e, "Data collection failed, will retry");
                    self.retry_backoff
                }
            };

            let next_run = ChronoDuration::from_std(delay)
                .ok()
                .and_then(|delay| Utc::now().checked_add_signed(delay));
            tracing::info!(
                next_run = ?next_run.map(|t| t.to_rfc3339()),
                "Next data collection scheduled"
            );

            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Data collection stopped");
                    return Ok(());
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}
