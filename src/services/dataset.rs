// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CSV snapshots of the run table.
//!
//! Every collection writes the table twice: a timestamped snapshot that
//! accumulates, and a fixed "latest" file that is overwritten.

use crate::error::DatasetError;
use crate::models::RunRecord;
use crate::time_utils::snapshot_timestamp;
use chrono::{DateTime, Local};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

const FILE_PREFIX: &str = "strava_run_data";
const LATEST_FILE: &str = "strava_run_data.csv";

/// Paths written by one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    pub snapshot: PathBuf,
    pub latest: PathBuf,
}

/// Writes run tables into the data directory.
#[derive(Debug, Clone)]
pub struct DatasetWriter {
    data_dir: PathBuf,
    retain: Option<usize>,
}

impl DatasetWriter {
    /// `retain` keeps only the newest N snapshots; `None` keeps all of them.
    pub fn new(data_dir: impl Into<PathBuf>, retain: Option<usize>) -> Self {
        Self {
            data_dir: data_dir.into(),
            retain,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Write a timestamped snapshot and refresh the latest file.
    pub fn write(
        &self,
        records: &[RunRecord],
        now: DateTime<Local>,
    ) -> Result<DatasetPaths, DatasetError> {
        fs::create_dir_all(&self.data_dir)?;

        let snapshot = self.unused_snapshot_path(&snapshot_timestamp(now));
        let latest = self.data_dir.join(LATEST_FILE);

        write_csv(&snapshot, records)?;
        write_csv(&latest, records)?;

        tracing::info!(
            snapshot = %snapshot.display(),
            latest = %latest.display(),
            rows = records.len(),
            "Dataset saved"
        );

        if let Some(keep) = self.retain {
            self.prune(keep)?;
        }

        Ok(DatasetPaths { snapshot, latest })
    }

    /// Snapshot path for `stamp`, suffixed `_1`, `_2`, ... when a write in
    /// the same second already took the plain name.
    fn unused_snapshot_path(&self, stamp: &str) -> PathBuf {
        let plain = self.data_dir.join(format!("{}_{}.csv", FILE_PREFIX, stamp));
        if !plain.exists() {
            return plain;
        }
        let mut n = 1;
        loop {
            let path = self
                .data_dir
                .join(format!("{}_{}_{}.csv", FILE_PREFIX, stamp, n));
            if !path.exists() {
                tracing::warn!(
                    existing = %plain.display(),
                    snapshot = %path.display(),
                    "Snapshot name already taken, writing with a suffix"
                );
                return path;
            }
            n += 1;
        }
    }

    /// Timestamped snapshots, oldest first.
    pub fn snapshots(&self) -> Result<Vec<PathBuf>, DatasetError> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.data_dir)? {
            let path = entry?.path();
            let is_snapshot = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| {
                    n != LATEST_FILE && n.starts_with(FILE_PREFIX) && n.ends_with(".csv")
                });
            if is_snapshot {
                paths.push(path);
            }
        }
        // Timestamps sort lexically.
        paths.sort();
        Ok(paths)
    }

    fn prune(&self, keep: usize) -> Result<(), DatasetError> {
        let snapshots = self.snapshots()?;
        let excess = snapshots.len().saturating_sub(keep);
        for path in &snapshots[..excess] {
            fs::remove_file(path)?;
            tracing::debug!(path = %path.display(), "Pruned old dataset snapshot");
        }
        Ok(())
    }
}

fn write_csv(path: &Path, records: &[RunRecord]) -> Result<(), DatasetError> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
