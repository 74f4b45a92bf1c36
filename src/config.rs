// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local runs.
//! The CLI may override the listen address and collection interval.

use crate::services::dashboard::{ChartOptions, PlotlyJs};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default collection interval (hours).
pub const DEFAULT_INTERVAL_HOURS: f64 = 24.0;

/// Longest accepted collection interval.
pub const MAX_INTERVAL: Duration = Duration::from_secs(366 * 24 * 60 * 60);

/// Longest accepted lookback window (days).
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Strava OAuth client ID
    pub strava_client_id: String,
    /// Strava OAuth client secret
    pub strava_client_secret: String,
    /// Where the OAuth credential JSON lives
    pub token_path: PathBuf,
    /// Directory for CSV dataset snapshots
    pub data_dir: PathBuf,
    /// HTTP listen host
    pub host: String,
    /// HTTP listen port
    pub port: u16,
    /// Time between scheduled collections
    pub collection_interval: Duration,
    /// How far back each fetch reaches (days)
    pub lookback_days: i64,
    /// Records requested per API page
    pub page_size: u32,
    /// Keep only this many timestamped snapshots (None keeps all)
    pub dataset_retain: Option<usize>,
    /// Chart rendering options
    pub chart: ChartOptions,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            strava_client_id: "test_client_id".to_string(),
            strava_client_secret: "test_secret".to_string(),
            token_path: PathBuf::from("strava_token.json"),
            data_dir: PathBuf::from("data"),
            host: "127.0.0.1".to_string(),
            port: 5000,
            collection_interval: Duration::from_secs(24 * 60 * 60),
            lookback_days: 30,
            page_size: 30,
            dataset_retain: None,
            chart: ChartOptions::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let hours = parse_var("COLLECTION_INTERVAL_HOURS", DEFAULT_INTERVAL_HOURS)?;
        let collection_interval = match optional_var::<f64>("COLLECTION_INTERVAL_MINUTES")? {
            Some(minutes) => interval_from_minutes(minutes)?,
            None => interval_from_hours(hours)?,
        };
        let lookback_days = check_lookback_days(parse_var("LOOKBACK_DAYS", 30)?)?;

        let plotly_js = match env::var("PLOTLY_JS").ok().as_deref() {
            None | Some("cdn") => PlotlyJs::Cdn,
            Some("none") => PlotlyJs::Omit,
            Some(other) => return Err(ConfigError::Invalid("PLOTLY_JS", other.to_string())),
        };

        Ok(Self {
            strava_client_id: env::var("STRAVA_CLIENT_ID")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("STRAVA_CLIENT_ID"))?,
            strava_client_secret: env::var("STRAVA_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("STRAVA_CLIENT_SECRET"))?,
            token_path: env::var("STRAVA_TOKEN_PATH")
                .unwrap_or_else(|_| "strava_token.json".to_string())
                .into(),
            data_dir: env::var("DATA_DIR")
                .unwrap_or_else(|_| "data".to_string())
                .into(),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", 5000)?,
            collection_interval,
            lookback_days,
            page_size: parse_var("PAGE_SIZE", 30)?,
            dataset_retain: optional_var("DATASET_RETAIN")?,
            chart: ChartOptions {
                plotly_js,
                ..ChartOptions::default()
            },
        })
    }

    /// Listen address as `host:port`.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Convert an interval in (fractional) hours to a `Duration`.
pub fn interval_from_hours(hours: f64) -> Result<Duration, ConfigError> {
    interval_from_secs("COLLECTION_INTERVAL_HOURS", hours, hours * 3600.0)
}

/// Convert an interval in (fractional) minutes to a `Duration`.
pub fn interval_from_minutes(minutes: f64) -> Result<Duration, ConfigError> {
    interval_from_secs("COLLECTION_INTERVAL_MINUTES", minutes, minutes * 60.0)
}

/// Intervals must be positive, finite and at most `MAX_INTERVAL`.
fn interval_from_secs(name: &'static str, raw: f64, secs: f64) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::Invalid(name, raw.to_string());
    if !secs.is_finite() || secs <= 0.0 {
        return Err(invalid());
    }
    let interval = Duration::try_from_secs_f64(secs).map_err(|_| invalid())?;
    if interval.is_zero() || interval > MAX_INTERVAL {
        return Err(invalid());
    }
    Ok(interval)
}

/// Accept a lookback of 1..=`MAX_LOOKBACK_DAYS` days.
pub fn check_lookback_days(days: i64) -> Result<i64, ConfigError> {
    if (1..=MAX_LOOKBACK_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(ConfigError::Invalid("LOOKBACK_DAYS", days.to_string()))
    }
}

fn optional_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(None),
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    Ok(optional_var(name)?.unwrap_or(default))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
