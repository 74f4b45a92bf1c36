// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava Running Dashboard
//!
//! Collects recent runs from Strava on a schedule and serves a dashboard
//! of summary statistics and distribution charts.

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use strava_run_dashboard::{
    config::{interval_from_hours, interval_from_minutes, Config, ConfigError},
    services::{
        supervisor::{task, RESTART_DELAY},
        ActivityFetcher, Collector, DatasetWriter, FileCredentialStore, StravaClient, Supervisor,
    },
    AppState,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Strava running dashboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the collector and the web dashboard (default)
    Serve(ServeArgs),
    /// Run only the data collector
    ///
    /// Token refreshes are serialized within one process only. Do not run
    /// this alongside `serve` against the same token file.
    Collect(CollectArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Address to listen on
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    #[command(flatten)]
    schedule: ScheduleArgs,
}

#[derive(Args, Debug, Default)]
struct CollectArgs {
    /// Collect once and exit
    #[arg(long)]
    once: bool,

    #[command(flatten)]
    schedule: ScheduleArgs,
}

#[derive(Args, Debug, Default)]
struct ScheduleArgs {
    /// Collection interval in hours
    #[arg(long, value_name = "HOURS")]
    interval: Option<f64>,

    /// Collection interval in minutes
    #[arg(long, value_name = "MINUTES", conflicts_with = "interval")]
    minutes: Option<f64>,
}

impl ScheduleArgs {
    fn apply(&self, config: &mut Config) -> Result<(), ConfigError> {
        if let Some(minutes) = self.minutes {
            config.collection_interval = interval_from_minutes(minutes)?;
        } else if let Some(hours) = self.interval {
            config.collection_interval = interval_from_hours(hours)?;
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging();

    let cli = Cli::parse();
    let mut config = Config::from_env().context("Failed to load configuration")?;

    match cli.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => {
            if let Some(host) = args.host {
                config.host = host;
            }
            if let Some(port) = args.port {
                config.port = port;
            }
            args.schedule
                .apply(&mut config)
                .context("Invalid collection interval")?;
            serve(config).await
        }
        Command::Collect(args) => {
            args.schedule
                .apply(&mut config)
                .context("Invalid collection interval")?;
            collect(config, args.once).await
        }
    }
}

fn build_collector(config: &Config) -> Collector {
    let store = Arc::new(FileCredentialStore::new(config.token_path.clone()));
    let client = StravaClient::new(
        config.strava_client_id.clone(),
        config.strava_client_secret.clone(),
    );
    let fetcher = ActivityFetcher::new(client, store);
    let dataset = DatasetWriter::new(config.data_dir.clone(), config.dataset_retain);

    Collector::new(fetcher, dataset, config.lookback_days, config.page_size)
}

/// Cancel `token` on Ctrl-C.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Shutdown requested"),
            Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl-C"),
        }
        token.cancel();
    });
}

async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        address = %config.listen_addr(),
        interval_secs = config.collection_interval.as_secs(),
        "Starting Strava running dashboard"
    );

    let shutdown = CancellationToken::new();
    cancel_on_ctrl_c(shutdown.clone());

    let mut supervisor = Supervisor::new(RESTART_DELAY, shutdown.clone());
    let collector = build_collector(&config);
    let interval = config.collection_interval;

    // Build shared state
    let state = Arc::new(AppState {
        config,
        collector: collector.clone(),
        supervisor: supervisor.handle(),
    });

    supervisor.spawn(
        "collector",
        task(move |token| {
            let collector = collector.clone();
            async move { collector.run_continuous(interval, token).await }
        }),
    );

    supervisor.spawn(
        "web",
        task(move |token| run_web(state.clone(), token)),
    );

    supervisor.run().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn run_web(state: Arc<AppState>, shutdown: CancellationToken) -> anyhow::Result<()> {
    let addr = state.config.listen_addr();
    let app = strava_run_dashboard::routes::create_router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    Ok(())
}

async fn collect(config: Config, once: bool) -> anyhow::Result<()> {
    let collector = build_collector(&config);

    if once {
        let snapshot = collector.collect_once(Utc::now()).await?;
        tracing::info!(
            data_points = snapshot.data_points,
            snapshot = ?snapshot.files.as_ref().map(|f| f.snapshot.display().to_string()),
            "Collection finished"
        );
        return Ok(());
    }

    let shutdown = CancellationToken::new();
    cancel_on_ctrl_c(shutdown.clone());
    collector
        .run_continuous(config.collection_interval, shutdown)
        .await
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("strava_run_dashboard=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::time::Duration;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_schedule_flags_override_interval() {
        let cli = Cli::try_parse_from(["strava-run-dashboard", "collect", "--minutes", "15"])
            .unwrap();
        let Some(Command::Collect(args)) = cli.command else {
            panic!("expected collect");
        };
        let mut config = Config::default();
        args.schedule.apply(&mut config).unwrap();
        assert_eq!(config.collection_interval, Duration::from_secs(15 * 60));
    }

    #[test]
    fn test_schedule_flags_reject_unusable_intervals() {
        for raw in ["-1", "NaN", "inf", "1e30"] {
            let flag = format!("--interval={}", raw);
            let cli = Cli::try_parse_from(["strava-run-dashboard", "serve", flag.as_str()])
                .unwrap();
            let Some(Command::Serve(args)) = cli.command else {
                panic!("expected serve");
            };
            let mut config = Config::default();
            assert!(args.schedule.apply(&mut config).is_err(), "{} accepted", raw);
            assert_eq!(config.collection_interval, Config::default().collection_interval);
        }
    }

    #[test]
    fn test_collect_help_mentions_single_process_refresh() {
        let mut cli = Cli::command();
        let collect = cli.find_subcommand_mut("collect").unwrap();
        let help = collect.render_long_help().to_string();
        assert!(help.contains("serialized within one process only"));
    }
}
