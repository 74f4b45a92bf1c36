// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Restart-on-failure supervision for long-running tasks.
//!
//! Each supervised task is built by a factory so it can be started again
//! after it returns an error, exits early, or panics. Shutdown is signalled
//! through a shared `CancellationToken`; a task that ends after
//! cancellation is considered stopped, not crashed.

use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::Serialize;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Delay before a crashed task is started again.
pub const RESTART_DELAY: Duration = Duration::from_secs(30);

/// Builds one run of a supervised task.
pub type TaskFactory =
    Arc<dyn Fn(CancellationToken) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Wrap an async closure as a task factory.
pub fn task<F, Fut>(f: F) -> TaskFactory
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move |token| f(token).boxed())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Running,
    Crashed,
    Restarting,
    Stopped,
}

/// Health of one supervised task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskHealth {
    pub state: TaskState,
    pub restarts: u32,
    pub last_error: Option<String>,
    /// When the task entered its current state
    pub since: DateTime<Utc>,
}

/// Read-only view of task health, shared with HTTP handlers.
#[derive(Clone, Default)]
pub struct SupervisorHandle {
    tasks: Arc<RwLock<BTreeMap<String, TaskHealth>>>,
}

impl SupervisorHandle {
    /// Health of every task by name.
    pub async fn snapshot(&self) -> BTreeMap<String, TaskHealth> {
        self.tasks.read().await.clone()
    }

    async fn transition(&self, name: &str, state: TaskState, error: Option<String>) {
        let mut tasks = self.tasks.write().await;
        let entry = tasks.entry(name.to_string()).or_insert_with(|| TaskHealth {
            state,
            restarts: 0,
            last_error: None,
            since: Utc::now(),
        });

        if state == TaskState::Restarting {
            entry.restarts += 1;
        }
        if error.is_some() {
            entry.last_error = error;
        }
        entry.state = state;
        entry.since = Utc::now();
    }
}

/// Runs named tasks and restarts them when they fail.
pub struct Supervisor {
    restart_delay: Duration,
    shutdown: CancellationToken,
    handle: SupervisorHandle,
    workers: Vec<JoinHandle<()>>,
}

impl Supervisor {
    pub fn new(restart_delay: Duration, shutdown: CancellationToken) -> Self {
        Self {
            restart_delay,
            shutdown,
            handle: SupervisorHandle::default(),
            workers: Vec::new(),
        }
    }

    pub fn handle(&self) -> SupervisorHandle {
        self.handle.clone()
    }

    /// Start supervising a task.
    pub fn spawn(&mut self, name: impl Into<String>, factory: TaskFactory) {
        let name = name.into();
        let handle = self.handle.clone();
        let shutdown = self.shutdown.clone();
        let delay = self.restart_delay;

        self.workers.push(tokio::spawn(async move {
            supervise(name, factory, handle, shutdown, delay).await;
        }));
    }

    /// Wait until every task has stopped.
    pub async fn run(self) {
        for worker in self.workers {
            if let Err(e) = worker.await {
                tracing::error!(error = %e, "Supervisor worker failed");
            }
        }
    }
}

async fn supervise(
    name: String,
    factory: TaskFactory,
    handle: SupervisorHandle,
    shutdown: CancellationToken,
    delay: Duration,
) {
    loop {
        let child = tokio::spawn(factory(shutdown.child_token()));
        handle.transition(&name, TaskState::Running, None).await;
        tracing::info!(task = %name, "Task started");

        let outcome = child.await;

        if shutdown.is_cancelled() {
            break;
        }

        let message = match outcome {
            Ok(Ok(())) => "task exited unexpectedly".to_string(),
            Ok(Err(e)) => format!("{:#}", e),
            Err(e) if e.is_panic() => "task panicked".to_string(),
            Err(e) => e.to_string(),
        };
        tracing::error!(task = %name, error = %message, "Task crashed");
        handle
            .transition(&name, TaskState::Crashed, Some(message))
            .await;

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }

        tracing::warn!(task = %name, "Restarting task");
        handle.transition(&name, TaskState::Restarting, None).await;
    }

    handle.transition(&name, TaskState::Stopped, None).await;
    tracing::info!(task = %name, "Task stopped");
}
