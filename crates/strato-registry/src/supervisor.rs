// SPDX-FileCopyrightText: 2026 Strato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lifecycle orchestration over a [`Registry`].
//!
//! The supervisor drives every registered component through
//! `initialize` → `start` → `stop`:
//!
//! 1. **Initialize** storages, then filters, then facades.
//! 2. **Start** storages and facades on their own tasks (their `start()`
//!    blocks for the component's lifetime); filters are started inline and
//!    must return within `filter_start_timeout`.
//! 3. **Stop** facades first so no new requests arrive, then filters, then
//!    storages. Each `stop()` gets `stop_timeout`; a component that overruns
//!    is reported as timed out and teardown continues without it.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use strato_config::model::LifecycleConfig;
use strato_core::{ComponentKind, LifecycleStage, LifecycleState, StartMode, StratoError};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::registry::{Handle, Registry};

const INIT_ORDER: [ComponentKind; 3] = [
    ComponentKind::Storage,
    ComponentKind::Filter,
    ComponentKind::Facade,
];

const STOP_ORDER: [ComponentKind; 3] = [
    ComponentKind::Facade,
    ComponentKind::Filter,
    ComponentKind::Storage,
];

/// How a component's `stop()` concluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    /// `stop()` returned `Ok` within the deadline.
    Stopped,
    /// `stop()` returned an error within the deadline.
    Failed(String),
    /// `stop()` did not return within the deadline; the component is treated
    /// as forcibly terminated.
    TimedOut,
    /// The component was never initialized or was already stopped.
    Skipped,
}

impl fmt::Display for StopOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopOutcome::Stopped => write!(f, "stopped"),
            StopOutcome::Failed(reason) => write!(f, "failed: {reason}"),
            StopOutcome::TimedOut => write!(f, "timed out"),
            StopOutcome::Skipped => write!(f, "skipped"),
        }
    }
}

/// Stop result for one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentReport {
    pub kind: ComponentKind,
    pub name: String,
    pub outcome: StopOutcome,
}

/// Result of [`Supervisor::shutdown`].
#[derive(Debug, Clone, Default)]
pub struct ShutdownReport {
    /// Per-component outcomes in the order components were stopped.
    pub components: Vec<ComponentReport>,
    /// Number of blocking `start()` tasks that had to be aborted.
    pub aborted_tasks: usize,
}

impl ShutdownReport {
    /// Outcome recorded for a component, if it was visited.
    pub fn outcome(&self, kind: ComponentKind, name: &str) -> Option<&StopOutcome> {
        self.components
            .iter()
            .find(|c| c.kind == kind && c.name == name)
            .map(|c| &c.outcome)
    }

    /// Components whose `stop()` overran its deadline.
    pub fn timed_out(&self) -> Vec<&ComponentReport> {
        self.components
            .iter()
            .filter(|c| c.outcome == StopOutcome::TimedOut)
            .collect()
    }

    /// True when every visited component stopped cleanly (or was skipped) and
    /// no task had to be aborted.
    pub fn is_clean(&self) -> bool {
        self.aborted_tasks == 0
            && self
                .components
                .iter()
                .all(|c| matches!(c.outcome, StopOutcome::Stopped | StopOutcome::Skipped))
    }
}

/// A blocking component whose `start()` returned.
#[derive(Debug)]
pub struct ComponentExit {
    pub kind: ComponentKind,
    pub name: String,
    pub result: Result<(), StratoError>,
}

/// Drives registered components through their lifecycle.
pub struct Supervisor {
    registry: Arc<Registry>,
    config: LifecycleConfig,
    tasks: JoinSet<ComponentExit>,
}

impl Supervisor {
    /// Create a supervisor for `registry` using the given deadlines.
    pub fn new(registry: Arc<Registry>, config: LifecycleConfig) -> Self {
        Self {
            registry,
            config,
            tasks: JoinSet::new(),
        }
    }

    /// The registry being supervised.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Number of blocking `start()` tasks still running.
    pub fn running(&self) -> usize {
        self.tasks.len()
    }

    /// Initialize every uninitialized component: storages, filters, facades.
    ///
    /// The first failure aborts the pass with [`StratoError::ComponentFailed`].
    /// Components that already initialized are not initialized again.
    pub async fn initialize(&self) -> Result<(), StratoError> {
        for kind in INIT_ORDER {
            for (name, handle) in self.registry.handles(kind) {
                if self.registry.state(kind, &name) != Some(LifecycleState::Uninitialized) {
                    debug!(%kind, component = %name, "already initialized, skipping");
                    continue;
                }

                handle
                    .initialize()
                    .await
                    .map_err(|e| failed(kind, &name, LifecycleStage::Initialize, e))?;
                self.registry.transition(
                    kind,
                    &name,
                    &[LifecycleState::Uninitialized],
                    LifecycleState::Initialized,
                )?;
                info!(%kind, component = %name, "component initialized");
            }
        }
        Ok(())
    }

    /// Start every component.
    ///
    /// Refuses to start anything unless every registered component is
    /// initialized and not yet started. Storages and facades are spawned onto
    /// their own tasks; filters are awaited inline under
    /// `filter_start_timeout`.
    pub async fn start(&mut self) -> Result<(), StratoError> {
        for kind in INIT_ORDER {
            for name in self.registry.names(kind) {
                match self.registry.state(kind, &name) {
                    Some(LifecycleState::Initialized) => {}
                    Some(state) => {
                        return Err(StratoError::Lifecycle {
                            kind,
                            message: format!("cannot start a component that is {state}"),
                            name,
                        });
                    }
                    None => return Err(StratoError::UnknownReference { kind, name }),
                }
            }
        }

        for kind in INIT_ORDER {
            for (name, handle) in self.registry.handles(kind) {
                self.registry.transition(
                    kind,
                    &name,
                    &[LifecycleState::Initialized],
                    LifecycleState::Started,
                )?;

                if kind.start_mode() == StartMode::Detached {
                    self.start_detached(&name, &handle).await?;
                } else {
                    self.spawn_blocking_start(kind, name, handle);
                }
            }
        }

        info!(running = self.tasks.len(), "all components started");
        Ok(())
    }

    async fn start_detached(&self, name: &str, handle: &Handle) -> Result<(), StratoError> {
        let deadline = self.config.filter_start_timeout();
        match tokio::time::timeout(deadline, handle.start()).await {
            Ok(Ok(())) => {
                info!(kind = %ComponentKind::Filter, component = name, "component started");
                Ok(())
            }
            Ok(Err(e)) => Err(failed(ComponentKind::Filter, name, LifecycleStage::Start, e)),
            Err(_elapsed) => {
                error!(
                    component = name,
                    timeout_secs = deadline.as_secs(),
                    "filter start blocked past its deadline"
                );
                Err(StratoError::LifecycleTimeout {
                    kind: ComponentKind::Filter,
                    name: name.to_string(),
                    stage: LifecycleStage::Start,
                    duration: deadline,
                })
            }
        }
    }

    fn spawn_blocking_start(&mut self, kind: ComponentKind, name: String, handle: Handle) {
        info!(%kind, component = %name, "component starting");
        self.tasks.spawn(async move {
            let result = handle.start().await;
            ComponentExit { kind, name, result }
        });
    }

    /// Wait until `cancel` fires or a blocking component's `start()` returns.
    ///
    /// Returns `None` on cancellation, or the component that exited. An exit
    /// before shutdown is unexpected and is logged; the decision to shut down
    /// is left to the caller.
    pub async fn wait(&mut self, cancel: &CancellationToken) -> Option<ComponentExit> {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("shutdown requested");
                    return None;
                }
                Some(joined) = self.tasks.join_next(), if !self.tasks.is_empty() => {
                    let exit = match joined {
                        Ok(exit) => exit,
                        Err(e) => {
                            // A panicked task no longer knows its name.
                            error!(error = %e, "component task panicked");
                            continue;
                        }
                    };
                    match &exit.result {
                        Ok(()) => warn!(kind = %exit.kind, component = %exit.name, "component exited before shutdown"),
                        Err(e) => error!(kind = %exit.kind, component = %exit.name, error = %e, "component failed"),
                    }
                    return Some(exit);
                }
            }
        }
    }

    /// Stop every component and tear down the blocking tasks.
    ///
    /// Never fails: overruns and errors are recorded in the returned report.
    pub async fn shutdown(&mut self) -> ShutdownReport {
        let deadline = self.config.stop_timeout();
        let mut report = ShutdownReport::default();

        info!(timeout_secs = deadline.as_secs(), "stopping components");
        for kind in STOP_ORDER {
            let stops = self
                .registry
                .handles(kind)
                .into_iter()
                .map(|(name, handle)| self.stop_one(kind, name, handle, deadline));
            report.components.extend(join_all(stops).await);
        }

        report.aborted_tasks = self.drain_tasks(deadline).await;

        if report.is_clean() {
            info!("shutdown complete");
        } else {
            warn!(
                timed_out = report.timed_out().len(),
                aborted = report.aborted_tasks,
                "shutdown completed with failures"
            );
        }
        report
    }

    async fn stop_one(
        &self,
        kind: ComponentKind,
        name: String,
        handle: Handle,
        deadline: Duration,
    ) -> ComponentReport {
        let claimed = self.registry.transition(
            kind,
            &name,
            &[LifecycleState::Initialized, LifecycleState::Started],
            LifecycleState::Stopped,
        );
        if claimed.is_err() {
            debug!(%kind, component = %name, "not running, skipping stop");
            return ComponentReport {
                kind,
                name,
                outcome: StopOutcome::Skipped,
            };
        }

        let outcome = match tokio::time::timeout(deadline, handle.stop()).await {
            Ok(Ok(())) => {
                info!(%kind, component = %name, "component stopped");
                StopOutcome::Stopped
            }
            Ok(Err(e)) => {
                warn!(%kind, component = %name, error = %e, "component stop failed");
                StopOutcome::Failed(e.to_string())
            }
            Err(_elapsed) => {
                warn!(
                    %kind,
                    component = %name,
                    timeout_secs = deadline.as_secs(),
                    "component did not stop in time, treating as terminated"
                );
                StopOutcome::TimedOut
            }
        };

        ComponentReport {
            kind,
            name,
            outcome,
        }
    }

    /// Give blocking `start()` tasks `grace` to return, then abort the rest.
    /// Returns the number of aborted tasks.
    async fn drain_tasks(&mut self, grace: Duration) -> usize {
        let drained = tokio::time::timeout(grace, async {
            while let Some(joined) = self.tasks.join_next().await {
                match joined {
                    Ok(ComponentExit {
                        kind,
                        name,
                        result: Err(e),
                    }) => {
                        warn!(%kind, component = %name, error = %e, "component start returned an error during shutdown");
                    }
                    Ok(exit) => {
                        debug!(kind = %exit.kind, component = %exit.name, "component task finished");
                    }
                    Err(e) => warn!(error = %e, "component task panicked during shutdown"),
                }
            }
        })
        .await;

        if drained.is_ok() {
            return 0;
        }

        let remaining = self.tasks.len();
        warn!(remaining, "aborting component tasks still running after grace period");
        self.tasks.shutdown().await;
        remaining
    }
}

fn failed(kind: ComponentKind, name: &str, stage: LifecycleStage, source: StratoError) -> StratoError {
    StratoError::ComponentFailed {
        kind,
        name: name.to_string(),
        stage,
        source: Box::new(source),
    }
}
