//! Route Reconciler
//!
//! Control loop that converges mc-router onto the server list:
//! fetch both sides, diff them, plan actions, apply them, repeat.
//!
//! ## Failure model
//!
//! - A failed fetch aborts the pass before anything is applied.
//! - A failed action stops the pass; earlier actions stay applied and the
//!   next pass picks up from whatever state mc-router is in.
//! - `start` never gives up: every pass error is logged and the loop waits
//!   for the next tick.

mod actions;
mod diff;

pub use actions::{plan, plan_one, Action, ActionKind};
pub use diff::{compute_diffs, Diff};

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::error::{ReconcileError, StateSource};
use crate::mc_router::McRouter;
use crate::route::Route;
use crate::server_list::ServerList;

/// Summary of one reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    /// Addresses seen on either side
    pub diffs: usize,
    pub adds: usize,
    pub deletes: usize,
    /// Actions were planned but not applied
    pub dry_run: bool,
}

impl PassReport {
    fn new(diffs: &[Diff], actions: &[Action], dry_run: bool) -> Self {
        let adds = actions.iter().filter(|a| a.kind() == ActionKind::Add).count();
        Self {
            diffs: diffs.len(),
            adds,
            deletes: actions.len() - adds,
            dry_run,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.adds == 0 && self.deletes == 0
    }
}

/// Keeps mc-router in sync with the server list
pub struct Reconciler {
    server_list: Arc<dyn ServerList>,
    mc_router: Arc<dyn McRouter>,
    interval: Duration,
    dry_run: bool,
}

impl Reconciler {
    /// `interval` must be non-zero.
    pub fn new(
        server_list: Arc<dyn ServerList>,
        mc_router: Arc<dyn McRouter>,
        interval: Duration,
    ) -> Self {
        Self {
            server_list,
            mc_router,
            interval,
            dry_run: false,
        }
    }

    /// Plan actions but never send them to mc-router
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Fetch both route sets and join them on server address
    pub async fn diff(&self) -> Result<Vec<Diff>, ReconcileError> {
        let desired = self
            .server_list
            .get_servers()
            .await
            .map_err(|source| ReconcileError::Fetch {
                source_name: StateSource::ServerList,
                source,
            })?;

        let current = self
            .mc_router
            .get_routes()
            .await
            .map_err(|source| ReconcileError::Fetch {
                source_name: StateSource::McRouter,
                source,
            })?;

        debug!(
            desired = desired.len(),
            current = current.len(),
            "Fetched route sets"
        );

        Ok(compute_diffs(&desired, &current))
    }

    /// Plan the actions needed to converge `diffs`
    pub fn actions(&self, diffs: &[Diff]) -> Vec<Action> {
        plan(diffs)
    }

    /// Apply actions in order, stopping at the first failure
    pub async fn apply(&self, actions: &[Action]) -> Result<(), ReconcileError> {
        for action in actions {
            let result = match action {
                Action::Add {
                    server_address,
                    backend,
                } => {
                    info!(server_address = %server_address, backend = %backend, "Registering route");
                    let route = Route::new(server_address.clone(), backend.clone());
                    self.mc_router.register_route(&route).await
                }
                Action::Delete { server_address } => {
                    info!(server_address = %server_address, "Deleting route");
                    self.mc_router.delete_route(server_address).await
                }
            };

            result.map_err(|source| ReconcileError::Apply {
                kind: action.kind(),
                server_address: action.server_address().to_string(),
                source,
            })?;
        }

        Ok(())
    }

    /// Run exactly one diff -> plan -> apply pass
    pub async fn reconcile(&self) -> Result<PassReport, ReconcileError> {
        let diffs = self.diff().await?;
        let actions = self.actions(&diffs);
        let report = PassReport::new(&diffs, &actions, self.dry_run);

        if self.dry_run {
            for action in &actions {
                info!(
                    action = %action.kind(),
                    server_address = %action.server_address(),
                    "DRY RUN - would apply"
                );
            }
            return Ok(report);
        }

        self.apply(&actions).await?;
        Ok(report)
    }

    /// Reconcile on every tick until `shutdown` turns true.
    ///
    /// The first pass runs immediately. Shutdown is only observed between
    /// passes; a pass in flight always runs to completion. A dropped sender
    /// counts as shutdown.
    pub async fn start(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.interval.as_secs_f64(),
            dry_run = self.dry_run,
            "Starting reconciler"
        );

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                requested = cancelled(&mut shutdown) => {
                    if !requested {
                        warn!("Shutdown channel closed");
                    }
                    break;
                }

                _ = ticker.tick() => {
                    self.run_pass().await;
                }
            }
        }

        info!("Reconciler stopped");
    }

    async fn run_pass(&self) {
        match self.reconcile().await {
            Ok(report) if report.is_noop() => {
                debug!(diffs = report.diffs, "Routes already in sync");
            }
            Ok(report) => {
                info!(
                    diffs = report.diffs,
                    adds = report.adds,
                    deletes = report.deletes,
                    dry_run = report.dry_run,
                    "Reconciliation pass complete"
                );
            }
            Err(e) => {
                error!(
                    error = %e,
                    server_address = e.server_address(),
                    "Reconciliation failed"
                );
            }
        }
    }
}

/// Resolves once shutdown is requested (`true`) or the sender is dropped (`false`)
async fn cancelled(shutdown: &mut watch::Receiver<bool>) -> bool {
    shutdown.wait_for(|cancelled| *cancelled).await.is_ok()
}
