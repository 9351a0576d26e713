use std::{collections::BTreeSet, thread};

use futures::StreamExt;
use futures_channel::mpsc;

use crate::{
    builder::{BootUnit, Cleanup},
    container::Container,
};

/// Starts boot units and hands back the [Shutdown] collecting their cleanups
pub(crate) struct BootInitiator {
    thread_name_prefix: String,
}
impl BootInitiator {
    pub(crate) fn new(thread_name_prefix: String) -> BootInitiator {
        BootInitiator { thread_name_prefix }
    }

    pub(crate) fn initiate(self, container: Container, units: Vec<BootUnit>) -> Shutdown {
        let unit_count = units.len();
        let (result_tx, result_rx) = mpsc::unbounded::<UnitResult>();

        tracing::debug!("Booting {unit_count} units");

        for (index, unit) in units.into_iter().enumerate() {
            let result_tx = result_tx.clone();
            let container = container.clone();

            let spawned = thread::Builder::new()
                .name(format!("{}-{index}", self.thread_name_prefix))
                .spawn(move || {
                    tracing::debug!("Boot unit {index} started");
                    let cleanup = unit(container);
                    tracing::debug!(
                        "Boot unit {index} finished {}",
                        if cleanup.is_some() { "with cleanup" } else { "without cleanup" }
                    );
                    // Receiver is only gone if the Shutdown was dropped - nothing left to clean up then
                    let _ = result_tx.unbounded_send(UnitResult { index, cleanup });
                });

            // The unit and its sender are dropped with the closure, shutdown will count it as failed
            if let Err(e) = spawned {
                tracing::error!("Failed to spawn thread for boot unit {index}: {e}");
            }
        }

        // Only the unit threads may keep the channel open
        drop(result_tx);

        Shutdown {
            container,
            unit_count,
            results: result_rx,
        }
    }
}

/// What a boot unit reports back when it is done
struct UnitResult {
    index: usize,
    cleanup: Option<Cleanup>,
}

/// Waits for all boot units and runs their cleanups.
///
/// Consumed on use, so the cleanups can only ever run once.
/// There is no timeout - a unit that never returns stalls the shutdown.
#[must_use = "dropping the Shutdown leaves the boot units' cleanups unrun"]
pub struct Shutdown {
    container: Container,
    unit_count: usize,
    results: mpsc::UnboundedReceiver<UnitResult>,
}

/// Outcome of a [Shutdown]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Number of units booted
    pub units: usize,
    /// Number of cleanups run
    pub cleanups_run: usize,
    /// Units which ended without reporting, in index order - they panicked or never started
    pub failed: Vec<usize>,
}

impl Shutdown {
    /// The container shared by all boot units
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Blocks until every unit has finished, then runs the collected cleanups
    pub fn shutdown(self) -> ShutdownReport {
        futures::executor::block_on(self.wait())
    }

    /// Waits for every unit to finish, then runs the collected cleanups.
    ///
    /// Cleanups run one after another, in the order the units finished.
    pub async fn wait(self) -> ShutdownReport {
        let Shutdown {
            unit_count,
            mut results,
            ..
        } = self;

        let mut pending: BTreeSet<usize> = (0..unit_count).collect();
        let mut cleanups = Vec::with_capacity(unit_count);

        // Ends once every unit thread has sent its result or died
        while let Some(UnitResult { index, cleanup }) = results.next().await {
            pending.remove(&index);
            tracing::debug!(
                "Waiting for boot units to finish [{} of {unit_count} complete]",
                unit_count - pending.len()
            );
            cleanups.extend(cleanup);
        }

        for index in &pending {
            tracing::error!("Boot unit {index} ended without reporting back");
        }

        let cleanups_run = cleanups.len();
        tracing::debug!("Running {cleanups_run} cleanups");
        for cleanup in cleanups {
            cleanup();
        }
        tracing::debug!("Shutdown complete");

        ShutdownReport {
            units: unit_count,
            cleanups_run,
            failed: pending.into_iter().collect(),
        }
    }
}
