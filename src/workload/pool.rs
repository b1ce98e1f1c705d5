use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::args::PositiveUsize;
use crate::error::AppResult;
use crate::metrics::collect_results;
use crate::shutdown::StopSignal;

use super::worker::{WorkerContext, WorkerExit, run_worker};

#[derive(Debug, Clone, Copy)]
pub struct PoolSettings {
    pub hammers: PositiveUsize,
    /// Delay between consecutive hammer starts.
    pub stagger: Duration,
}

/// A running set of hammers and the channel their exits arrive on.
pub struct WorkerPool {
    results_rx: mpsc::Receiver<WorkerExit>,
    handles: Vec<JoinHandle<()>>,
    expected: usize,
}

impl WorkerPool {
    /// Spawns every hammer, sleeping `stagger` between starts until `stop`
    /// is set. Hammers spawned after the stop exit without sending a request
    /// but still report.
    pub async fn start(settings: PoolSettings, context: WorkerContext, stop: &StopSignal) -> Self {
        let expected = settings.hammers.get();
        let (results_tx, results_rx) = mpsc::channel(expected);
        let mut handles = Vec::with_capacity(expected);

        info!("Starting {} hammers", expected);
        for index in 0..expected {
            if index > 0 && !settings.stagger.is_zero() && !stop.is_stopped() {
                tokio::select! {
                    () = tokio::time::sleep(settings.stagger) => {}
                    () = stop.stopped() => {}
                }
            }

            let worker_id = index.saturating_add(1);
            let context = context.clone();
            let stop = stop.clone();
            let results_tx = results_tx.clone();
            handles.push(tokio::spawn(async move {
                let exit = run_worker(worker_id, context, stop).await;
                if results_tx.send(exit).await.is_err() {
                    debug!("Hammer {} result dropped: collector gone", worker_id);
                }
            }));
        }
        drop(results_tx);

        Self {
            results_rx,
            handles,
            expected,
        }
    }

    #[must_use]
    pub const fn expected(&self) -> usize {
        self.expected
    }

    /// Waits for exactly one exit per hammer, then for every task to end.
    ///
    /// # Errors
    ///
    /// Returns an error when a hammer task ends without reporting or panics.
    pub async fn join(mut self) -> AppResult<Vec<WorkerExit>> {
        let exits = collect_results(&mut self.results_rx, self.expected).await?;
        for handle in self.handles {
            handle.await?;
        }
        Ok(exits)
    }
}
