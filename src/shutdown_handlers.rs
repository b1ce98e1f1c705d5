use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::shutdown::StopSignal;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Sets `stop` once `duration` elapsed. Never interrupts in-flight requests;
/// hammers only look at the flag between requests.
pub fn setup_run_timer(stop: &StopSignal, duration: Duration) -> JoinHandle<()> {
    let stop = stop.clone();
    tokio::spawn(async move {
        info!("Start... ({}s)", duration.as_secs());
        tokio::select! {
            () = sleep(duration) => {
                if stop.trigger() {
                    info!("Stop");
                }
            }
            () = stop.stopped() => {}
        }
    })
}

/// Ends the run early on Ctrl+C or SIGTERM.
pub fn setup_signal_shutdown_handler(stop: &StopSignal) -> JoinHandle<()> {
    let stop = stop.clone();
    tokio::spawn(async move {
        #[cfg(unix)]
        let mut term_signal = match signal(SignalKind::terminate()) {
            Ok(signal) => Some(signal),
            Err(err) => {
                warn!("Failed to register SIGTERM handler: {}", err);
                None
            }
        };

        #[cfg(unix)]
        {
            tokio::select! {
                () = stop.stopped() => {}
                _ = tokio::signal::ctrl_c() => {
                    if stop.trigger() {
                        warn!("Interrupted, stopping hammers.");
                    }
                }
                () = async {
                    if let Some(signal) = term_signal.as_mut() {
                        signal.recv().await;
                    } else {
                        std::future::pending::<()>().await;
                    }
                } => {
                    if stop.trigger() {
                        warn!("Terminated, stopping hammers.");
                    }
                }
            }
        }

        #[cfg(not(unix))]
        {
            tokio::select! {
                () = stop.stopped() => {}
                _ = tokio::signal::ctrl_c() => {
                    if stop.trigger() {
                        warn!("Interrupted, stopping hammers.");
                    }
                }
            }
        }
    })
}
