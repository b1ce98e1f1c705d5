use std::sync::Arc;

use tracing::{info, warn};

use crate::config::RunConfig;
use crate::error::{AppError, AppResult};
use crate::http::{ReqwestTransport, Transport, authenticate, build_client, probe_host};
use crate::metrics::AggregateReport;
use crate::shutdown::StopSignal;
use crate::shutdown_handlers::{setup_run_timer, setup_signal_shutdown_handler};
use crate::system::log_budget::LogBudget;
use crate::workload::{PoolSettings, TemplateStore, WorkerContext, WorkerPool, load_template_store};

/// Loads the request log, probes and signs in to the host, then hammers it
/// for the configured duration.
///
/// # Errors
///
/// Returns an error when setup fails or when a transport error ends a
/// `fail-fast` run.
pub async fn run_hammer(config: &RunConfig) -> AppResult<AggregateReport> {
    let templates = load_template_store(&config.request_path)?;
    info!(
        "Loaded {} requests from {}",
        templates.len(),
        config.request_path.display()
    );

    let client = build_client()?;
    probe_host(&client, &config.host).await?;
    let mut credential = String::new();
    if let Some(signin) = config.signin.as_ref() {
        credential = authenticate(&client, &config.host, signin).await?;
    }
    let transport: Arc<dyn Transport> =
        Arc::new(ReqwestTransport::new(client, config.request_timeout));

    let stop = StopSignal::new();
    let signal_handle = setup_signal_shutdown_handler(&stop);
    let outcome = execute(config, templates, transport, &credential, &stop).await;
    stop.trigger();
    if let Err(err) = signal_handle.await {
        warn!("Signal handler task failed: {}", err);
    }
    outcome
}

/// Runs the hammer pool against `transport` until the run timer or `stop`
/// ends it, then aggregates every hammer's result.
///
/// # Errors
///
/// Returns the first fatal transport error under `fail-fast`, or an error
/// when a hammer fails to report.
pub async fn execute(
    config: &RunConfig,
    templates: TemplateStore,
    transport: Arc<dyn Transport>,
    credential: &str,
    stop: &StopSignal,
) -> AppResult<AggregateReport> {
    let context = WorkerContext {
        templates,
        transport,
        host: Arc::from(config.host.as_str()),
        credential: Arc::from(credential),
        placeholders: Arc::new(config.placeholders.clone()),
        error_policy: config.error_policy,
        log_budget: Arc::new(LogBudget::new(config.log_errors_max)),
    };
    let settings = PoolSettings {
        hammers: config.hammers,
        stagger: config.stagger,
    };
    info!(
        "Hammering {} with {} hammers ({} on error)",
        config.host,
        config.hammers.get(),
        config.error_policy.as_str()
    );

    let timer_handle = setup_run_timer(stop, config.duration);
    let joined = WorkerPool::start(settings, context, stop).await.join().await;
    stop.trigger();
    timer_handle.await?;
    let exits = joined?;

    let mut fault = None;
    let mut results = Vec::with_capacity(exits.len());
    for exit in exits {
        fault = fault.or(exit.fault);
        results.push(exit.result);
    }
    if let Some(fault) = fault {
        return Err(AppError::http(fault));
    }
    Ok(AggregateReport::from_results(results, config.duration))
}
