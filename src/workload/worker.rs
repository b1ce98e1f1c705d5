use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::args::ErrorPolicy;
use crate::error::HttpError;
use crate::http::{InboundResponse, OutboundRequest, Transport, TransportError, TransportErrorKind};
use crate::metrics::{TimingFragment, TimingSample, WorkerResult};
use crate::shutdown::StopSignal;
use crate::system::log_budget::{LogBudget, LogPermit};

use super::params::{Placeholders, generate_parameters};
use super::store::{RequestTemplate, TemplateStore};
use super::substitute::{compose_url, substitute};

/// Everything a hammer reads while it runs. Shared, never mutated.
#[derive(Clone)]
pub struct WorkerContext {
    pub templates: TemplateStore,
    pub transport: Arc<dyn Transport>,
    pub host: Arc<str>,
    pub credential: Arc<str>,
    pub placeholders: Arc<Placeholders>,
    pub error_policy: ErrorPolicy,
    pub log_budget: Arc<LogBudget>,
}

/// The single message a hammer sends when it stops.
#[derive(Debug)]
pub struct WorkerExit {
    pub worker_id: usize,
    pub result: WorkerResult,
    /// Set when a transport error ended the run under `fail-fast`.
    pub fault: Option<HttpError>,
}

/// Replays the template store until `stop` is set.
///
/// The flag is checked between requests only, so the request in flight
/// when it is set still completes and is counted.
pub async fn run_worker(worker_id: usize, context: WorkerContext, stop: StopSignal) -> WorkerExit {
    let mut result = WorkerResult::default();
    let mut params = context.placeholders.as_ref().clone();
    let mut index = 0usize;
    let mut fault = None;

    debug!("Hammer {} running", worker_id);
    while !stop.is_stopped() {
        if index >= context.templates.len() {
            index = 0;
        }
        if index == 0 {
            result.start_pass();
            params = generate_parameters(&context.placeholders);
        }
        let Some(template) = context.templates.get(index) else {
            break;
        };
        index = index.saturating_add(1);

        let request = build_request(&context, template, &params);
        let method = request.method.clone();
        let url = request.url.clone();

        let start = Instant::now();
        let outcome = context.transport.send(request).await;
        let measured_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        match outcome {
            Ok(response) => record_response(&context, &mut result, &response, measured_ms, &url),
            Err(err) => {
                if let Some(fatal) = record_transport_error(&context, &mut result, err, &method, &url)
                {
                    debug!("Hammer {} stopping the run: {}", worker_id, fatal);
                    fault = Some(fatal);
                    stop.trigger();
                    break;
                }
            }
        }
    }

    debug!(
        "Hammer {} stopped after {} requests",
        worker_id,
        result.requests()
    );
    WorkerExit {
        worker_id,
        result,
        fault,
    }
}

fn build_request(
    context: &WorkerContext,
    template: &RequestTemplate,
    params: &Placeholders,
) -> OutboundRequest {
    let substituted = substitute(template, &context.placeholders, params);
    OutboundRequest {
        method: template.method.clone(),
        url: compose_url(&context.host, &substituted.url, &context.credential),
        body: substituted.body,
    }
}

fn record_response(
    context: &WorkerContext,
    result: &mut WorkerResult,
    response: &InboundResponse,
    measured_ms: u64,
    url: &str,
) {
    let success = (200..400).contains(&response.status);
    match TimingFragment::parse(&response.body) {
        Ok(fragment) => {
            let sample = TimingSample {
                tag: fragment.tag,
                reported_ms: fragment.time,
                measured_ms,
            };
            result.record_response(success, response.body.len(), Some(sample));
        }
        Err(err) if success => {
            result.record_unparsed(response.body.len());
            log_failure(context, || {
                format!("{} returned no timing fragment: {}", url, err)
            });
            return;
        }
        Err(_no_fragment) => result.record_response(false, response.body.len(), None),
    }
    if !success {
        log_failure(context, || {
            format!("{} returned status {}", url, response.status)
        });
    }
}

/// Counts the error; returns it as fatal when the policy says so.
fn record_transport_error(
    context: &WorkerContext,
    result: &mut WorkerResult,
    err: TransportError,
    method: &reqwest::Method,
    url: &str,
) -> Option<HttpError> {
    if err.kind == TransportErrorKind::Timeout {
        result.record_timeout();
        log_failure(context, || format!("{} {} timed out", method, url));
        return None;
    }

    result.record_transport_error();
    match context.error_policy {
        ErrorPolicy::FailFast => Some(HttpError::Transport {
            method: method.to_string(),
            url: url.to_owned(),
            message: err.message,
        }),
        ErrorPolicy::Continue => {
            log_failure(context, || format!("{} {} failed: {}", method, url, err));
            None
        }
    }
}

fn log_failure<F>(context: &WorkerContext, message: F)
where
    F: FnOnce() -> String,
{
    match context.log_budget.acquire() {
        LogPermit::Granted => warn!("{}", message()),
        LogPermit::Last => {
            warn!("{}", message());
            warn!("Failure log limit reached; further request failures are only counted.");
        }
        LogPermit::Denied => {}
    }
}
