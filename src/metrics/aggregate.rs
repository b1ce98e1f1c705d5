use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;

use crate::error::{AppError, AppResult, HttpError};

use super::types::{TimingSample, WorkerResult};

/// Basis points in a ratio of 1.0.
pub(crate) const RATE_SCALE: u64 = 10_000;
const BYTES_PER_KB: u64 = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatencyStats {
    pub samples: u64,
    pub min_ms: u64,
    pub max_ms: u64,
    pub mean_ms: u64,
    pub median_ms: u64,
    pub mean_reported_ms: i64,
    /// Mean measured time minus mean server-reported time.
    pub mean_network_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Throughput {
    pub requests_per_sec: u64,
    pub kb_per_sec: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagStats {
    pub tag: String,
    pub count: u64,
    pub mean_measured_ms: u64,
    pub mean_reported_ms: i64,
}

/// Summary of a whole run, computed once after every hammer reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateReport {
    pub hammers: usize,
    pub duration_secs: u64,
    pub passes: u64,
    pub requests: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub timed_out: u64,
    pub transport_errors: u64,
    pub parse_errors: u64,
    pub byte_count: u64,
    /// `failed / requests` in basis points, timeouts included; absent when
    /// nothing completed.
    pub failure_rate_bp: Option<u64>,
    /// Absent when the run lasted less than one whole second.
    pub throughput: Option<Throughput>,
    pub latency: Option<LatencyStats>,
    pub tags: Vec<TagStats>,
}

/// Waits until exactly `expected` items arrived on `results_rx`.
///
/// # Errors
///
/// Returns [`HttpError::ResultsIncomplete`] when the channel closes first.
pub async fn collect_results<T>(
    results_rx: &mut mpsc::Receiver<T>,
    expected: usize,
) -> AppResult<Vec<T>> {
    let mut received = Vec::with_capacity(expected);
    while received.len() < expected {
        match results_rx.recv().await {
            Some(result) => received.push(result),
            None => {
                return Err(AppError::http(HttpError::ResultsIncomplete {
                    received: received.len(),
                    expected,
                }));
            }
        }
    }
    Ok(received)
}

impl AggregateReport {
    /// Merges per-hammer results. Throughput uses whole seconds of the
    /// configured duration with integer division.
    #[must_use]
    pub fn from_results<I>(results: I, duration: Duration) -> Self
    where
        I: IntoIterator<Item = WorkerResult>,
    {
        let mut hammers = 0usize;
        let mut totals = WorkerResult::default();
        for result in results {
            hammers = hammers.saturating_add(1);
            totals.merge(result);
        }

        let requests = totals.requests();
        let failure_rate_bp = ratio_bp(totals.failed, requests);

        let duration_secs = duration.as_secs();
        let throughput = requests_per(duration_secs, requests, totals.byte_count);

        let tags = tag_breakdown(&totals.samples);
        let latency = LatencyStats::from_samples(&mut totals.samples);

        Self {
            hammers,
            duration_secs,
            passes: totals.passes,
            requests,
            succeeded: totals.succeeded,
            failed: totals.failed,
            timed_out: totals.timed_out,
            transport_errors: totals.transport_errors,
            parse_errors: totals.parse_errors,
            byte_count: totals.byte_count,
            failure_rate_bp,
            throughput,
            latency,
            tags,
        }
    }
}

impl LatencyStats {
    /// Sorts `samples` by measured time and summarizes them. The median is
    /// the element at `len / 2`, without interpolation.
    pub fn from_samples(samples: &mut [TimingSample]) -> Option<Self> {
        samples.sort_by_key(|sample| sample.measured_ms);
        let count = u64::try_from(samples.len()).ok()?;
        let min_ms = samples.first()?.measured_ms;
        let max_ms = samples.last()?.measured_ms;
        let median_ms = samples.get(samples.len().checked_div(2)?)?.measured_ms;

        let measured_sum = samples.iter().fold(0u128, |sum, sample| {
            sum.saturating_add(u128::from(sample.measured_ms))
        });
        let reported_sum = samples.iter().fold(0i128, |sum, sample| {
            sum.saturating_add(i128::from(sample.reported_ms))
        });
        let mean_measured = measured_sum.checked_div(u128::from(count))?;
        let mean_reported = reported_sum.checked_div(i128::from(count))?;
        let mean_network = i128::try_from(mean_measured)
            .unwrap_or(i128::MAX)
            .saturating_sub(mean_reported);

        Some(Self {
            samples: count,
            min_ms,
            max_ms,
            mean_ms: clamp_u64(mean_measured),
            median_ms,
            mean_reported_ms: clamp_i64(mean_reported),
            mean_network_ms: clamp_i64(mean_network),
        })
    }
}

fn ratio_bp(numerator: u64, denominator: u64) -> Option<u64> {
    let scaled = u128::from(numerator)
        .saturating_mul(u128::from(RATE_SCALE))
        .checked_div(u128::from(denominator))?;
    Some(clamp_u64(scaled))
}

fn requests_per(duration_secs: u64, requests: u64, bytes: u64) -> Option<Throughput> {
    let requests_per_sec = requests.checked_div(duration_secs)?;
    let kb_per_sec = bytes
        .checked_div(BYTES_PER_KB)
        .and_then(|kb| kb.checked_div(duration_secs))?;
    Some(Throughput {
        requests_per_sec,
        kb_per_sec,
    })
}

fn tag_breakdown(samples: &[TimingSample]) -> Vec<TagStats> {
    let mut by_tag: BTreeMap<&str, (u64, u128, i128)> = BTreeMap::new();
    for sample in samples {
        let entry = by_tag.entry(sample.tag.as_str()).or_insert((0, 0, 0));
        entry.0 = entry.0.saturating_add(1);
        entry.1 = entry.1.saturating_add(u128::from(sample.measured_ms));
        entry.2 = entry.2.saturating_add(i128::from(sample.reported_ms));
    }
    by_tag
        .into_iter()
        .map(|(tag, (count, measured, reported))| TagStats {
            tag: tag.to_owned(),
            count,
            mean_measured_ms: clamp_u64(measured.checked_div(u128::from(count)).unwrap_or(0)),
            mean_reported_ms: clamp_i64(reported.checked_div(i128::from(count)).unwrap_or(0)),
        })
        .collect()
}

fn clamp_u64(value: u128) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

fn clamp_i64(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
}
