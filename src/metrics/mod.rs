//! Per-hammer results, run aggregation, and report rendering.
mod aggregate;
mod report;
mod types;


pub use aggregate::{AggregateReport, LatencyStats, TagStats, Throughput, collect_results};
pub use report::{print_report, report_lines};
pub use types::{TimingFragment, TimingSample, WorkerResult};
