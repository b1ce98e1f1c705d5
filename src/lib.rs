//! Core library for the `hammer` CLI.
//!
//! `hammer` replays a recorded log of JSON requests against a service from
//! many concurrent workers for a fixed duration, substituting fresh seed and
//! coordinate values on every pass, and reports throughput, error rate, and
//! latency split into server time and network time.
pub mod app;
pub mod args;
pub mod config;
pub mod entry;
pub mod error;
pub mod http;
pub mod metrics;
pub mod shutdown;
pub mod shutdown_handlers;
pub mod system;
pub mod workload;

pub use entry::run;
