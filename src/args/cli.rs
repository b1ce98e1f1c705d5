use clap::Parser;
use std::time::Duration;

use super::parsers::{parse_duration_arg, parse_positive_usize};
use super::types::{ErrorPolicy, OutputFormat, PositiveUsize};

/// Config file read when `--config` is not given.
pub(crate) const DEFAULT_CONFIG_PATH: &str = "config.json";

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Replay a recorded request log against a service with concurrent hammers and report throughput, error rate, and latency."
)]
pub struct HammerArgs {
    /// Path to the JSON or TOML config file
    #[arg(long, short = 'c', default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Number of concurrent hammers (overrides config)
    #[arg(long, short = 'n', value_parser = parse_positive_usize)]
    pub hammers: Option<PositiveUsize>,

    /// Run duration in whole seconds (overrides config)
    #[arg(long, short = 't')]
    pub seconds: Option<u64>,

    /// Request log to replay (overrides config)
    #[arg(long = "requests", short = 'r')]
    pub request_path: Option<String>,

    /// What to do when a request cannot be sent
    #[arg(long = "on-error", value_enum, ignore_case = true)]
    pub on_error: Option<ErrorPolicy>,

    /// Per-request timeout (supports ms/s/m/h)
    #[arg(long = "timeout", value_parser = parse_duration_arg)]
    pub timeout: Option<Duration>,

    /// Report format
    #[arg(long = "output", short = 'o', value_enum, ignore_case = true)]
    pub output: Option<OutputFormat>,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable ANSI colors in log output
    #[arg(long = "no-color")]
    pub no_color: bool,
}
