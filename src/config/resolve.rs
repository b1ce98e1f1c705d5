use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::args::{ErrorPolicy, HammerArgs, OutputFormat, PositiveUsize};
use crate::error::{AppError, AppResult, ConfigError, ValidationError};
use crate::workload::Placeholders;

use super::types::{ConfigFile, SigninConfig};

const DEFAULT_HAMMERS: usize = 1;
const DEFAULT_SECONDS: u64 = 10;
const DEFAULT_REQUEST_PATH: &str = "request.log";
/// Delay between consecutive hammer starts.
const DEFAULT_STAGGER_MS: u64 = 50;

/// Immutable settings for one run, built from the config file and CLI
/// overrides before any hammer starts.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub host: String,
    pub signin: Option<SigninConfig>,
    pub placeholders: Placeholders,
    pub hammers: PositiveUsize,
    pub duration: Duration,
    pub request_path: PathBuf,
    pub request_timeout: Option<Duration>,
    pub error_policy: ErrorPolicy,
    pub stagger: Duration,
    pub log_errors_max: Option<u64>,
    pub output: OutputFormat,
}

/// Merges CLI overrides over the config file.
///
/// # Errors
///
/// Returns an error when the host is missing or invalid, or when a numeric
/// field that must be positive is zero.
pub fn resolve_run_config(args: &HammerArgs, file: ConfigFile) -> AppResult<RunConfig> {
    let host = resolve_host(file.host.as_deref())?;

    let hammers = match args.hammers {
        Some(hammers) => hammers,
        None => positive_field("hammers", file.hammers.unwrap_or(DEFAULT_HAMMERS))?,
    };

    let seconds = args.seconds.or(file.seconds).unwrap_or(DEFAULT_SECONDS);

    let request_path = args
        .request_path
        .clone()
        .or(file.request_path)
        .unwrap_or_else(|| DEFAULT_REQUEST_PATH.to_owned());

    let request_timeout = match (args.timeout, file.timeout_ms) {
        (Some(timeout), _) => Some(timeout),
        (None, Some(0)) => {
            return Err(AppError::config(ConfigError::FieldMustBePositive {
                field: "timeout_ms",
                source: ValidationError::ValueTooSmall { min: 1 },
            }));
        }
        (None, Some(ms)) => Some(Duration::from_millis(ms)),
        (None, None) => None,
    };

    Ok(RunConfig {
        host,
        signin: file.signin,
        placeholders: Placeholders {
            seed: file.seed.unwrap_or_default(),
            lat: file.lat.unwrap_or_default(),
            lng: file.lng.unwrap_or_default(),
        },
        hammers,
        duration: Duration::from_secs(seconds),
        request_path: PathBuf::from(request_path),
        request_timeout,
        error_policy: args.on_error.or(file.on_error).unwrap_or_default(),
        stagger: Duration::from_millis(file.stagger_ms.unwrap_or(DEFAULT_STAGGER_MS)),
        log_errors_max: file.log_errors_max,
        output: args.output.or(file.output).unwrap_or_default(),
    })
}

fn resolve_host(host: Option<&str>) -> AppResult<String> {
    let host = host
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .ok_or_else(|| AppError::config(ConfigError::MissingHost))?;
    let parsed = Url::parse(host).map_err(|err| {
        AppError::config(ConfigError::InvalidHost {
            host: host.to_owned(),
            source: err,
        })
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::config(ConfigError::UnsupportedScheme {
            host: host.to_owned(),
        }));
    }
    Ok(host.trim_end_matches('/').to_owned())
}

fn positive_field(field: &'static str, value: usize) -> AppResult<PositiveUsize> {
    PositiveUsize::try_from(value)
        .map_err(|err| AppError::config(ConfigError::FieldMustBePositive { field, source: err }))
}
