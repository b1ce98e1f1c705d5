use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::error::ConfigError;

/// Installs the global subscriber. `HAMMER_LOG`, then `RUST_LOG`, win over
/// the config's `log_level`, which wins over `--verbose`.
///
/// # Errors
///
/// Returns an error when `level` is not a valid filter directive.
pub fn init_logging(verbose: bool, no_color: bool, level: Option<&str>) -> Result<(), ConfigError> {
    let fallback = match level {
        Some(level) => EnvFilter::try_new(level).map_err(|_invalid| ConfigError::InvalidLogLevel {
            value: level.to_owned(),
        })?,
        None if verbose => EnvFilter::new("debug"),
        None => EnvFilter::new("info"),
    };
    let filter = std::env::var("HAMMER_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok()
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or(fallback);

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
    Ok(())
}
