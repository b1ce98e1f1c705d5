use std::path::Path;

use clap::{CommandFactory, FromArgMatches};
use tracing::debug;

use crate::app::run_hammer;
use crate::args::HammerArgs;
use crate::config::{load_config_file, resolve_run_config};
use crate::error::AppResult;
use crate::metrics::print_report;

/// Parses the command line, loads the config, runs the hammers, and prints
/// the report. Fatal errors are returned unlogged; `main` prints them once.
///
/// # Errors
///
/// Returns an error when configuration, setup, or a `fail-fast` run fails.
pub fn run() -> AppResult<()> {
    let matches = HammerArgs::command().get_matches();
    let args = HammerArgs::from_arg_matches(&matches)?;

    let mut file = load_config_file(Path::new(&args.config))?;
    let log_level = file.log_level.take();
    crate::system::logger::init_logging(args.verbose, args.no_color, log_level.as_deref())?;
    debug!("Loaded config from {}", args.config);

    let config = resolve_run_config(&args, file)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let report = runtime.block_on(run_hammer(&config))?;
    print_report(&report, config.output)
}
