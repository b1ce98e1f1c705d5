//! Configuration loading and resolution.
mod loader;
mod resolve;
pub mod types;


pub use loader::load_config_file;
pub use resolve::{RunConfig, resolve_run_config};
pub use types::{ConfigFile, SigninConfig};
