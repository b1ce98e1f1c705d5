//! CLI argument types and parsing helpers.
mod cli;
pub(crate) mod parsers;
mod types;


pub use cli::HammerArgs;
pub use types::{ErrorPolicy, OutputFormat, PositiveUsize};
