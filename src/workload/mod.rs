//! Request replay: template store, per-pass parameters, substitution, and
//! the hammer pool that drives them.
mod params;
mod pool;
mod store;
mod substitute;
mod worker;


pub use params::{Placeholders, RunParameters, generate_parameters};
pub use pool::{PoolSettings, WorkerPool};
pub use store::{
    MAX_REQUEST_LINES, RequestTemplate, TemplateStore, load_template_store, parse_request_log,
};
pub use substitute::{SubstitutedRequest, compose_url, replace_literals, substitute};
pub use worker::{WorkerContext, WorkerExit, run_worker};
