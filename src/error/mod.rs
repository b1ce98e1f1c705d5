mod app;
mod auth;
mod config;
mod http;
mod template;
mod validation;

pub use app::{AppError, AppResult};
pub use auth::AuthError;
pub use config::ConfigError;
pub use http::HttpError;
pub use template::TemplateError;
pub use validation::ValidationError;
