pub mod log_budget;
pub mod logger;
