use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to read request log '{path}': {source}")]
    ReadLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Request log exceeded max of {max} lines.")]
    TooManyLines { max: usize },
    #[error("Line {line}: invalid request record: {source}")]
    InvalidRecord {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("Line {line}: invalid HTTP method '{method}'.")]
    InvalidMethod { line: usize, method: String },
}
