use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Failed to build HTTP client: {source}")]
    BuildClientFailed {
        #[source]
        source: reqwest::Error,
    },
    #[error("Host probe to '{url}' failed: {source}")]
    ProbeFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} {url} failed: {message}")]
    Transport {
        method: String,
        url: String,
        message: String,
    },
    #[error("Worker channel closed after {received} of {expected} results.")]
    ResultsIncomplete { received: usize, expected: usize },
}
