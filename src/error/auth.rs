use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Sign-in request to '{url}' failed: {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Sign-in rejected with status {status}.")]
    Rejected { status: u16 },
    #[error("Malformed session payload: {source}")]
    MalformedSession {
        #[source]
        source: serde_json::Error,
    },
    #[error("Session payload is missing '{field}'.")]
    MissingSessionField { field: &'static str },
}
