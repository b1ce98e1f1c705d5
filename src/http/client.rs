use reqwest::Client;

use crate::error::{AppError, AppResult, HttpError};

/// Builds the client shared by every hammer.
///
/// Certificate and hostname checks are disabled so targets with
/// self-signed certificates can be tested, and responses are not
/// decompressed so byte counts reflect the wire.
///
/// # Errors
///
/// Returns an error when the TLS backend cannot be initialized.
pub fn build_client() -> AppResult<Client> {
    let client_builder = Client::builder()
        .danger_accept_invalid_certs(true)
        .danger_accept_invalid_hostnames(true)
        .no_gzip()
        .no_brotli()
        .no_deflate();

    client_builder
        .build()
        .map_err(|err| AppError::http(HttpError::BuildClientFailed { source: err }))
}
