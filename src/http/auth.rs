use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::SigninConfig;
use crate::error::{AppError, AppResult, AuthError, HttpError};

use super::CONTENT_TYPE_JSON;

pub const SIGNIN_PATH: &str = "/v1/auth/signin";

#[derive(Deserialize)]
struct SigninResponse {
    session: Option<Session>,
}

#[derive(Deserialize)]
struct Session {
    #[serde(rename = "_owner")]
    user_id: Option<String>,
    key: Option<String>,
}

/// Checks the host answers at all and logs its greeting.
///
/// # Errors
///
/// Returns an error when the request cannot be sent or the body cannot be
/// read.
pub async fn probe_host(client: &Client, host: &str) -> AppResult<()> {
    let probe_error = |err| {
        AppError::http(HttpError::ProbeFailed {
            url: host.to_owned(),
            source: err,
        })
    };
    let response = client.get(host).send().await.map_err(probe_error)?;
    let status = response.status().as_u16();
    let body = response.bytes().await.map_err(probe_error)?;

    info!("Host {} answered with status {}", host, status);
    match serde_json::from_slice::<serde_json::Value>(&body) {
        Ok(value) => debug!(
            "Host greeting:\n{}",
            serde_json::to_string_pretty(&value).unwrap_or_default()
        ),
        Err(_not_json) => debug!("Host greeting is not JSON ({} bytes)", body.len()),
    }
    Ok(())
}

/// Signs in once and returns the credential query string
/// `user=<id>&session=<key>` appended to every replayed request.
///
/// # Errors
///
/// Returns an error when the sign-in request fails, is rejected with a
/// non-200 status, or returns a malformed session.
pub async fn authenticate(client: &Client, host: &str, signin: &SigninConfig) -> AppResult<String> {
    let url = format!("{}{}", host, SIGNIN_PATH);
    info!("Signing in as {} at {}", signin.email, url);

    let request_error = |err| {
        AppError::auth(AuthError::RequestFailed {
            url: url.clone(),
            source: err,
        })
    };
    let body = serde_json::to_vec(signin)?;
    let response = client
        .post(&url)
        .header(CONTENT_TYPE, CONTENT_TYPE_JSON)
        .body(body)
        .send()
        .await
        .map_err(request_error)?;
    let status = response.status().as_u16();
    let payload = response.bytes().await.map_err(request_error)?;

    if status != 200 {
        return Err(AppError::auth(AuthError::Rejected { status }));
    }

    let credential = parse_session(&payload)?;
    debug!("Signed in with credential {}", credential);
    Ok(credential)
}

/// Extracts the credential query string from a sign-in response body.
///
/// # Errors
///
/// Returns an error when the body is not the expected session JSON.
pub fn parse_session(payload: &[u8]) -> Result<String, AuthError> {
    let parsed: SigninResponse = serde_json::from_slice(payload)
        .map_err(|err| AuthError::MalformedSession { source: err })?;
    let session = parsed
        .session
        .ok_or(AuthError::MissingSessionField { field: "session" })?;
    let user_id = session
        .user_id
        .filter(|value| !value.is_empty())
        .ok_or(AuthError::MissingSessionField { field: "_owner" })?;
    let key = session
        .key
        .filter(|value| !value.is_empty())
        .ok_or(AuthError::MissingSessionField { field: "key" })?;
    Ok(format!("user={}&session={}", user_id, key))
}
