use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use reqwest::Method;
use serde::Deserialize;
use serde_json::value::RawValue;
use tracing::debug;

use crate::error::{AppError, AppResult, ConfigError, TemplateError};

/// Upper bound on request records accepted from one log.
pub const MAX_REQUEST_LINES: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTemplate {
    pub method: Method,
    /// Path and query, relative to the configured host.
    pub url: String,
    pub body: Vec<u8>,
}

#[derive(Deserialize)]
struct RequestRecord {
    #[serde(alias = "Method")]
    method: String,
    #[serde(alias = "Url", alias = "URL")]
    url: String,
    #[serde(alias = "Body", default)]
    body: Option<Box<RawValue>>,
}

/// Ordered, read-only request templates shared by every hammer.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    templates: Arc<[RequestTemplate]>,
}

impl TemplateStore {
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyTemplateStore`] when `templates` is empty.
    pub fn new(templates: Vec<RequestTemplate>) -> Result<Self, ConfigError> {
        if templates.is_empty() {
            return Err(ConfigError::EmptyTemplateStore);
        }
        Ok(Self {
            templates: templates.into(),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&RequestTemplate> {
        self.templates.get(index)
    }
}

/// Parses a request log: one JSON object per line, blank lines skipped.
///
/// # Errors
///
/// Returns an error when a line cannot be read or parsed, when a method is
/// not a valid HTTP token, or when the log holds more than
/// [`MAX_REQUEST_LINES`] records.
pub fn parse_request_log<R: BufRead>(reader: R) -> Result<Vec<RequestTemplate>, TemplateError> {
    let mut templates = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line_no = index.saturating_add(1);
        let line = line.map_err(|err| TemplateError::ReadLog {
            path: "<stream>".into(),
            source: err,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if templates.len() >= MAX_REQUEST_LINES {
            return Err(TemplateError::TooManyLines {
                max: MAX_REQUEST_LINES,
            });
        }

        let record: RequestRecord =
            serde_json::from_str(trimmed).map_err(|err| TemplateError::InvalidRecord {
                line: line_no,
                source: err,
            })?;
        let upper = record.method.trim().to_ascii_uppercase();
        let method =
            Method::from_bytes(upper.as_bytes()).map_err(|_invalid| TemplateError::InvalidMethod {
                line: line_no,
                method: record.method.clone(),
            })?;
        let body = record
            .body
            .map(|raw| raw.get().as_bytes().to_vec())
            .unwrap_or_default();

        templates.push(RequestTemplate {
            method,
            url: record.url,
            body,
        });
    }
    Ok(templates)
}

/// Reads and parses the request log at `path` into a [`TemplateStore`].
///
/// # Errors
///
/// Returns an error when the file cannot be opened, fails to parse, or holds
/// no requests.
pub fn load_template_store(path: &Path) -> AppResult<TemplateStore> {
    let file = std::fs::File::open(path).map_err(|err| {
        AppError::template(TemplateError::ReadLog {
            path: path.to_path_buf(),
            source: err,
        })
    })?;
    let templates = parse_request_log(std::io::BufReader::new(file)).map_err(|err| match err {
        TemplateError::ReadLog { source, .. } => TemplateError::ReadLog {
            path: path.to_path_buf(),
            source,
        },
        TemplateError::TooManyLines { .. }
        | TemplateError::InvalidRecord { .. }
        | TemplateError::InvalidMethod { .. } => err,
    })?;
    debug!("Parsed {} requests from {}", templates.len(), path.display());
    Ok(TemplateStore::new(templates)?)
}
