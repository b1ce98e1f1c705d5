use serde::{Deserialize, Serialize};

use crate::args::{ErrorPolicy, OutputFormat};

/// On-disk configuration. Capitalized aliases accept config files written
/// for the older Go-style key names (`Host`, `Hammers`, ...).
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(alias = "Host")]
    pub host: Option<String>,
    #[serde(alias = "Signin")]
    pub signin: Option<SigninConfig>,
    #[serde(alias = "Seed")]
    pub seed: Option<String>,
    #[serde(alias = "Lat")]
    pub lat: Option<String>,
    #[serde(alias = "Lng")]
    pub lng: Option<String>,
    #[serde(alias = "Hammers")]
    pub hammers: Option<usize>,
    #[serde(alias = "Seconds")]
    pub seconds: Option<u64>,
    #[serde(alias = "RequestPath")]
    pub request_path: Option<String>,
    pub timeout_ms: Option<u64>,
    pub on_error: Option<ErrorPolicy>,
    pub stagger_ms: Option<u64>,
    pub log_level: Option<String>,
    pub log_errors_max: Option<u64>,
    pub output: Option<OutputFormat>,
}

/// Credentials posted once to the sign-in endpoint.
#[derive(Clone, Default, Deserialize, Serialize)]
pub struct SigninConfig {
    pub email: String,
    pub password: String,
    #[serde(rename = "installId", alias = "install_id", default)]
    pub install_id: String,
}

impl std::fmt::Debug for SigninConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigninConfig")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("install_id", &self.install_id)
            .finish()
    }
}
