//! DejaCode license API HTTP client.

use super::response::{license_from_response, LicenseApiResponse};
use super::{api_url_base, LicenseProvider};
use crate::error::{AboutError, LicenseApiErrorKind, Result};
use crate::model::{Diagnostic, License};
use indexmap::IndexMap;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::time::Duration;

pub(crate) const NETWORK_PROBLEM: &str =
    "Network problem. Please check your Internet connection. License retrieval is skipped.";
const INVALID_API_URL: &str = "URL not reachable. Invalid API URL. License retrieval is skipped.";
const AUTHORIZATION_DENIED: &str =
    "Authorization denied. Invalid API key. License retrieval is skipped.";

/// License API client configuration.
#[derive(Debug, Clone)]
pub struct DejaCodeConfig {
    /// License API endpoint, e.g. `https://enterprise.dejacode.com/api/v2/licenses/`
    pub api_url: String,
    pub api_key: String,
    /// Request timeout
    pub timeout: Duration,
}

impl DejaCodeConfig {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(30),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP client for the DejaCode license API.
pub struct DejaCodeClient {
    client: Client,
    config: DejaCodeConfig,
    url_base: String,
}

/// Helper to convert reqwest errors to license API errors
fn network_error(msg: &str, err: &reqwest::Error) -> AboutError {
    AboutError::license_api(msg, LicenseApiErrorKind::NetworkError(err.to_string()))
}

enum Probe {
    Reachable,
    Unreachable(Diagnostic),
}

enum Lookup {
    Found(Option<License>, Vec<Diagnostic>),
    Denied,
    Failed(Diagnostic),
}

impl DejaCodeClient {
    /// Create a new client.
    pub fn new(config: DejaCodeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| network_error("Failed to create HTTP client", &e))?;

        let url_base = api_url_base(&config.api_url);
        Ok(Self {
            client,
            config,
            url_base,
        })
    }

    /// Base URL used for license display URLs
    pub fn url_base(&self) -> &str {
        &self.url_base
    }

    /// Check that the endpoint is reachable and looks like the license API.
    ///
    /// An unauthenticated request is expected to be refused with 401 or 403.
    fn probe(&self) -> Probe {
        match self.client.get(&self.config.api_url).send() {
            Err(e) => {
                tracing::debug!("License API probe failed: {}", e);
                Probe::Unreachable(Diagnostic::error(NETWORK_PROBLEM))
            }
            Ok(response) => {
                let status = response.status();
                if status.is_success()
                    || status == StatusCode::UNAUTHORIZED
                    || status == StatusCode::FORBIDDEN
                {
                    Probe::Reachable
                } else {
                    tracing::debug!("License API probe returned status {}", status.as_u16());
                    Probe::Unreachable(Diagnostic::error(INVALID_API_URL))
                }
            }
        }
    }

    /// Look up one license key.
    fn lookup(&self, key: &str) -> Lookup {
        let url = format!("{}/", self.config.api_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Token {}", self.config.api_key))
            .query(&[
                ("api_key", self.config.api_key.as_str()),
                ("key", key),
                ("format", "json"),
            ])
            .send();

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("License lookup for {} failed: {}", key, e);
                return Lookup::Failed(Diagnostic::error(NETWORK_PROBLEM));
            }
        };

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            return Lookup::Denied;
        }
        if !status.is_success() {
            return Lookup::Found(
                None,
                vec![Diagnostic::error(format!("Invalid license key: {key}"))],
            );
        }

        match response.json::<LicenseApiResponse>() {
            Ok(body) => {
                let (license, diagnostics) = license_from_response(key, body, &self.url_base);
                Lookup::Found(license, diagnostics)
            }
            Err(e) => Lookup::Found(
                None,
                vec![Diagnostic::error(format!(
                    "Invalid license API response for key {key}: {e}"
                ))],
            ),
        }
    }
}

impl LicenseProvider for DejaCodeClient {
    fn fetch_licenses(&self, keys: &[String]) -> (IndexMap<String, License>, Vec<Diagnostic>) {
        let mut licenses = IndexMap::new();
        if keys.is_empty() {
            return (licenses, Vec::new());
        }

        if let Probe::Unreachable(diagnostic) = self.probe() {
            return (licenses, vec![diagnostic]);
        }

        let mut diagnostics = Vec::new();
        for key in unique_keys(keys) {
            match self.lookup(key) {
                Lookup::Found(license, errors) => {
                    diagnostics.extend(errors);
                    if let Some(license) = license {
                        tracing::debug!("Fetched license: {}", key);
                        licenses.insert(key.to_string(), license);
                    }
                }
                Lookup::Denied => {
                    diagnostics.push(Diagnostic::error(AUTHORIZATION_DENIED));
                    break;
                }
                Lookup::Failed(diagnostic) => {
                    diagnostics.push(diagnostic);
                    break;
                }
            }
        }

        (licenses, diagnostics)
    }

    fn name(&self) -> &'static str {
        "DejaCode"
    }
}

fn unique_keys(keys: &[String]) -> Vec<&str> {
    let mut seen = std::collections::HashSet::new();
    keys.iter()
        .map(String::as_str)
        .filter(|k| seen.insert(*k))
        .collect()
}
