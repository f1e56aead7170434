//! License API response types.
//!
//! A lookup returns `{"count": N, "results": [...]}`; `count == 0` means the
//! key is unknown to the server.

use crate::model::{Diagnostic, License};
use serde::Deserialize;

/// License lookup response.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LicenseApiResponse {
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub results: Vec<LicenseApiRecord>,
}

/// One license record returned by the API.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LicenseApiRecord {
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub full_text: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Map a lookup response for `key` to a license entry.
///
/// An empty result set is reported as an invalid key. A license the server
/// marks inactive is still returned, with an ERROR.
pub fn license_from_response(
    key: &str,
    response: LicenseApiResponse,
    url_base: &str,
) -> (Option<License>, Vec<Diagnostic>) {
    let Some(record) = response.results.into_iter().next().filter(|_| response.count > 0)
    else {
        return (
            None,
            vec![Diagnostic::error(format!("Invalid license key: {key}"))],
        );
    };

    let mut diagnostics = Vec::new();
    if record.is_active == Some(false) {
        diagnostics.push(Diagnostic::error(format!(
            "License key is NOT active: {key}"
        )));
    }

    let mut license = License::new(key, url_base);
    license.name = record.name.filter(|n| !n.is_empty());
    license.text = record
        .full_text
        .filter(|t| !t.is_empty())
        .or(record.text.filter(|t| !t.is_empty()));
    (Some(license), diagnostics)
}
