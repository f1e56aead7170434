//! License resolution.
//!
//! The generator resolves license keys first from a reference library on disk
//! and then, for the keys still missing, from a [`LicenseProvider`]. The
//! provider is a capability: the HTTP client for the DejaCode API is one
//! implementation, [`NoOpProvider`] is used when fetching is disabled, and
//! [`StaticProvider`] serves a fixed set of licenses.
//!
//! The HTTP client requires the `license-api` feature (enabled by default).

#[cfg(feature = "license-api")]
mod client;
mod response;

#[cfg(feature = "license-api")]
pub use client::{DejaCodeClient, DejaCodeConfig};
pub use response::{license_from_response, LicenseApiRecord, LicenseApiResponse};

use crate::model::{Diagnostic, License, DEFAULT_LICENSE_URL_BASE};
use indexmap::IndexMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A source of license data.
///
/// ```ignore
/// use about_tools::license::{LicenseProvider, NoOpProvider, DejaCodeClient, DejaCodeConfig};
///
/// let provider: Box<dyn LicenseProvider> = if fetch {
///     Box::new(DejaCodeClient::new(DejaCodeConfig::new(api_url, api_key))?)
/// } else {
///     Box::new(NoOpProvider)
/// };
/// let (licenses, errors) = provider.fetch_licenses(&keys);
/// ```
pub trait LicenseProvider: Send + Sync {
    /// Fetch license data for `keys`.
    ///
    /// Each distinct key is requested at most once, in first-seen order.
    /// Unknown keys are reported as ERROR and never abort the batch.
    fn fetch_licenses(&self, keys: &[String]) -> (IndexMap<String, License>, Vec<Diagnostic>);

    /// Get the name of this provider.
    fn name(&self) -> &'static str;
}

/// A provider that never returns any license.
///
/// Used when license fetching is disabled: missing licenses are then reported
/// by the generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpProvider;

impl LicenseProvider for NoOpProvider {
    fn fetch_licenses(&self, _keys: &[String]) -> (IndexMap<String, License>, Vec<Diagnostic>) {
        (IndexMap::new(), Vec::new())
    }

    fn name(&self) -> &'static str {
        "NoOp"
    }
}

/// A provider serving a fixed set of licenses, counting every key requested.
#[derive(Debug, Default)]
pub struct StaticProvider {
    licenses: IndexMap<String, License>,
    requested: AtomicUsize,
}

impl StaticProvider {
    pub fn new(licenses: impl IntoIterator<Item = License>) -> Self {
        Self {
            licenses: licenses
                .into_iter()
                .map(|license| (license.key.clone(), license))
                .collect(),
            requested: AtomicUsize::new(0),
        }
    }

    /// Number of keys requested so far
    pub fn requested(&self) -> usize {
        self.requested.load(Ordering::Relaxed)
    }
}

impl LicenseProvider for StaticProvider {
    fn fetch_licenses(&self, keys: &[String]) -> (IndexMap<String, License>, Vec<Diagnostic>) {
        let mut found = IndexMap::new();
        let mut diagnostics = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for key in keys {
            if !seen.insert(key) {
                continue;
            }
            self.requested.fetch_add(1, Ordering::Relaxed);
            match self.licenses.get(key) {
                Some(license) => {
                    found.insert(key.clone(), license.clone());
                }
                None => diagnostics.push(Diagnostic::error(format!("Invalid license key: {key}"))),
            }
        }
        (found, diagnostics)
    }

    fn name(&self) -> &'static str {
        "Static"
    }
}

/// `scheme://host[:port]` of an API URL, used to build license URLs.
///
/// Falls back to the default DejaCode base when the URL has no scheme.
pub fn api_url_base(api_url: &str) -> String {
    let Some((scheme, rest)) = api_url.trim().split_once("://") else {
        return DEFAULT_LICENSE_URL_BASE.to_string();
    };
    let authority = rest.split(&['/', '?', '#'][..]).next().unwrap_or_default();
    if scheme.is_empty() || authority.is_empty() {
        return DEFAULT_LICENSE_URL_BASE.to_string();
    }
    format!("{scheme}://{authority}")
}

/// Fetch licenses for `keys` from the license API at `api_url`.
///
/// An unreachable endpoint yields no data and a single ERROR.
#[cfg(feature = "license-api")]
pub fn fetch_licenses(
    keys: &[String],
    api_url: &str,
    api_key: &str,
) -> (IndexMap<String, License>, Vec<Diagnostic>) {
    match DejaCodeClient::new(DejaCodeConfig::new(api_url, api_key)) {
        Ok(client) => client.fetch_licenses(keys),
        Err(e) => {
            tracing::warn!("Failed to create license API client: {}", e);
            (
                IndexMap::new(),
                vec![Diagnostic::error(client::NETWORK_PROBLEM)],
            )
        }
    }
}
