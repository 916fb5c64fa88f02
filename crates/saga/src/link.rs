//! Rewrites internally addressed document links into publicly reachable ones.

use url::Url;

use crate::config::LinkSettings;

/// Re-bases links that point at an internal host onto a public base address.
///
/// Normalization is best-effort: it never fails, and anything it does not
/// understand is passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkNormalizer {
    internal_host: String,
    public_base_url: String,
}

impl LinkNormalizer {
    /// Creates a normalizer for the given internal host marker and public base.
    pub fn new(internal_host: impl Into<String>, public_base_url: impl Into<String>) -> Self {
        Self {
            internal_host: internal_host.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Creates a normalizer from link settings.
    pub fn from_settings(settings: &LinkSettings) -> Self {
        Self::new(&settings.internal_host, &settings.public_base_url)
    }

    /// Normalizes a locator.
    ///
    /// - absent or blank input yields `None`
    /// - input without the internal host marker is returned unchanged
    /// - input with the marker is re-based onto the public base, keeping its path
    /// - input with the marker that fails to parse is returned unchanged
    pub fn normalize(&self, locator: Option<&str>) -> Option<String> {
        let locator = locator.map(str::trim).filter(|l| !l.is_empty())?;

        if self.internal_host.is_empty() || !locator.contains(&self.internal_host) {
            return Some(locator.to_string());
        }

        match Url::parse(locator) {
            Ok(url) if url.has_host() => {
                let public = format!("{}{}", self.public_base_url, url.path());
                tracing::debug!(internal = %locator, %public, "rewrote document link");
                Some(public)
            }
            Ok(_) => {
                tracing::warn!(%locator, "document link has no host, keeping it");
                Some(locator.to_string())
            }
            Err(e) => {
                tracing::warn!(%locator, error = %e, "could not parse document link, keeping it");
                Some(locator.to_string())
            }
        }
    }
}
