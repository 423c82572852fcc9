//! # Enricher Configuration Module
//!
//! Configuration for the playlist enricher.
//!
//! ## Overview
//!
//! The configuration uses a builder to construct an [`EnricherConfig`] holding
//! the metadata provider settings and feature flags. Validation is fail-fast:
//! a missing provider credential is reported before any playlist is touched.
//!
//! ## Usage
//!
//! ### From the environment
//!
//! ```ignore
//! use core_runtime::config::EnricherConfig;
//!
//! // Reads TMDB_API_KEY (required), TMDB_SEARCH_LANGUAGE, TMDB_DISPLAY_LANGUAGE
//! let config = EnricherConfig::from_env()?;
//! ```
//!
//! ### Explicit
//!
//! ```ignore
//! use core_runtime::config::{EnricherConfig, MetadataApiConfig};
//!
//! let config = EnricherConfig::builder()
//!     .metadata_api_config(MetadataApiConfig::new("api-key").with_display_locale("fr-FR"))
//!     .enable_title_variants(true)
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use crate::logging::redact_if_sensitive;
use std::time::Duration;

/// Environment variable holding the TMDB credential (v3 API key or v4 read token).
pub const ENV_TMDB_API_KEY: &str = "TMDB_API_KEY";
/// Environment variable overriding the locale used to search and for canonical titles.
pub const ENV_TMDB_SEARCH_LANGUAGE: &str = "TMDB_SEARCH_LANGUAGE";
/// Environment variable overriding the locale used for genres and artwork.
pub const ENV_TMDB_DISPLAY_LANGUAGE: &str = "TMDB_DISPLAY_LANGUAGE";

pub const DEFAULT_API_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
pub const DEFAULT_SEARCH_LOCALE: &str = "en-US";
pub const DEFAULT_DISPLAY_LOCALE: &str = "es-ES";

/// Top-level configuration for the enricher.
#[derive(Clone, PartialEq, Eq)]
pub struct EnricherConfig {
    /// External metadata API configuration (TMDB)
    pub metadata_api_config: MetadataApiConfig,

    /// Feature flags
    pub features: FeatureFlags,
}

impl std::fmt::Debug for EnricherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnricherConfig")
            .field("metadata_api_config", &self.metadata_api_config)
            .field("features", &self.features)
            .finish()
    }
}

/// Feature flags control optional behaviour of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatureFlags {
    /// Retry failed lookups with spelling variants of the title
    /// ("and" / "&", space before a glued trailing year).
    pub enable_title_variants: bool,
}

/// Configuration for the external movie metadata API.
///
/// # Security Note
///
/// The API key is never printed by the `Debug` implementation. Load it from
/// the environment rather than hardcoding it.
#[derive(Clone, PartialEq, Eq)]
pub struct MetadataApiConfig {
    /// TMDB credential. A v3 API key is sent as the `api_key` query parameter,
    /// a v4 read access token (JWT) as a bearer token.
    pub api_key: String,

    /// API root, e.g. `https://api.themoviedb.org/3`
    pub api_base_url: String,

    /// Prefix prepended to poster paths to build artwork URLs
    pub image_base_url: String,

    /// Locale used for searching and for the canonical (non-localized) title
    pub search_locale: String,

    /// Locale used for the category label and the artwork
    pub display_locale: String,

    /// Minimum delay between two provider requests
    pub rate_limit_delay_ms: u64,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Attempts per HTTP request. 1 disables transport-level retries.
    pub max_attempts: u32,
}

impl std::fmt::Debug for MetadataApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataApiConfig")
            .field("api_key", &redact_if_sensitive("api_key", &self.api_key))
            .field("api_base_url", &self.api_base_url)
            .field("image_base_url", &self.image_base_url)
            .field("search_locale", &self.search_locale)
            .field("display_locale", &self.display_locale)
            .field("rate_limit_delay_ms", &self.rate_limit_delay_ms)
            .field("request_timeout", &self.request_timeout)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

impl MetadataApiConfig {
    /// Creates a configuration with the given credential and default endpoints.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            search_locale: DEFAULT_SEARCH_LOCALE.to_string(),
            display_locale: DEFAULT_DISPLAY_LOCALE.to_string(),
            rate_limit_delay_ms: 250,
            request_timeout: Duration::from_secs(15),
            max_attempts: 1,
        }
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_image_base_url(mut self, url: impl Into<String>) -> Self {
        self.image_base_url = url.into();
        self
    }

    pub fn with_search_locale(mut self, locale: impl Into<String>) -> Self {
        self.search_locale = locale.into();
        self
    }

    pub fn with_display_locale(mut self, locale: impl Into<String>) -> Self {
        self.display_locale = locale.into();
        self
    }

    /// Sets the rate limit delay in milliseconds
    pub fn with_rate_limit_delay_ms(mut self, delay_ms: u64) -> Self {
        self.rate_limit_delay_ms = delay_ms;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// True when the credential is a v4 read access token rather than a v3 key.
    pub fn uses_bearer_token(&self) -> bool {
        self.api_key.starts_with("eyJ")
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(api_key_missing_error());
        }

        for (name, url) in [
            ("API base URL", &self.api_base_url),
            ("image base URL", &self.image_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::Config(format!(
                    "TMDB {} must be an http(s) URL, got '{}'",
                    name, url
                )));
            }
        }

        if self.search_locale.trim().is_empty() || self.display_locale.trim().is_empty() {
            return Err(Error::Config("TMDB locales cannot be empty".to_string()));
        }

        if self.rate_limit_delay_ms > 60_000 {
            return Err(Error::Config(
                "Rate limit delay exceeds maximum of 60 seconds (60,000ms)".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "Request timeout must be greater than zero".to_string(),
            ));
        }

        if self.max_attempts == 0 {
            return Err(Error::Config(
                "HTTP attempts must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

impl EnricherConfig {
    /// Creates a new builder for constructing an `EnricherConfig`.
    pub fn builder() -> EnricherConfigBuilder {
        EnricherConfigBuilder::default()
    }

    /// Builds the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityMissing`] when `TMDB_API_KEY` is unset or empty.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(ENV_TMDB_API_KEY)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(api_key_missing_error)?;

        let mut api_config = MetadataApiConfig::new(api_key);
        if let Some(locale) = lookup(ENV_TMDB_SEARCH_LANGUAGE).filter(|v| !v.trim().is_empty()) {
            api_config = api_config.with_search_locale(locale.trim());
        }
        if let Some(locale) = lookup(ENV_TMDB_DISPLAY_LANGUAGE).filter(|v| !v.trim().is_empty())
        {
            api_config = api_config.with_display_locale(locale.trim());
        }

        Self::builder().metadata_api_config(api_config).build()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        self.metadata_api_config.validate()
    }
}

fn api_key_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "TMDB credential".to_string(),
        message: format!(
            "{} is not set. Export a TMDB v3 API key or v4 read access token before running.",
            ENV_TMDB_API_KEY
        ),
    }
}

/// Builder for [`EnricherConfig`].
#[derive(Default)]
pub struct EnricherConfigBuilder {
    metadata_api_config: Option<MetadataApiConfig>,
    features: FeatureFlags,
}

impl EnricherConfigBuilder {
    /// Sets the metadata API configuration (required).
    pub fn metadata_api_config(mut self, config: MetadataApiConfig) -> Self {
        self.metadata_api_config = Some(config);
        self
    }

    /// Enables or disables title-variant retries on lookup misses.
    pub fn enable_title_variants(mut self, enabled: bool) -> Self {
        self.features.enable_title_variants = enabled;
        self
    }

    /// Replaces all feature flags at once.
    pub fn features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }

    /// Builds the final `EnricherConfig` instance.
    ///
    /// # Errors
    ///
    /// - [`Error::CapabilityMissing`] when no provider credential was supplied
    /// - [`Error::Config`] when a value is out of range
    pub fn build(self) -> Result<EnricherConfig> {
        let metadata_api_config = self
            .metadata_api_config
            .ok_or_else(api_key_missing_error)?;

        let config = EnricherConfig {
            metadata_api_config,
            features: self.features,
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_builder_requires_api_config() {
        let err = EnricherConfig::builder().build().unwrap_err();
        assert!(matches!(err, Error::CapabilityMissing { .. }));
    }

    #[test]
    fn test_builder_with_defaults() {
        let config = EnricherConfig::builder()
            .metadata_api_config(MetadataApiConfig::new("abc123"))
            .build()
            .unwrap();

        let api = &config.metadata_api_config;
        assert_eq!(api.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(api.image_base_url, DEFAULT_IMAGE_BASE_URL);
        assert_eq!(api.search_locale, "en-US");
        assert_eq!(api.display_locale, "es-ES");
        assert_eq!(api.max_attempts, 1);
        assert!(!config.features.enable_title_variants);
    }

    #[test]
    fn test_validate_rejects_blank_key() {
        let err = EnricherConfig::builder()
            .metadata_api_config(MetadataApiConfig::new("   "))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::CapabilityMissing { .. }));
    }

    #[test]
    fn test_validate_rejects_bad_urls_and_ranges() {
        let bad_url = MetadataApiConfig::new("k").with_api_base_url("ftp://example.com");
        assert!(matches!(bad_url.validate(), Err(Error::Config(_))));

        let slow = MetadataApiConfig::new("k").with_rate_limit_delay_ms(120_000);
        assert!(matches!(slow.validate(), Err(Error::Config(_))));

        let no_attempts = MetadataApiConfig::new("k").with_max_attempts(0);
        assert!(matches!(no_attempts.validate(), Err(Error::Config(_))));

        let no_timeout = MetadataApiConfig::new("k").with_request_timeout(Duration::ZERO);
        assert!(matches!(no_timeout.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_from_lookup_missing_key_is_fatal() {
        let err = EnricherConfig::from_lookup(lookup_from(&[])).unwrap_err();
        match err {
            Error::CapabilityMissing { message, .. } => assert!(message.contains("TMDB_API_KEY")),
            other => panic!("unexpected error: {other:?}"),
        }

        let err = EnricherConfig::from_lookup(lookup_from(&[("TMDB_API_KEY", "")])).unwrap_err();
        assert!(matches!(err, Error::CapabilityMissing { .. }));
    }

    #[test]
    fn test_from_lookup_reads_locales() {
        let config = EnricherConfig::from_lookup(lookup_from(&[
            ("TMDB_API_KEY", " key-1 "),
            ("TMDB_DISPLAY_LANGUAGE", "fr-FR"),
            ("TMDB_SEARCH_LANGUAGE", ""),
        ]))
        .unwrap();

        assert_eq!(config.metadata_api_config.api_key, "key-1");
        assert_eq!(config.metadata_api_config.display_locale, "fr-FR");
        assert_eq!(config.metadata_api_config.search_locale, "en-US");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = EnricherConfig::builder()
            .metadata_api_config(MetadataApiConfig::new("super-secret-key"))
            .build()
            .unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret-key"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_bearer_token_detection() {
        assert!(MetadataApiConfig::new("eyJhbGciOiJIUzI1NiJ9.payload").uses_bearer_token());
        assert!(!MetadataApiConfig::new("0123456789abcdef").uses_bearer_token());
    }

    #[test]
    fn test_builder_feature_flags() {
        let config = EnricherConfig::builder()
            .metadata_api_config(MetadataApiConfig::new("k"))
            .enable_title_variants(true)
            .build()
            .unwrap();
        assert!(config.features.enable_title_variants);

        let config = EnricherConfig::builder()
            .metadata_api_config(MetadataApiConfig::new("k"))
            .features(FeatureFlags::default())
            .build()
            .unwrap();
        assert_eq!(config.features, FeatureFlags::default());
    }
}
