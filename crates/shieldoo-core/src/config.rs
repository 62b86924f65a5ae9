//! Provider configuration.
//!
//! The host runtime hands over optional `endpoint` and `apikey` values. Both
//! fall back to the `SHIELDOO_ENDPOINT` and `SHIELDOO_API_KEY` environment
//! variables; explicit values take precedence. Both are required once
//! fallbacks are applied.

use crate::attributes::MappingPolicy;
use crate::Error;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Environment variable consulted when no endpoint is configured.
pub const ENDPOINT_ENV: &str = "SHIELDOO_ENDPOINT";

/// Environment variable consulted when no API key is configured.
pub const API_KEY_ENV: &str = "SHIELDOO_API_KEY";

/// Environment variable enabling the canned-response test transport.
pub const TEST_MODE_ENV: &str = "SHIELDOO_TEST_MODE";

/// Default request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Raw provider block as supplied by the host runtime.
///
/// Every field is optional; [`ProviderConfig::resolve`] applies environment
/// fallbacks and validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderSettings {
    /// Shieldoo API endpoint
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Shieldoo API key
    #[serde(default)]
    pub apikey: Option<String>,

    /// Answer every call from the canned test transport
    #[serde(default)]
    pub test_mode: Option<bool>,

    /// Request timeout in seconds
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Fail on malformed nested configuration elements instead of skipping them
    #[serde(default)]
    pub strict_mapping: Option<bool>,
}

/// Validated provider configuration.
#[derive(Debug, Clone, Validate)]
pub struct ProviderConfig {
    /// Base URL of the Shieldoo instance
    #[validate(url)]
    pub endpoint: String,

    /// API key used as the token signing secret
    pub api_key: SecretString,

    /// Whether calls are answered by the canned test transport
    pub test_mode: bool,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    pub request_timeout_secs: u64,

    /// How malformed nested configuration elements are handled
    pub mapping: MappingPolicy,
}

impl ProviderConfig {
    /// Create a configuration from an endpoint and API key.
    ///
    /// # Errors
    ///
    /// Returns an error if either value is empty or the endpoint is not a URL.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self, Error> {
        let endpoint = endpoint.into();
        let api_key = api_key.into();
        require("endpoint", &endpoint)?;
        require("apikey", &api_key)?;

        let config = Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: SecretString::from(api_key),
            test_mode: false,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            mapping: MappingPolicy::default(),
        };
        config.check()?;
        Ok(config)
    }

    /// Resolve host settings against the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] when the endpoint or API key is missing
    /// or when a value fails validation.
    pub fn resolve(settings: &ProviderSettings) -> Result<Self, Error> {
        Self::resolve_with_env(settings, |key| std::env::var(key).ok())
    }

    /// Resolve host settings using a custom environment lookup.
    ///
    /// # Errors
    ///
    /// See [`ProviderConfig::resolve`].
    pub fn resolve_with_env<F>(settings: &ProviderSettings, env: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = pick(settings.endpoint.as_deref(), env(ENDPOINT_ENV));
        let api_key = pick(settings.apikey.as_deref(), env(API_KEY_ENV));

        let test_mode = settings
            .test_mode
            .unwrap_or_else(|| env(TEST_MODE_ENV).is_some_and(|value| is_truthy(&value)));

        let mapping = if settings.strict_mapping.unwrap_or(false) {
            MappingPolicy::Strict
        } else {
            MappingPolicy::Lenient
        };

        let mut config = Self::new(endpoint, api_key)?
            .with_test_mode(test_mode)
            .with_mapping(mapping);
        if let Some(timeout) = settings.request_timeout_secs {
            config = config.with_timeout(timeout);
        }
        config.check()?;
        Ok(config)
    }

    /// Enable or disable the canned test transport.
    #[must_use]
    pub const fn with_test_mode(mut self, enabled: bool) -> Self {
        self.test_mode = enabled;
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Set the nested element mapping policy.
    #[must_use]
    pub const fn with_mapping(mut self, mapping: MappingPolicy) -> Self {
        self.mapping = mapping;
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Borrow the API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Parse the endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn parse_endpoint(&self) -> Result<Url, Error> {
        Url::parse(&self.endpoint)
            .map_err(|e| Error::ConfigError(format!("Invalid endpoint URL: {e}")))
    }

    fn check(&self) -> Result<(), Error> {
        self.validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))
    }
}

fn pick(explicit: Option<&str>, fallback: Option<String>) -> String {
    match explicit {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => fallback.unwrap_or_default(),
    }
}

fn require(field: &str, value: &str) -> Result<(), Error> {
    if value.is_empty() {
        return Err(Error::ConfigError(format!(
            "{field} is required: set it in the provider configuration block"
        )));
    }
    Ok(())
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn explicit_values_win_over_environment() {
        let settings = ProviderSettings {
            endpoint: Some("https://explicit.shieldoo.net".to_string()),
            apikey: Some("explicit-key".to_string()),
            ..ProviderSettings::default()
        };
        let env = env_of(&[
            (ENDPOINT_ENV, "https://env.shieldoo.net"),
            (API_KEY_ENV, "env-key"),
        ]);

        let config = ProviderConfig::resolve_with_env(&settings, env).unwrap();
        assert_eq!(config.endpoint, "https://explicit.shieldoo.net");
        assert_eq!(config.api_key(), "explicit-key");
    }

    #[test]
    fn environment_fills_missing_values() {
        let settings = ProviderSettings {
            endpoint: Some(String::new()),
            ..ProviderSettings::default()
        };
        let env = env_of(&[
            (ENDPOINT_ENV, "https://env.shieldoo.net/"),
            (API_KEY_ENV, "env-key"),
        ]);

        let config = ProviderConfig::resolve_with_env(&settings, env).unwrap();
        assert_eq!(config.endpoint, "https://env.shieldoo.net");
        assert_eq!(config.api_key(), "env-key");
        assert!(!config.test_mode);
        assert_eq!(config.mapping, MappingPolicy::Lenient);
    }

    #[test]
    fn missing_endpoint_is_a_config_error() {
        let settings = ProviderSettings {
            apikey: Some("key".to_string()),
            ..ProviderSettings::default()
        };
        let err = ProviderConfig::resolve_with_env(&settings, env_of(&[])).unwrap_err();
        assert!(matches!(err, Error::ConfigError(ref msg) if msg.contains("endpoint")));
    }

    #[test]
    fn missing_api_key_is_a_config_error() {
        let settings = ProviderSettings {
            endpoint: Some("https://a.shieldoo.net".to_string()),
            ..ProviderSettings::default()
        };
        let err = ProviderConfig::resolve_with_env(&settings, env_of(&[])).unwrap_err();
        assert!(matches!(err, Error::ConfigError(ref msg) if msg.contains("apikey")));
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let err = ProviderConfig::new("not a url", "key").unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_mode_and_strict_mapping_from_settings() {
        let settings = ProviderSettings {
            endpoint: Some("https://mockup".to_string()),
            apikey: Some("mockup".to_string()),
            strict_mapping: Some(true),
            request_timeout_secs: Some(5),
            ..ProviderSettings::default()
        };
        let env = env_of(&[(TEST_MODE_ENV, "true")]);

        let config = ProviderConfig::resolve_with_env(&settings, env).unwrap();
        assert!(config.test_mode);
        assert_eq!(config.mapping, MappingPolicy::Strict);
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_mode_env_accepts_one_and_true_only() {
        let settings = ProviderSettings {
            endpoint: Some("https://a.shieldoo.net".to_string()),
            apikey: Some("key".to_string()),
            ..ProviderSettings::default()
        };
        for (value, expected) in [("1", true), ("TRUE", true), ("yes", false), ("0", false)] {
            let config =
                ProviderConfig::resolve_with_env(&settings, env_of(&[(TEST_MODE_ENV, value)]))
                    .unwrap();
            assert_eq!(config.test_mode, expected, "{value:?}");
        }
    }

    #[test]
    fn parse_endpoint_keeps_path() {
        let config = ProviderConfig::new("https://a.shieldoo.net/tenant/", "key").unwrap();
        assert_eq!(
            config.parse_endpoint().unwrap().as_str(),
            "https://a.shieldoo.net/tenant"
        );
    }

    #[test]
    fn timeout_out_of_range_is_rejected() {
        let settings = ProviderSettings {
            endpoint: Some("https://a.shieldoo.net".to_string()),
            apikey: Some("key".to_string()),
            request_timeout_secs: Some(0),
            ..ProviderSettings::default()
        };
        let err = ProviderConfig::resolve_with_env(&settings, env_of(&[])).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn api_key_is_redacted_in_debug_output() {
        let config = ProviderConfig::new("https://a.shieldoo.net", "super-secret").unwrap();
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
