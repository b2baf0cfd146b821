//! Client configuration.
//!
//! A `ClientConfig` is owned by one `Client` and never shared process-wide.
//! It can be assembled with builder methods, parsed from TOML, or read from
//! `CNSTRC_*` environment variables. Unknown keys in TOML are rejected.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

pub const DEFAULT_SERVICE_URL: &str = "https://ac.cnstrc.com";
pub const DEFAULT_QUIZZES_SERVICE_URL: &str = "https://quizzes.cnstrc.com";

/// Value of the `c` parameter unless `version` overrides it.
pub const CLIENT_IDENTIFIER: &str = concat!("cio-rs-", env!("CARGO_PKG_VERSION"));

fn default_service_url() -> String {
    DEFAULT_SERVICE_URL.to_string()
}

fn default_quizzes_service_url() -> String {
    DEFAULT_QUIZZES_SERVICE_URL.to_string()
}

fn default_true() -> bool {
    true
}

/// Fallbacks applied to calls that leave the matching field unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultOptions {
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub results_per_page: Option<u32>,
    /// Append the `_dt` timestamp to endpoints whose responses the service
    /// may otherwise serve from cache.
    #[serde(default = "default_true")]
    pub cache_busting: bool,
}

impl Default for DefaultOptions {
    fn default() -> Self {
        Self {
            section: None,
            results_per_page: None,
            cache_busting: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default)]
    pub security_token: Option<String>,
    #[serde(default = "default_service_url")]
    pub service_url: String,
    #[serde(default = "default_quizzes_service_url")]
    pub quizzes_service_url: String,
    /// Overrides the client identifier sent as `c`.
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub defaults: DefaultOptions,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::empty()
        }
    }

    /// Configuration authenticating with an API token only.
    pub fn with_token_only(api_token: impl Into<String>) -> Self {
        Self {
            api_token: Some(api_token.into()),
            ..Self::empty()
        }
    }

    fn empty() -> Self {
        Self {
            api_key: None,
            api_token: None,
            security_token: None,
            service_url: default_service_url(),
            quizzes_service_url: default_quizzes_service_url(),
            version: None,
            timeout_secs: None,
            defaults: DefaultOptions::default(),
        }
    }

    pub fn with_api_token(mut self, api_token: impl Into<String>) -> Self {
        self.api_token = Some(api_token.into());
        self
    }

    pub fn with_security_token(mut self, security_token: impl Into<String>) -> Self {
        self.security_token = Some(security_token.into());
        self
    }

    pub fn with_service_url(mut self, service_url: impl Into<String>) -> Self {
        self.service_url = service_url.into();
        self
    }

    pub fn with_quizzes_service_url(mut self, quizzes_service_url: impl Into<String>) -> Self {
        self.quizzes_service_url = quizzes_service_url.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    pub fn with_defaults(mut self, defaults: DefaultOptions) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: ClientConfig =
            toml::from_str(source).map_err(|err| Error::Configuration(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `CNSTRC_API_KEY`, `CNSTRC_API_TOKEN`, `CNSTRC_SECURITY_TOKEN`,
    /// `CNSTRC_SERVICE_URL`, `CNSTRC_QUIZZES_SERVICE_URL` and
    /// `CNSTRC_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|value| !value.is_empty());

        let mut config = Self::empty();
        config.api_key = var("CNSTRC_API_KEY");
        config.api_token = var("CNSTRC_API_TOKEN");
        config.security_token = var("CNSTRC_SECURITY_TOKEN");
        if let Some(service_url) = var("CNSTRC_SERVICE_URL") {
            config.service_url = service_url;
        }
        if let Some(quizzes_service_url) = var("CNSTRC_QUIZZES_SERVICE_URL") {
            config.quizzes_service_url = quizzes_service_url;
        }
        if let Some(timeout) = var("CNSTRC_TIMEOUT_SECS") {
            let timeout = timeout.parse().map_err(|_| {
                Error::Configuration(format!("CNSTRC_TIMEOUT_SECS is not a number: {timeout}"))
            })?;
            config.timeout_secs = Some(timeout);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if is_blank(&self.api_key) && is_blank(&self.api_token) {
            return Err(Error::Configuration(
                "an API key or an API token is required".to_string(),
            ));
        }
        validate_url("service_url", &self.service_url)?;
        validate_url("quizzes_service_url", &self.quizzes_service_url)?;
        Ok(())
    }

    pub fn client_identifier(&self) -> &str {
        self.version.as_deref().unwrap_or(CLIENT_IDENTIFIER)
    }

    pub(crate) fn service_base(&self) -> &str {
        self.service_url.trim_end_matches('/')
    }

    pub(crate) fn quizzes_base(&self) -> &str {
        self.quizzes_service_url.trim_end_matches('/')
    }

    /// Apply `update` on top of this configuration.
    pub fn merged(&self, update: ConfigUpdate) -> Result<Self> {
        let mut next = self.clone();
        if let Some(api_key) = update.api_key {
            next.api_key = api_key;
        }
        if let Some(api_token) = update.api_token {
            next.api_token = api_token;
        }
        if let Some(security_token) = update.security_token {
            next.security_token = security_token;
        }
        if let Some(service_url) = update.service_url {
            next.service_url = service_url;
        }
        if let Some(quizzes_service_url) = update.quizzes_service_url {
            next.quizzes_service_url = quizzes_service_url;
        }
        if let Some(version) = update.version {
            next.version = version;
        }
        if let Some(timeout_secs) = update.timeout_secs {
            next.timeout_secs = timeout_secs;
        }
        if let Some(defaults) = update.defaults {
            next.defaults = defaults;
        }
        next.validate()?;
        Ok(next)
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |value| value.trim().is_empty())
}

fn validate_url(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value)
        .map_err(|err| Error::Configuration(format!("{field} is not a valid URL ({err}): {value}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(Error::Configuration(format!(
            "{field} must use http or https, got {scheme}"
        ))),
    }
}

/// Explicit changes for `Client::set_options`.
///
/// `None` leaves a field alone. For optional fields, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigUpdate {
    pub api_key: Option<Option<String>>,
    pub api_token: Option<Option<String>>,
    pub security_token: Option<Option<String>>,
    pub service_url: Option<String>,
    pub quizzes_service_url: Option<String>,
    pub version: Option<Option<String>>,
    pub timeout_secs: Option<Option<u64>>,
    pub defaults: Option<DefaultOptions>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn credentials_are_required() {
        let config = ClientConfig {
            api_key: Some("  ".to_string()),
            ..ClientConfig::empty()
        };
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));

        assert!(ClientConfig::new("key").validate().is_ok());
        assert!(ClientConfig::with_token_only("tok").validate().is_ok());
    }

    #[test]
    fn service_url_must_be_http() {
        let config = ClientConfig::new("key").with_service_url("ftp://example.com");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http or https"));

        let config = ClientConfig::new("key").with_service_url("not a url");
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn toml_fills_defaults() {
        let config = ClientConfig::from_toml_str(
            r#"
            api_key = "key-1"
            timeout_secs = 5

            [defaults]
            section = "Search Suggestions"
            "#,
        )
        .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("key-1"));
        assert_eq!(config.service_url, DEFAULT_SERVICE_URL);
        assert_eq!(config.quizzes_service_url, DEFAULT_QUIZZES_SERVICE_URL);
        assert_eq!(config.timeout_secs, Some(5));
        assert_eq!(config.defaults.section.as_deref(), Some("Search Suggestions"));
        assert!(config.defaults.cache_busting);
    }

    #[test]
    fn toml_rejects_unknown_keys() {
        let err = ClientConfig::from_toml_str(
            r#"
            api_key = "key-1"
            requests = "custom"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Configuration(msg) if msg.contains("unknown field")));
    }

    #[test]
    fn env_configuration() {
        temp_env::with_vars(
            [
                ("CNSTRC_API_KEY", Some("env-key")),
                ("CNSTRC_API_TOKEN", Some("env-token")),
                ("CNSTRC_SERVICE_URL", Some("http://localhost:8080")),
                ("CNSTRC_TIMEOUT_SECS", Some("12")),
                ("CNSTRC_SECURITY_TOKEN", None),
                ("CNSTRC_QUIZZES_SERVICE_URL", None),
            ],
            || {
                let config = ClientConfig::from_env().unwrap();
                assert_eq!(config.api_key.as_deref(), Some("env-key"));
                assert_eq!(config.api_token.as_deref(), Some("env-token"));
                assert_eq!(config.service_url, "http://localhost:8080");
                assert_eq!(config.timeout_secs, Some(12));
                assert_eq!(config.security_token, None);
            },
        );
    }

    #[test]
    fn env_without_credentials_fails() {
        temp_env::with_vars_unset(["CNSTRC_API_KEY", "CNSTRC_API_TOKEN"], || {
            assert!(matches!(ClientConfig::from_env(), Err(Error::Configuration(_))));
        });
    }

    #[test]
    fn merge_keeps_untouched_fields_and_revalidates() {
        let config = ClientConfig::new("key").with_api_token("tok");
        let merged = config
            .merged(ConfigUpdate {
                service_url: Some("http://localhost:3000".to_string()),
                api_token: Some(None),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(merged.api_key.as_deref(), Some("key"));
        assert_eq!(merged.api_token, None);
        assert_eq!(merged.service_url, "http://localhost:3000");

        let err = merged
            .merged(ConfigUpdate {
                api_key: Some(None),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn client_identifier_can_be_overridden() {
        assert!(ClientConfig::new("k").client_identifier().starts_with("cio-rs-"));
        assert_eq!(
            ClientConfig::new("k").with_version("custom-version").client_identifier(),
            "custom-version"
        );
    }
}
