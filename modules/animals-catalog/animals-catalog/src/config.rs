//! Runtime configuration of the catalog data layer.
//!
//! Layers, later wins: built-in defaults, optional YAML file, then
//! `CATALOG_*` environment variables (e.g. `CATALOG_GRAPHQL_URL`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Prefix of the environment variables that override file settings.
pub const ENV_PREFIX: &str = "CATALOG_";

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_BODY_SIZE: usize = 8 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("query endpoint URL is not configured (set `graphql_url` or CATALOG_GRAPHQL_URL)")]
    MissingEndpoint,

    #[error("invalid query endpoint URL '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("URL scheme '{scheme}' not allowed: {reason}")]
    InsecureEndpoint { scheme: String, reason: &'static str },

    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to initialize TLS: {0}")]
    Tls(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Query endpoint, e.g. `https://catalog.example.com/graphql`.
    pub graphql_url: Option<String>,

    #[serde(with = "humantime_duration")]
    pub request_timeout: Duration,

    /// Items requested per page by list controllers.
    pub page_size: u32,

    /// Upper bound on a decoded response body, in bytes.
    pub max_body_size: usize,

    /// Allow plain `http://` endpoints. Intended for local development only.
    pub allow_insecure_http: bool,

    pub user_agent: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            graphql_url: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            page_size: DEFAULT_PAGE_SIZE,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            allow_insecure_http: false,
            user_agent: format!("animals-catalog/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl CatalogConfig {
    /// Load configuration from defaults, an optional YAML file and the
    /// environment, then validate it.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the file is missing or malformed, or if
    /// the resulting settings are invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX));

        Self::from_figment(&figment)
    }

    /// Extract and validate from an already assembled figment.
    ///
    /// # Errors
    /// See [`CatalogConfig::load`].
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Shorthand for an endpoint with default settings.
    #[must_use]
    pub fn for_endpoint(url: impl Into<String>) -> Self {
        Self {
            graphql_url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Validated endpoint URL.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingEndpoint`] or [`ConfigError::InvalidEndpoint`].
    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        let raw = self
            .graphql_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingEndpoint)?;

        let url = Url::parse(raw).map_err(|e| ConfigError::InvalidEndpoint {
            url: raw.to_owned(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "https" => Ok(url),
            "http" if self.allow_insecure_http => Ok(url),
            "http" => Err(ConfigError::InsecureEndpoint {
                scheme: "http".to_owned(),
                reason: "set allow_insecure_http to use plain HTTP",
            }),
            other => Err(ConfigError::InvalidEndpoint {
                url: raw.to_owned(),
                reason: format!("unsupported scheme '{other}'"),
            }),
        }
    }

    /// Check every setting without connecting anywhere.
    ///
    /// # Errors
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.endpoint()?;
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "page_size",
                reason: "must be at least 1".to_owned(),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout",
                reason: "must be greater than zero".to_owned(),
            });
        }
        if self.max_body_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_body_size",
                reason: "must be greater than zero".to_owned(),
            });
        }
        Ok(())
    }
}

/// `Duration` as a humantime string (`"10s"`, `"1m 30s"`).
mod humantime_duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&humantime::format_duration(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_yaml(yaml: &str) -> Result<CatalogConfig, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(CatalogConfig::default()))
            .merge(Yaml::string(yaml));
        CatalogConfig::from_figment(&figment)
    }

    #[test]
    fn defaults_are_applied() {
        let config = from_yaml("graphql_url: https://catalog.example.com/graphql").unwrap();
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert!(!config.allow_insecure_http);
    }

    #[test]
    fn durations_use_humantime() {
        let config = from_yaml(
            "graphql_url: https://catalog.example.com/graphql\nrequest_timeout: 1m 30s\n",
        )
        .unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(90));
    }

    #[test]
    fn missing_endpoint_is_rejected() {
        let err = from_yaml("page_size: 5").unwrap_err();
        assert!(matches!(err, ConfigError::MissingEndpoint));
    }

    #[test]
    fn plain_http_requires_opt_in() {
        let err = from_yaml("graphql_url: http://localhost:4000/graphql").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureEndpoint { .. }));

        let config = from_yaml(
            "graphql_url: http://localhost:4000/graphql\nallow_insecure_http: true\n",
        )
        .unwrap();
        assert_eq!(config.endpoint().unwrap().port(), Some(4000));
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let err = from_yaml("graphql_url: https://x.example/graphql\npage_size: 0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "page_size",
                ..
            }
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = from_yaml("graphql_url: https://x.example/graphql\npagesize: 3").unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn load_reads_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.yaml");
        std::fs::write(
            &path,
            "graphql_url: https://file.example/graphql\npage_size: 25\n",
        )
        .unwrap();

        let config = CatalogConfig::load(Some(&path)).unwrap();
        assert_eq!(config.page_size, 25);

        let missing = dir.path().join("absent.yaml");
        assert!(matches!(
            CatalogConfig::load(Some(&missing)),
            Err(ConfigError::FileNotFound(_))
        ));
    }
}
