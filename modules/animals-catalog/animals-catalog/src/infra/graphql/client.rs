//! HTTP transport of the query gateway.
//!
//! One POST per call, JSON envelope in and out. No retries: a failed call
//! surfaces as a [`CatalogError`] and the caller decides what to do next.

use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

use animals_catalog_sdk::CatalogError;
use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderValue, Method, Request, Uri, header};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::envelope::{QueryRequest, decode_envelope};
use super::{Operation, QueryExecutor};
use crate::config::{
    CatalogConfig, ConfigError, DEFAULT_MAX_BODY_SIZE, DEFAULT_REQUEST_TIMEOUT,
};

const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Whether plain-text `http://` endpoints may be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportSecurity {
    #[default]
    TlsOnly,
    AllowInsecureHttp,
}

/// Builder for [`GraphQlClient`].
#[derive(Debug, Clone)]
pub struct GraphQlClientBuilder {
    endpoint: String,
    timeout: Duration,
    max_body_size: usize,
    user_agent: String,
    transport: TransportSecurity,
}

impl GraphQlClientBuilder {
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            user_agent: CatalogConfig::default().user_agent,
            transport: TransportSecurity::TlsOnly,
        }
    }

    /// Builder pre-filled from a loaded configuration.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingEndpoint`] when no endpoint is set.
    pub fn from_config(config: &CatalogConfig) -> Result<Self, ConfigError> {
        let endpoint = config
            .graphql_url
            .clone()
            .ok_or(ConfigError::MissingEndpoint)?;
        let mut builder = Self::new(endpoint)
            .timeout(config.request_timeout)
            .max_body_size(config.max_body_size)
            .user_agent(config.user_agent.clone());
        if config.allow_insecure_http {
            builder = builder.allow_insecure_http();
        }
        Ok(builder)
    }

    /// Deadline for one call, covering connect, response and body.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Allow `http://` endpoints (local development and mock servers).
    #[must_use]
    pub fn allow_insecure_http(mut self) -> Self {
        self.transport = TransportSecurity::AllowInsecureHttp;
        self
    }

    /// Build the client.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the endpoint is invalid or not allowed by
    /// the transport security setting, or if TLS cannot be initialized.
    pub fn build(self) -> Result<GraphQlClient, ConfigError> {
        let allow_http = self.transport == TransportSecurity::AllowInsecureHttp;
        if allow_http {
            warn!("insecure HTTP enabled for the query endpoint; use only for local testing");
        }

        let endpoint = CatalogConfig {
            graphql_url: Some(self.endpoint.clone()),
            allow_insecure_http: allow_http,
            ..CatalogConfig::default()
        }
        .endpoint()?;
        let uri: Uri = endpoint
            .as_str()
            .parse()
            .map_err(|e: http::uri::InvalidUri| ConfigError::InvalidEndpoint {
                url: self.endpoint.clone(),
                reason: e.to_string(),
            })?;

        let user_agent =
            HeaderValue::from_str(&self.user_agent).map_err(|e| ConfigError::InvalidValue {
                field: "user_agent",
                reason: e.to_string(),
            })?;

        let https = build_https_connector(self.transport)?;
        let http = Client::builder(TokioExecutor::new())
            .pool_timer(TokioTimer::new())
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .build::<_, Full<Bytes>>(https);

        debug!(endpoint = %uri, timeout = %humantime::format_duration(self.timeout), "query gateway ready");

        Ok(GraphQlClient {
            inner: Arc::new(Inner {
                http,
                endpoint: uri,
                timeout: self.timeout,
                max_body_size: self.max_body_size,
                user_agent,
            }),
        })
    }
}

fn build_https_connector(
    transport: TransportSecurity,
) -> Result<HttpsConnector<HttpConnector>, ConfigError> {
    let provider = rustls::crypto::CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(rustls::crypto::aws_lc_rs::default_provider()));

    let builder = hyper_rustls::HttpsConnectorBuilder::new()
        .with_provider_and_webpki_roots(provider)
        .map_err(|e| ConfigError::Tls(e.to_string()))?;

    let connector = match transport {
        TransportSecurity::AllowInsecureHttp => {
            builder.https_or_http().enable_all_versions().build()
        }
        TransportSecurity::TlsOnly => builder.https_only().enable_all_versions().build(),
    };
    Ok(connector)
}

struct Inner {
    http: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    endpoint: Uri,
    timeout: Duration,
    max_body_size: usize,
    user_agent: HeaderValue,
}

/// Query gateway over HTTP. Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct GraphQlClient {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for GraphQlClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphQlClient")
            .field("endpoint", &self.inner.endpoint)
            .field("timeout", &self.inner.timeout)
            .finish_non_exhaustive()
    }
}

impl GraphQlClient {
    #[must_use]
    pub fn builder(endpoint: impl Into<String>) -> GraphQlClientBuilder {
        GraphQlClientBuilder::new(endpoint)
    }

    #[must_use]
    pub fn endpoint(&self) -> &Uri {
        &self.inner.endpoint
    }

    async fn send(&self, operation: Operation, variables: &Value) -> Result<Value, CatalogError> {
        let inner = &self.inner;
        let body = serde_json::to_vec(&QueryRequest::new(operation, variables))
            .map_err(|e| CatalogError::transport(format!("failed to encode request: {e}")))?;

        let request = Request::builder()
            .method(Method::POST)
            .uri(inner.endpoint.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .header(
                header::ACCEPT,
                "application/graphql-response+json, application/json",
            )
            .header(header::USER_AGENT, inner.user_agent.clone())
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| CatalogError::transport(format!("failed to build request: {e}")))?;

        let response = inner
            .http
            .request(request)
            .await
            .map_err(|e| CatalogError::transport(format!("request failed: {}", error_chain(&e))))?;

        let status = response.status();
        let bytes = Limited::new(response.into_body(), inner.max_body_size)
            .collect()
            .await
            .map_err(|e| {
                if e.downcast_ref::<LengthLimitError>().is_some() {
                    CatalogError::transport(format!(
                        "response body exceeds {} bytes",
                        inner.max_body_size
                    ))
                } else {
                    CatalogError::transport(format!("failed to read response body: {e}"))
                }
            })?
            .to_bytes();

        debug!(status = %status, bytes = bytes.len(), "response received");
        decode_envelope(status, &bytes)
    }
}

#[async_trait]
impl QueryExecutor for GraphQlClient {
    #[instrument(name = "catalog.query", skip(self, variables), fields(operation = operation.name()))]
    async fn execute(&self, operation: Operation, variables: Value) -> Result<Value, CatalogError> {
        let timeout = self.inner.timeout;
        match tokio::time::timeout(timeout, self.send(operation, &variables)).await {
            Ok(result) => {
                if let Err(err) = &result {
                    warn!(error = %err, "query failed");
                }
                result
            }
            Err(_) => {
                warn!(timeout = %humantime::format_duration(timeout), "query timed out");
                Err(CatalogError::transport(format!(
                    "request timed out after {}",
                    humantime::format_duration(timeout)
                )))
            }
        }
    }
}

fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_http_is_refused_without_opt_in() {
        let err = GraphQlClient::builder("http://localhost:4000/graphql")
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InsecureEndpoint { .. }));
    }

    #[test]
    fn unsupported_scheme_is_refused() {
        let err = GraphQlClient::builder("ftp://catalog.example.com/graphql")
            .allow_insecure_http()
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEndpoint { .. }));
    }

    #[tokio::test]
    async fn builder_from_config_carries_settings() {
        let mut config = CatalogConfig::for_endpoint("http://127.0.0.1:9/graphql");
        config.allow_insecure_http = true;
        config.request_timeout = Duration::from_millis(250);

        let client = GraphQlClientBuilder::from_config(&config)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(client.endpoint().port_u16(), Some(9));
        assert_eq!(client.inner.timeout, Duration::from_millis(250));
    }
}
