//! [`DashboardSource`] backed by the prediction REST API.

use std::time::Duration;

use async_trait::async_trait;
use health_map_alert_models::Alert;
use health_map_location_models::{Location, LocationId};
use health_map_source_models::{ResourcePrediction, RiskPrediction};

use crate::{DashboardSource, SourceError, decode, fetch};

/// Default API base URL when `HEALTH_MAP_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Default per-request timeout in seconds when `HEALTH_MAP_TIMEOUT_SECS` is
/// unset or invalid.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for [`HttpSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSourceConfig {
    /// API base URL, without a trailing slash.
    pub base_url: String,
    /// Bearer token sent with every request, if any.
    pub token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl HttpSourceConfig {
    /// Reads the configuration from the environment.
    ///
    /// * `HEALTH_MAP_API_URL` (default [`DEFAULT_API_URL`])
    /// * `HEALTH_MAP_API_TOKEN` (optional)
    /// * `HEALTH_MAP_TIMEOUT_SECS` (default [`DEFAULT_TIMEOUT_SECS`])
    #[must_use]
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("HEALTH_MAP_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let token = std::env::var("HEALTH_MAP_API_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());
        let timeout_secs: u64 = std::env::var("HEALTH_MAP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Builder-style override of the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder-style override of the bearer token.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }
}

/// Fetches dashboard data over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    config: HttpSourceConfig,
}

impl HttpSource {
    /// Creates a source with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the client cannot be built.
    pub fn new(config: HttpSourceConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("health_map/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;

        log::debug!(
            "HTTP source at {} (timeout {:?}, auth: {})",
            config.base_url,
            config.timeout,
            if config.token.is_some() { "bearer" } else { "none" }
        );

        Ok(Self { client, config })
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &HttpSourceConfig {
        &self.config
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{path}", self.config.base_url);
        log::trace!("GET {url}");
        let request = self.client.get(url);
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl DashboardSource for HttpSource {
    async fn locations(&self) -> Result<Vec<Location>, SourceError> {
        let body = fetch::send_json(self.get("/data/locations")).await?;
        decode::locations(&body)
    }

    async fn risk_prediction(&self, id: LocationId) -> Result<RiskPrediction, SourceError> {
        let body = fetch::send_json(self.get(&format!("/predictions/risk/{id}"))).await?;
        decode::risk_prediction(&body)
    }

    async fn resource_prediction(
        &self,
        id: LocationId,
    ) -> Result<ResourcePrediction, SourceError> {
        let body = fetch::send_json(self.get(&format!("/predictions/resources/{id}"))).await?;
        decode::resource_prediction(&body)
    }

    async fn alerts(&self, threshold: f64) -> Result<Vec<Alert>, SourceError> {
        let request = self
            .get("/data/alerts")
            .query(&[("risk_threshold", threshold)]);
        let body = fetch::send_json(request).await?;
        decode::alerts(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_drops_trailing_slash() {
        let config = HttpSourceConfig::default().with_base_url("http://api.example/");
        assert_eq!(config.base_url, "http://api.example");
    }

    #[test]
    fn default_config_has_no_token() {
        let config = HttpSourceConfig::default();
        assert_eq!(config.base_url, DEFAULT_API_URL);
        assert_eq!(config.token, None);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn builds_client_from_config() {
        let source = HttpSource::new(
            HttpSourceConfig::default().with_token(Some("secret".to_string())),
        )
        .unwrap();
        assert_eq!(source.config().token.as_deref(), Some("secret"));
    }
}
