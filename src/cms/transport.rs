//! Transport seam between the CMS client and the backend.
//!
//! The client only needs `GET <endpoint>?<params>` returning JSON plus the
//! collection total. [`HttpTransport`] is the reqwest implementation; tests
//! plug in their own.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::{CmsError, Result};
use crate::retry::{with_retry_if, RetryConfig};

/// Response header carrying the collection size.
pub const TOTAL_HEADER: &str = "total";

/// Raw backend response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// Response body: `{story}`, `{stories}` or `{space}`
    pub data: Value,
    /// Total number of records for collection responses
    pub total: Option<u64>,
}

impl ApiResponse {
    pub fn new(data: Value) -> Self {
        Self { data, total: None }
    }

    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, endpoint: &str, params: &[(String, String)]) -> Result<ApiResponse>;
}

/// reqwest-backed transport with retries on network and 5xx failures.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
    retry: RetryConfig,
}

impl HttpTransport {
    pub fn new(base_url: &str, access_token: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CmsError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            retry: RetryConfig::default(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.api_url,
            &config.access_token,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    async fn get_once(&self, endpoint: &str, params: &[(String, String)]) -> Result<ApiResponse> {
        let response = self
            .client
            .get(self.url(endpoint))
            .query(params)
            .query(&[("token", self.access_token.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CmsError::NotFound(endpoint.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CmsError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let header_total = response
            .headers()
            .get(TOTAL_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        let data: Value = response.json().await?;
        let total = header_total.or_else(|| data.get("total").and_then(Value::as_u64));

        Ok(ApiResponse { data, total })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, endpoint: &str, params: &[(String, String)]) -> Result<ApiResponse> {
        debug!("GET {} with {} params", endpoint, params.len());
        with_retry_if(
            &self.retry,
            &format!("GET {}", endpoint),
            || self.get_once(endpoint, params),
            CmsError::is_retryable,
        )
        .await
    }
}
