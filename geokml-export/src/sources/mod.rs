//! Remote data sources
//!
//! Everything that touches the network goes through [`JsonFetcher`], so the
//! pipelines can be driven by an in-memory fetcher in tests.

pub mod arcgis;
pub mod visit_saudi;

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use geokml_common::config::EndpointConfig;

/// Fetch errors
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// GET a URL and decode the body as JSON
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Value, FetchError>;
}

/// HTTP implementation backed by `reqwest`
pub struct HttpFetcher {
    http_client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(endpoints: &EndpointConfig) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .user_agent(endpoints.user_agent.as_str())
            .timeout(Duration::from_secs(endpoints.request_timeout_secs))
            .build()
            .map_err(|e| FetchError::NetworkError(e.to_string()))?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl JsonFetcher for HttpFetcher {
    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Value, FetchError> {
        tracing::debug!(url = %url, params = query.len(), "Fetching JSON");

        let response = self
            .http_client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| FetchError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(FetchError::ApiError(status.as_u16(), error_text));
        }

        // Some endpoints answer JSON as text/plain; decode the body ourselves
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::NetworkError(e.to_string()))?;

        parse_json_body(&body)
    }
}

/// Decode a response body, reporting a short excerpt on failure
pub fn parse_json_body(body: &str) -> Result<Value, FetchError> {
    serde_json::from_str(body).map_err(|e| {
        let excerpt: String = body.chars().take(80).collect();
        FetchError::ParseError(format!("{} (body starts with {:?})", e, excerpt))
    })
}
