//! ArcGIS web map resolution
//!
//! viewer URL → `appid` → `{base}/{appid}/data?f=json` → `values.webmap`
//! → `{base}/{webmap}/data?f=json` → web map payload.
//!
//! Every hop must succeed; there is no partial result.

use reqwest::Url;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use geokml_common::config::MetroConfig;

use super::{FetchError, JsonFetcher};

/// Resolution chain errors
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Invalid viewer URL {0}: {1}")]
    InvalidViewerUrl(String, String),

    #[error("No appid found in viewer URL {0}")]
    MissingAppId(String),

    #[error("No webmap id found for app {0}")]
    MissingWebmapId(String),

    #[error("Neither a viewer URL nor a webmap id is configured")]
    NotConfigured,

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Pull the `appid` query parameter out of a viewer URL
pub fn extract_app_id(viewer_url: &str) -> Result<String, ResolveError> {
    let url = Url::parse(viewer_url)
        .map_err(|e| ResolveError::InvalidViewerUrl(viewer_url.to_string(), e.to_string()))?;

    url.query_pairs()
        .find(|(key, _)| key == "appid")
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ResolveError::MissingAppId(viewer_url.to_string()))
}

pub struct ArcGisResolver {
    fetcher: Arc<dyn JsonFetcher>,
    api_base: String,
}

impl ArcGisResolver {
    pub fn new(fetcher: Arc<dyn JsonFetcher>, api_base: &str) -> Self {
        Self {
            fetcher,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Data URL of a content item
    pub fn item_data_url(&self, item_id: &str) -> String {
        format!("{}/{}/data", self.api_base, item_id)
    }

    async fn fetch_item(&self, item_id: &str) -> Result<Value, FetchError> {
        self.fetcher
            .get_json(&self.item_data_url(item_id), &[("f", "json")])
            .await
    }

    /// Look up the web map id published by an application item
    pub async fn webmap_id_for_app(&self, app_id: &str) -> Result<String, ResolveError> {
        let app_data = self.fetch_item(app_id).await?;

        app_data
            .get("values")
            .and_then(|values| values.get("webmap"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ResolveError::MissingWebmapId(app_id.to_string()))
    }

    /// Fetch the web map payload itself
    pub async fn fetch_webmap(&self, webmap_id: &str) -> Result<Value, ResolveError> {
        Ok(self.fetch_item(webmap_id).await?)
    }

    /// Run the full chain starting from a viewer URL
    pub async fn resolve(&self, viewer_url: &str) -> Result<Value, ResolveError> {
        tracing::info!(viewer_url = %viewer_url, "Resolving web map from viewer URL");

        let app_id = extract_app_id(viewer_url)?;
        tracing::debug!(app_id = %app_id, "Extracted app id");

        let webmap_id = self.webmap_id_for_app(&app_id).await?;
        tracing::debug!(webmap_id = %webmap_id, "Resolved web map id");

        self.fetch_webmap(&webmap_id).await
    }

    /// Resolve using configuration; a configured web map id skips the app lookup
    pub async fn resolve_configured(&self, metro: &MetroConfig) -> Result<Value, ResolveError> {
        if let Some(webmap_id) = metro.webmap_id.as_deref().filter(|id| !id.trim().is_empty()) {
            tracing::info!(webmap_id = %webmap_id, "Using configured web map id");
            return self.fetch_webmap(webmap_id.trim()).await;
        }
        match metro.viewer_url.as_deref() {
            Some(viewer_url) if !viewer_url.trim().is_empty() => self.resolve(viewer_url).await,
            _ => Err(ResolveError::NotConfigured),
        }
    }
}
