//! Points-of-interest feed client

use serde_json::Value;
use std::sync::Arc;

use geokml_common::config::{EndpointConfig, PoiConfig};

use super::{FetchError, JsonFetcher};

/// Feed client for one city; the locale is chosen per request
pub struct PoiClient {
    fetcher: Arc<dyn JsonFetcher>,
    api_url: String,
    city: String,
    poi_types: String,
}

impl PoiClient {
    pub fn new(fetcher: Arc<dyn JsonFetcher>, endpoints: &EndpointConfig, pois: &PoiConfig) -> Self {
        Self {
            fetcher,
            api_url: endpoints.visit_saudi_api.clone(),
            city: pois.city.clone(),
            poi_types: pois.poi_types.clone(),
        }
    }

    /// Fetch the raw feed for one locale
    pub async fn fetch(&self, locale: &str) -> Result<Value, FetchError> {
        let query = [
            ("cities", self.city.as_str()),
            ("locale", locale),
            ("type", self.poi_types.as_str()),
        ];
        let payload = self.fetcher.get_json(&self.api_url, &query).await?;

        tracing::debug!(
            city = %self.city,
            locale = %locale,
            records = payload.as_array().map(Vec::len).unwrap_or(0),
            "Fetched POI feed"
        );
        Ok(payload)
    }

    /// Fetch two locales concurrently; both requests complete before returning
    pub async fn fetch_pair(
        &self,
        primary: &str,
        secondary: &str,
    ) -> (Result<Value, FetchError>, Result<Value, FetchError>) {
        tokio::join!(self.fetch(primary), self.fetch(secondary))
    }
}
