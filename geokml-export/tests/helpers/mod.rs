//! Test Helper Utilities
//!
//! In-memory [`JsonFetcher`] and context builders for network-free pipeline tests

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use geokml_common::ExportConfig;
use geokml_export::output::OutputManager;
use geokml_export::pipelines::ExportContext;
use geokml_export::sources::{FetchError, JsonFetcher};

enum MockResponse {
    Json(Value),
    Status(u16),
}

/// Canned responses keyed by URL plus query string
#[derive(Default)]
pub struct MockFetcher {
    responses: Mutex<HashMap<String, MockResponse>>,
    requests: Mutex<Vec<String>>,
}

fn request_key(url: &str, query: &[(&str, &str)]) -> String {
    if query.is_empty() {
        return url.to_string();
    }
    let params: Vec<String> = query.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    format!("{}?{}", url, params.join("&"))
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(self, url: &str, query: &[(&str, &str)], body: Value) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(request_key(url, query), MockResponse::Json(body));
        self
    }

    pub fn with_status(self, url: &str, query: &[(&str, &str)], status: u16) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(request_key(url, query), MockResponse::Status(status));
        self
    }

    /// Requests seen so far, as `url?k=v&...`
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl JsonFetcher for MockFetcher {
    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Value, FetchError> {
        let key = request_key(url, query);
        self.requests.lock().unwrap().push(key.clone());

        match self.responses.lock().unwrap().get(&key) {
            Some(MockResponse::Json(body)) => Ok(body.clone()),
            Some(MockResponse::Status(status)) => {
                Err(FetchError::ApiError(*status, "mock status".to_string()))
            }
            None => Err(FetchError::NetworkError(format!("no mock route for {}", key))),
        }
    }
}

/// Export context writing below `output_dir`
pub fn test_context(output_dir: &Path, config: ExportConfig, fetcher: Arc<MockFetcher>) -> ExportContext {
    let output = OutputManager::new(output_dir).unwrap();
    ExportContext::new(
        ExportConfig {
            output_dir: output_dir.to_path_buf(),
            ..config
        },
        fetcher,
        output,
    )
}

/// POI feed query for one locale with default settings
pub fn poi_query(locale: &str) -> [(&'static str, &str); 3] {
    [("cities", "RUH"), ("locale", locale), ("type", "city,experiences")]
}
