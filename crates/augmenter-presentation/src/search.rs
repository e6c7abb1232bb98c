//! Search service client.

use std::time::Duration;

use tracing::{debug, info};

use augmenter_config::ServiceConfig;
use augmenter_protocols::{SearchRequest, SearchResponse, ServiceError};

use crate::http::{decode, endpoint, send_error};

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;

pub const EMPTY_QUERY_MESSAGE: &str = "Please enter some text to search";

/// Client for `POST /search`.
pub struct SearchClient {
    client: reqwest::Client,
    base_url: String,
    top_k: u32,
    timeout: Duration,
}

impl SearchClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::from_config(&ServiceConfig {
            base_url: base_url.into(),
            ..Default::default()
        })
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            top_k: config.top_k,
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn top_k(&self) -> u32 {
        self.top_k
    }

    /// Build the request for `text`, rejecting blank queries locally.
    pub fn request_for(&self, text: &str, uuid: Option<&str>) -> Result<SearchRequest, ServiceError> {
        let query = text.trim();
        if query.is_empty() {
            return Err(ServiceError::InvalidInput(EMPTY_QUERY_MESSAGE.to_string()));
        }
        let request = SearchRequest::new(query).with_top_k(self.top_k);
        Ok(match uuid {
            Some(uuid) => request.with_uuid(uuid),
            None => request,
        })
    }

    /// Search using the synchronized input text as the query.
    pub async fn search(&self, text: &str, uuid: Option<&str>) -> Result<SearchResponse, ServiceError> {
        let request = self.request_for(text, uuid)?;
        self.send(&request).await
    }

    pub async fn send(&self, request: &SearchRequest) -> Result<SearchResponse, ServiceError> {
        let url = endpoint(&self.base_url, "/search");
        debug!(url = %url, top_k = ?request.top_k, "Sending search request");

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(send_error)?;

        let result: SearchResponse = decode(response).await?;
        info!(results = result.total_results, "Search completed");
        Ok(result)
    }
}
