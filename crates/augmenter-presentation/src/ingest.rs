//! Ingestion service client.
//!
//! Uploads an exported conversation history under the session identity and
//! removes it again on request.

use std::path::Path;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info};

use augmenter_config::ServiceConfig;
use augmenter_protocols::{DeleteReport, ExtractReport, ExtractRequest, HealthReport, ServiceError};

use crate::http::{decode, endpoint, send_error};

#[cfg(test)]
#[path = "ingest_tests.rs"]
mod tests;

/// The only file name the ingestion service accepts.
pub const EXPORT_FILE_NAME: &str = "conversations.json";

/// Client for `/extract`, `/delete/{uuid}` and `/health`.
pub struct IngestionClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl IngestionClient {
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
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    /// Read and check an export file before anything is sent.
    pub async fn read_export(path: &Path) -> Result<Value, ServiceError> {
        if path.file_name().and_then(|n| n.to_str()) != Some(EXPORT_FILE_NAME) {
            return Err(ServiceError::InvalidInput(format!(
                "File must be named \"{}\"",
                EXPORT_FILE_NAME
            )));
        }
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            ServiceError::InvalidInput(format!("Cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| ServiceError::InvalidInput(format!("File is not valid JSON: {}", e)))
    }

    /// Upload an export file under `uuid`.
    pub async fn upload(&self, path: &Path, uuid: &str) -> Result<ExtractReport, ServiceError> {
        let data = Self::read_export(path).await?;
        self.extract(ExtractRequest {
            uuid: uuid.to_string(),
            data,
        })
        .await
    }

    pub async fn extract(&self, request: ExtractRequest) -> Result<ExtractReport, ServiceError> {
        let url = endpoint(&self.base_url, "/extract");
        debug!(url = %url, uuid = %request.uuid, "Uploading conversations");

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(send_error)?;

        let report: ExtractReport = decode(response).await?;
        info!(
            uuid = %request.uuid,
            documents = ?report.total_documents,
            "Conversations uploaded"
        );
        Ok(report)
    }

    /// Remove everything stored under `uuid`.
    pub async fn delete(&self, uuid: &str) -> Result<DeleteReport, ServiceError> {
        if uuid.trim().is_empty() {
            return Err(ServiceError::InvalidInput("Session identifier is empty".to_string()));
        }
        let url = endpoint(&self.base_url, &format!("/delete/{}", uuid));
        let response = self
            .client
            .delete(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(send_error)?;

        let report: DeleteReport = decode(response).await?;
        info!(uuid = %uuid, status = ?report.status, "Session data deleted");
        Ok(report)
    }

    pub async fn health(&self) -> Result<HealthReport, ServiceError> {
        let url = endpoint(&self.base_url, "/health");
        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(send_error)?;
        decode(response).await
    }
}
