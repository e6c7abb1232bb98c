//! HTTP transport for refresh requests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use augmenter_config::RefreshConfig;
use augmenter_protocols::service::ErrorBody;
use augmenter_protocols::{
    HostStatus, ObserverHealth, RefreshChannel, RefreshError, RefreshRequest, RefreshResponse,
};

/// Sends refresh requests to an observer's refresh endpoint.
pub struct HttpRefreshClient {
    client: reqwest::Client,
    url: String,
    health_url: String,
    timeout: Duration,
}

impl HttpRefreshClient {
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> Self {
        let base = base_url.as_ref().trim_end_matches('/');
        Self {
            client: reqwest::Client::new(),
            url: format!("{}/refresh", base),
            health_url: format!("{}/health", base),
            timeout,
        }
    }

    pub fn from_config(config: &RefreshConfig, timeout: Duration) -> Self {
        Self::new(config.base_url(), timeout)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }

    fn send_error(&self, e: reqwest::Error) -> RefreshError {
        if e.is_timeout() {
            RefreshError::Timeout {
                timeout_ms: self.timeout_ms(),
            }
        } else {
            RefreshError::Unavailable(e.to_string())
        }
    }
}

#[async_trait]
impl RefreshChannel for HttpRefreshClient {
    async fn request_refresh(&self, request: RefreshRequest) -> Result<RefreshResponse, RefreshError> {
        debug!(url = %self.url, "Sending refresh request");
        let response = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        match response.status() {
            StatusCode::OK => response
                .json::<RefreshResponse>()
                .await
                .map_err(|e| RefreshError::Rejected(format!("unexpected refresh response: {}", e))),
            StatusCode::GATEWAY_TIMEOUT => Err(RefreshError::Timeout {
                timeout_ms: self.timeout_ms(),
            }),
            StatusCode::SERVICE_UNAVAILABLE => Err(RefreshError::Unavailable(
                "observer context is not running".to_string(),
            )),
            status => {
                let reason = response
                    .json::<ErrorBody>()
                    .await
                    .map(|b| b.error)
                    .unwrap_or_else(|_| status.to_string());
                Err(RefreshError::Rejected(reason))
            }
        }
    }

    async fn host_status(&self) -> Result<HostStatus, RefreshError> {
        let response = self
            .client
            .get(&self.health_url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        if !response.status().is_success() {
            return Err(RefreshError::Unavailable(format!(
                "observer health returned {}",
                response.status()
            )));
        }
        response
            .json::<ObserverHealth>()
            .await
            .map(|health| health.host)
            .map_err(|e| RefreshError::Rejected(format!("unexpected health response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

    #[tokio::test]
    async fn test_refresh_success() {
        let mock_server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .and(matchers::path("/refresh"))
            .and(matchers::body_json(json!({"action": "getInputText"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HttpRefreshClient::new(mock_server.uri(), Duration::from_secs(2));
        let response = client
            .request_refresh(RefreshRequest::get_input_text())
            .await
            .unwrap();
        assert!(response.success);
    }

    #[tokio::test]
    async fn test_refresh_unavailable() {
        let mock_server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({"success": false})))
            .mount(&mock_server)
            .await;

        let client = HttpRefreshClient::new(mock_server.uri(), Duration::from_secs(2));
        let err = client
            .request_refresh(RefreshRequest::get_input_text())
            .await
            .unwrap_err();
        assert!(matches!(err, RefreshError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_refresh_slow_observer_times_out() {
        let mock_server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&mock_server)
            .await;

        let client = HttpRefreshClient::new(mock_server.uri(), Duration::from_millis(100));
        let err = client
            .request_refresh(RefreshRequest::get_input_text())
            .await
            .unwrap_err();
        assert!(matches!(err, RefreshError::Timeout { timeout_ms: 100 }));
    }

    #[tokio::test]
    async fn test_refresh_rejected() {
        let mock_server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": "invalid refresh request"})),
            )
            .mount(&mock_server)
            .await;

        let client = HttpRefreshClient::new(mock_server.uri(), Duration::from_secs(2));
        match client
            .request_refresh(RefreshRequest::get_input_text())
            .await
            .unwrap_err()
        {
            RefreshError::Rejected(reason) => assert_eq!(reason, "invalid refresh request"),
            other => panic!("Expected Rejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_host_status_from_health() {
        let mock_server = MockServer::start().await;
        Mock::given(matchers::method("GET"))
            .and(matchers::path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ok",
                "state": "bound",
                "connected": true,
                "host": "off_host"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HttpRefreshClient::new(mock_server.uri(), Duration::from_secs(2));
        assert_eq!(client.host_status().await.unwrap(), HostStatus::OffHost);
    }

    #[tokio::test]
    async fn test_host_status_observer_down() {
        let mock_server = MockServer::start().await;
        Mock::given(matchers::method("GET"))
            .and(matchers::path("/health"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let client = HttpRefreshClient::new(mock_server.uri(), Duration::from_secs(2));
        assert!(matches!(
            client.host_status().await.unwrap_err(),
            RefreshError::Unavailable(_)
        ));
    }

    #[test]
    fn test_url_from_config() {
        let client = HttpRefreshClient::from_config(&RefreshConfig::default(), Duration::from_secs(1));
        assert_eq!(client.url(), "http://127.0.0.1:8791/refresh");
    }
}
