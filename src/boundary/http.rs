//! HTTP implementation of the external boundary
//!
//! Posts the token payload as JSON to the configured endpoint and
//! returns the raw response body. Failure modes are mapped onto the
//! boundary taxonomy: timeouts and 429s are retryable, unparseable
//! bodies are [`BoundaryError::Malformed`].

use crate::anonymize::TokenPayload;
use crate::boundary::ExternalBoundary;
use crate::config::{BoundaryConfig, SecretString};
use crate::domain::{BoundaryError, Result, VeilError};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// HTTP client for the external reasoning service
pub struct HttpBoundary {
    client: Client,
    endpoint: Url,
    api_key: Option<SecretString>,
    timeout_seconds: u64,
}

impl HttpBoundary {
    /// Create a boundary client from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the endpoint URL is invalid or
    /// the HTTP client cannot be built.
    pub fn new(config: &BoundaryConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            VeilError::Configuration(format!(
                "Invalid boundary endpoint '{}': {e}",
                config.endpoint
            ))
        })?;

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| VeilError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
            timeout_seconds: config.timeout_seconds,
        })
    }

    fn map_send_error(&self, err: reqwest::Error) -> BoundaryError {
        if err.is_timeout() {
            BoundaryError::Timeout(format!("{}s", self.timeout_seconds))
        } else if err.is_connect() {
            BoundaryError::Connection(err.to_string())
        } else {
            BoundaryError::Upstream {
                status: err.status().map(|s| s.as_u16()).unwrap_or(0),
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl ExternalBoundary for HttpBoundary {
    async fn call(&self, payload: &TokenPayload) -> std::result::Result<Value, BoundaryError> {
        let mut request = self.client.post(self.endpoint.clone()).json(payload);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unspecified")
                    .to_string();
                tracing::warn!(retry_after = %retry_after, "External service rate limited the call");
                Err(BoundaryError::RateLimited(retry_after))
            }
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                Err(BoundaryError::Upstream {
                    status: status.as_u16(),
                    message: body,
                })
            }
            _ => response
                .json::<Value>()
                .await
                .map_err(|e| BoundaryError::Malformed(format!("Response body is not JSON: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoundaryConfig;

    #[test]
    fn test_invalid_endpoint_rejected() {
        let config = BoundaryConfig {
            endpoint: "not a url".to_string(),
            api_key: None,
            timeout_seconds: 30,
        };
        assert!(HttpBoundary::new(&config).is_err());
    }

    #[test]
    fn test_valid_endpoint_accepted() {
        let config = BoundaryConfig {
            endpoint: "https://optimizer.example.com/v1/plan".to_string(),
            api_key: None,
            timeout_seconds: 30,
        };
        assert!(HttpBoundary::new(&config).is_ok());
    }
}
