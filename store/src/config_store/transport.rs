use crate::common::HttpError;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Raw request/response exchange with the configuration API.
///
/// The remote adapter builds paths and bodies; implementations only move
/// JSON. Query pairs are sent in order; pairs are omitted by the caller
/// rather than sent empty.
#[async_trait]
pub trait ConfigTransport: Send + Sync {
    async fn get(&self, path: &str, query: &[(&'static str, String)]) -> Result<Value, HttpError>;

    async fn put(&self, path: &str, body: Value) -> Result<Value, HttpError>;
}

/// `reqwest`-backed transport against a base URL such as
/// `https://api.example.com/v1`.
pub struct HttpTransport {
    base_url: String,
    timeout: Duration,
    http_client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, HttpError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HttpError::ClientCreation {
                reason: e.to_string(),
            })?;

        Ok(Self::with_client(base_url, timeout, http_client))
    }

    /// Reuse an existing client (connection pool, proxies, TLS settings).
    pub fn with_client(
        base_url: impl Into<String>,
        timeout: Duration,
        http_client: reqwest::Client,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            timeout,
            http_client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn map_send_error(&self, url: &str, e: reqwest::Error) -> HttpError {
        if e.is_timeout() {
            HttpError::Timeout {
                url: url.to_string(),
                seconds: self.timeout.as_secs(),
            }
        } else {
            HttpError::RequestFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    }

    async fn read_response(&self, url: &str, response: reqwest::Response) -> Result<Value, HttpError> {
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(HttpError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HttpError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| self.map_send_error(url, e))?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| HttpError::InvalidResponse {
            expected: "JSON body".to_string(),
            actual: e.to_string(),
        })
    }
}

#[async_trait]
impl ConfigTransport for HttpTransport {
    async fn get(&self, path: &str, query: &[(&'static str, String)]) -> Result<Value, HttpError> {
        let url = self.url(path);
        log::debug!("GET {url} {query:?}");

        let response = self
            .http_client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.map_send_error(&url, e))?;

        self.read_response(&url, response).await
    }

    async fn put(&self, path: &str, body: Value) -> Result<Value, HttpError> {
        let url = self.url(path);
        log::debug!("PUT {url}");

        let response = self
            .http_client
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(&url, e))?;

        self.read_response(&url, response).await
    }
}
