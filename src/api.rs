//! Backend client for the model refresh endpoint
//!
//! `POST {base_url}/refresh` with `{"credentials": ...}`. The backend answers
//! with a JSON body whose optional `error` field carries a business failure.

use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use crate::core::CredentialsRecord;
use crate::settings::RefreshConfig;

const USER_AGENT: &str = concat!("ouoctl/", env!("CARGO_PKG_VERSION"));

/// Errors that can occur talking to the backend
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Parsed refresh response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshResponse {
    /// Business error reported by the backend
    pub error: Option<String>,
}

impl RefreshResponse {
    /// Interpret a response body. Only a truthy `error` member counts as a
    /// failure; any other JSON is a success.
    pub fn from_value(value: &serde_json::Value) -> Self {
        let error = value.get("error").and_then(|error| match error {
            serde_json::Value::Null | serde_json::Value::Bool(false) => None,
            serde_json::Value::String(s) if s.is_empty() => None,
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) if n.as_f64() == Some(0.0) => None,
            other => Some(other.to_string()),
        });
        Self { error }
    }
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    credentials: &'a CredentialsRecord,
}

/// Anything that can run a model refresh
#[async_trait]
pub trait RefreshBackend: Send + Sync {
    async fn refresh(&self, credentials: &CredentialsRecord) -> Result<RefreshResponse, ApiError>;
}

/// HTTP implementation on reqwest
#[derive(Debug, Clone)]
pub struct HttpRefreshBackend {
    client: reqwest::Client,
    url: Url,
}

impl HttpRefreshBackend {
    pub fn new(config: &RefreshConfig) -> Result<Self, ApiError> {
        let url = config
            .refresh_url()
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;

        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl RefreshBackend for HttpRefreshBackend {
    async fn refresh(&self, credentials: &CredentialsRecord) -> Result<RefreshResponse, ApiError> {
        tracing::debug!(url = %self.url, "Requesting model refresh");

        let response = self
            .client
            .post(self.url.clone())
            .json(&RefreshRequest { credentials })
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(status = %status, "Refresh endpoint responded");

        let body = response.text().await?;
        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| ApiError::Parse(e.to_string()))?;
        if value.is_null() {
            return Err(ApiError::Parse("response body is null".to_string()));
        }

        Ok(RefreshResponse::from_value(&value))
    }
}
