//! Base HTTP client with shared logic

use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// Base HTTP client with bearer authentication
#[derive(Clone)]
pub struct HttpClientBase {
    pub endpoint: String,
    api_key: String,
    http: Client,
}

impl HttpClientBase {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            http: Client::new(),
        }
    }

    /// Build URL from endpoint and path
    pub fn build_url(&self, path: &str) -> String {
        let base = self.endpoint.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    pub async fn post_json<Req, Res>(&self, path: &str, body: &Req) -> Result<Res, HttpError>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.build_url(path))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn get_json<Res>(&self, path: &str, query: &[(&str, String)]) -> Result<Res, HttpError>
    where
        Res: DeserializeOwned,
    {
        let response = self
            .http
            .get(self.build_url(path))
            .bearer_auth(&self.api_key)
            .query(query)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode<Res: DeserializeOwned>(response: Response) -> Result<Res, HttpError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HttpError::Status { status, body });
        }
        Ok(response.json().await?)
    }
}
