//! HTTP client for the incident service.
//!
//! Endpoints, relative to the configured base URL:
//!
//! - `POST /incidents/` creates a job
//! - `GET /incidents/{id}` returns one job snapshot
//! - `GET /incidents/` lists all jobs

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{CreateIncidentRequest, IncidentApi};
use crate::core::Job;
use crate::error::ApiError;

/// reqwest-backed [`IncidentApi`].
pub struct HttpIncidentApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpIncidentApi {
    /// * `base_url` - e.g. `http://localhost:8000/api/v1`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/incidents/", self.base_url)
    }

    fn job_url(&self, job_id: &str) -> String {
        format!("{}/incidents/{}", self.base_url, job_id)
    }

    /// Turn a non-2xx response into [`ApiError::Status`], otherwise decode the body.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl IncidentApi for HttpIncidentApi {
    async fn create_incident(&self, request: &CreateIncidentRequest) -> Result<Job, ApiError> {
        debug!(
            url = %self.collection_url(),
            log_lines = request.logs.len(),
            metrics = request.metrics.len(),
            "Creating incident job"
        );

        let response = self
            .client
            .post(self.collection_url())
            .json(request)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn get_incident(&self, job_id: &str) -> Result<Job, ApiError> {
        let response = self.client.get(self.job_url(job_id)).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound {
                job_id: job_id.to_string(),
            });
        }

        Self::parse_response(response).await
    }

    async fn list_incidents(&self) -> Result<Vec<Job>, ApiError> {
        let response = self.client.get(self.collection_url()).send().await?;
        Self::parse_response(response).await
    }
}
