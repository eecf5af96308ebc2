//! Remote incident service.
//!
//! - `IncidentApi`: the contract the core depends on
//! - `client`: reqwest implementation talking to the HTTP service

pub mod client;

use async_trait::async_trait;
use serde::Serialize;

use crate::core::Job;
use crate::error::ApiError;

pub use client::HttpIncidentApi;

/// Body of the job creation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateIncidentRequest {
    pub description: String,
    pub logs: Vec<String>,
    pub metrics: serde_json::Map<String, serde_json::Value>,
}

/// Operations the monitoring client needs from the incident service.
#[async_trait]
pub trait IncidentApi: Send + Sync {
    /// Create a job. Returns the created job snapshot.
    async fn create_incident(&self, request: &CreateIncidentRequest) -> Result<Job, ApiError>;

    /// Fetch the current snapshot of a job. Safe to call repeatedly.
    async fn get_incident(&self, job_id: &str) -> Result<Job, ApiError>;

    /// Fetch all jobs known to the service.
    async fn list_incidents(&self) -> Result<Vec<Job>, ApiError>;
}
