use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::{HttpIncidentApi, IncidentApi};
use crate::config::AppConfig;
use crate::core::{IncidentPoller, JobSubmitter};

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub api: Arc<dyn IncidentApi>,
}

impl AppContext {
    /// Build a context talking to the service named in `config`.
    pub fn new(config: AppConfig) -> Result<Self> {
        let api = HttpIncidentApi::new(config.api_url.clone(), config.request_timeout())
            .context("Failed to create HTTP client")?;
        Ok(Self::with_api(config, Arc::new(api)))
    }

    pub fn with_api(config: AppConfig, api: Arc<dyn IncidentApi>) -> Self {
        Self {
            config: Arc::new(config),
            api,
        }
    }

    pub fn submitter(&self) -> JobSubmitter {
        JobSubmitter::new(self.api.clone())
    }

    /// A poller for `job_id` using the configured cadence.
    pub fn poller(&self, job_id: impl Into<String>) -> IncidentPoller {
        IncidentPoller::new(self.api.clone(), job_id).with_interval(self.config.poll_interval())
    }
}
