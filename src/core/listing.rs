use tracing::debug;

use super::models::{Job, JobStatus};
use crate::api::IncidentApi;
use crate::error::ApiError;

/// One row of the incident overview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentSummary {
    pub job_id: String,
    pub short_id: String,
    pub status: JobStatus,
    pub step: Option<String>,
    pub has_report: bool,
}

impl From<&Job> for IncidentSummary {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.job_id.clone(),
            short_id: job.short_id().to_string(),
            status: job.status,
            step: job.step.clone(),
            has_report: job.result.is_some(),
        }
    }
}

/// One-shot fetch of every job, in the order the service returns them.
pub async fn fetch_incidents(api: &dyn IncidentApi) -> Result<Vec<IncidentSummary>, ApiError> {
    let jobs = api.list_incidents().await?;
    debug!(count = jobs.len(), "Fetched incident list");
    Ok(jobs.iter().map(IncidentSummary::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{ScriptedApi, job};

    #[tokio::test]
    async fn test_fetch_incidents_keeps_service_order() {
        let api = ScriptedApi::new();
        api.set_listing(vec![
            job("0123456789abcdef", JobStatus::Processing, Some("analyzing_logs")),
            job("fedcba9876543210", JobStatus::Completed, Some("done")),
        ]);

        let summaries = fetch_incidents(&api).await.unwrap();

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].short_id, "01234567");
        assert_eq!(summaries[0].status, JobStatus::Processing);
        assert_eq!(summaries[1].job_id, "fedcba9876543210");
        assert_eq!(summaries[1].step.as_deref(), Some("done"));
        assert!(!summaries[1].has_report);
    }

    #[tokio::test]
    async fn test_fetch_incidents_empty() {
        let api = ScriptedApi::new();
        assert!(fetch_incidents(&api).await.unwrap().is_empty());
    }
}
