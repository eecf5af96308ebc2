use std::sync::Arc;

use tracing::{info, warn};

use crate::api::{CreateIncidentRequest, IncidentApi};
use crate::error::{SubmitError, ValidationError};

/// Raw user input for a new incident, as typed into a form or passed on the
/// command line.
#[derive(Debug, Clone, Default)]
pub struct IncidentDraft {
    pub description: String,
    /// One log line per text line; blank lines are dropped.
    pub logs: String,
    /// Must be a JSON object. Empty text means `{}`.
    pub metrics: String,
}

impl IncidentDraft {
    /// Build the creation request, or explain what is wrong with the input.
    pub fn validate(&self) -> Result<CreateIncidentRequest, ValidationError> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(ValidationError::EmptyDescription);
        }

        Ok(CreateIncidentRequest {
            description: description.to_string(),
            logs: parse_log_lines(&self.logs),
            metrics: parse_metrics(&self.metrics)?,
        })
    }
}

fn parse_log_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_metrics(
    text: &str,
) -> Result<serde_json::Map<String, serde_json::Value>, ValidationError> {
    if text.trim().is_empty() {
        return Ok(serde_json::Map::new());
    }

    let value: serde_json::Value =
        serde_json::from_str(text).map_err(ValidationError::InvalidMetrics)?;

    match value {
        serde_json::Value::Object(map) => Ok(map),
        serde_json::Value::Null => Err(ValidationError::MetricsNotObject { found: "null" }),
        serde_json::Value::Bool(_) => Err(ValidationError::MetricsNotObject { found: "a boolean" }),
        serde_json::Value::Number(_) => Err(ValidationError::MetricsNotObject { found: "a number" }),
        serde_json::Value::String(_) => Err(ValidationError::MetricsNotObject { found: "a string" }),
        serde_json::Value::Array(_) => Err(ValidationError::MetricsNotObject { found: "an array" }),
    }
}

/// Creates incident jobs on the remote service.
///
/// Submitting does not start polling; the caller decides whether to watch
/// the returned id.
pub struct JobSubmitter {
    api: Arc<dyn IncidentApi>,
}

impl JobSubmitter {
    pub fn new(api: Arc<dyn IncidentApi>) -> Self {
        Self { api }
    }

    /// Validate the draft, issue one creation request and return the job id.
    pub async fn submit(&self, draft: &IncidentDraft) -> Result<String, SubmitError> {
        let request = draft.validate()?;

        let job = self.api.create_incident(&request).await.map_err(|e| {
            warn!(error = %e, "Incident submission failed");
            SubmitError::Submission(e)
        })?;

        info!(job_id = %job.job_id, status = %job.status, "Incident submitted");
        Ok(job.job_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{ScriptedApi, job};
    use crate::core::JobStatus;
    use crate::error::ApiError;

    fn draft(description: &str, logs: &str, metrics: &str) -> IncidentDraft {
        IncidentDraft {
            description: description.to_string(),
            logs: logs.to_string(),
            metrics: metrics.to_string(),
        }
    }

    #[test]
    fn test_validate_splits_logs_and_parses_metrics() {
        let request = draft(
            "High latency on API",
            "[ERROR] Connection timeout\n\n   \n[INFO] Retrying...\r\n",
            r#"{"cpu_usage": 90, "latency_ms": [200, 1200]}"#,
        )
        .validate()
        .unwrap();

        assert_eq!(request.description, "High latency on API");
        assert_eq!(
            request.logs,
            vec!["[ERROR] Connection timeout", "[INFO] Retrying..."]
        );
        assert_eq!(request.metrics["cpu_usage"], 90);
        assert_eq!(request.metrics.len(), 2);
    }

    #[test]
    fn test_empty_metrics_is_empty_object() {
        for metrics in ["", "   \n"] {
            let request = draft("x", "", metrics).validate().unwrap();
            assert!(request.metrics.is_empty());
            assert!(request.logs.is_empty());
        }
    }

    #[test]
    fn test_invalid_metrics_rejected() {
        let err = draft("x", "", "{invalid").validate().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidMetrics(_)));
    }

    #[test]
    fn test_non_object_metrics_rejected() {
        let err = draft("x", "", "[1, 2]").validate().unwrap_err();
        assert!(matches!(
            err,
            ValidationError::MetricsNotObject { found: "an array" }
        ));
    }

    #[test]
    fn test_blank_description_rejected() {
        let err = draft("  ", "", "").validate().unwrap_err();
        assert!(matches!(err, ValidationError::EmptyDescription));
    }

    #[tokio::test]
    async fn test_submit_returns_job_id() {
        let api = Arc::new(ScriptedApi::new());
        api.push_create(Ok(job("job-42", JobStatus::Processing, Some("initializing"))));
        let submitter = JobSubmitter::new(api.clone());

        let id = submitter
            .submit(&draft("Disk full", "line", r#"{"disk": 99}"#))
            .await
            .unwrap();

        assert_eq!(id, "job-42");
        let sent = api.created_requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].logs, vec!["line"]);
    }

    #[tokio::test]
    async fn test_invalid_metrics_makes_no_request() {
        let api = Arc::new(ScriptedApi::new());
        let submitter = JobSubmitter::new(api.clone());

        let err = submitter
            .submit(&draft("x", "", "{invalid"))
            .await
            .unwrap_err();

        assert!(matches!(err, SubmitError::Validation(_)));
        assert!(api.created_requests().is_empty());
    }

    #[tokio::test]
    async fn test_service_error_is_submission_error() {
        let api = Arc::new(ScriptedApi::new());
        api.push_create(Err(ApiError::Status {
            status: 500,
            body: "boom".to_string(),
        }));
        let submitter = JobSubmitter::new(api.clone());

        let err = submitter.submit(&draft("x", "", "")).await.unwrap_err();

        assert!(err.is_retryable());
        assert!(matches!(
            err,
            SubmitError::Submission(ApiError::Status { status: 500, .. })
        ));
        assert_eq!(api.created_requests().len(), 1);
    }
}
