use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pipeline::{DONE_STEP, PipelineStage};

/// Overall status of an incident job as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    /// Any status string this client does not know; treated as in progress.
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One snapshot of a remote incident job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    #[serde(alias = "id")]
    pub job_id: String,
    pub status: JobStatus,
    /// Currently active pipeline stage key, `"done"`, or free text on failure.
    #[serde(default)]
    pub step: Option<String>,
    #[serde(default)]
    pub result: Option<ReportContent>,
}

impl Job {
    /// First 8 characters of the id, for compact display.
    pub fn short_id(&self) -> &str {
        let end = self
            .job_id
            .char_indices()
            .nth(8)
            .map(|(i, _)| i)
            .unwrap_or(self.job_id.len());
        &self.job_id[..end]
    }

    pub fn is_done(&self) -> bool {
        self.status == JobStatus::Completed || self.step.as_deref() == Some(DONE_STEP)
    }

    /// The service writes the error text into `step` when a job fails.
    /// Returns that text when it is not one of the known stage keys.
    pub fn failure_reason(&self, pipeline: &[PipelineStage]) -> Option<&str> {
        if self.status != JobStatus::Failed {
            return None;
        }
        let step = self.step.as_deref()?.trim();
        if step.is_empty() || pipeline.iter().any(|stage| stage.key == step) {
            return None;
        }
        Some(step)
    }
}

/// Final analysis report attached to a completed job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportContent {
    pub summary: String,
    #[serde(default)]
    pub root_cause: Option<RootCause>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootCause {
    pub cause: String,
    /// Between 0.0 and 1.0.
    pub confidence_score: f64,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: String,
    pub description: String,
    #[serde(default = "default_is_safe")]
    pub is_safe: bool,
}

fn default_is_safe() -> bool {
    true
}
