//! Per-stage progress inferred from a job snapshot.
//!
//! The service only reports a single `step` value, so the status of every
//! other stage is reconstructed from its position relative to that step.
//! Views are rebuilt from scratch on every poll and never stored.

use serde::Serialize;

use super::models::{Job, JobStatus};
use super::pipeline::{PipelineStage, stage_index};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl StageStatus {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Running => "Processing...",
            Self::Completed => "Done",
            Self::Failed => "Failed",
            Self::Pending => "Waiting...",
        }
    }
}

/// Render-ready status for one pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageView {
    pub label: &'static str,
    pub status: StageStatus,
    pub description: &'static str,
}

/// Map a snapshot onto one [`StageView`] per pipeline stage, in order.
///
/// * A completed job, or a step of `"done"`, marks every stage completed
///   regardless of the step name.
/// * A failed job marks earlier stages completed and the current one failed.
///   When the step matches no stage (the service stores the error text
///   there), the first stage is marked failed since none is known to have
///   finished.
/// * Otherwise earlier stages are completed, the current one is running and
///   the rest are pending. An unmatched step leaves every stage pending.
pub fn derive_stage_views(pipeline: &[PipelineStage], job: &Job) -> Vec<StageView> {
    let current = job
        .step
        .as_deref()
        .and_then(|step| stage_index(pipeline, step));

    pipeline
        .iter()
        .enumerate()
        .map(|(idx, stage)| {
            let status = stage_status(idx, current, job);
            StageView {
                label: stage.label,
                status,
                description: status.description(),
            }
        })
        .collect()
}

fn stage_status(idx: usize, current: Option<usize>, job: &Job) -> StageStatus {
    if job.is_done() {
        return StageStatus::Completed;
    }

    let active = if job.status == JobStatus::Failed {
        StageStatus::Failed
    } else {
        StageStatus::Running
    };

    match current {
        Some(cur) if idx < cur => StageStatus::Completed,
        Some(cur) if idx == cur => active,
        Some(_) => StageStatus::Pending,
        None if job.status == JobStatus::Failed && idx == 0 => StageStatus::Failed,
        None => StageStatus::Pending,
    }
}
