/// Step value the service reports once every stage has finished.
pub const DONE_STEP: &str = "done";

/// One named stage of the incident analysis pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStage {
    /// Matches the `step` values reported by the service.
    pub key: &'static str,
    pub label: &'static str,
}

/// Stages in execution order.
pub const INCIDENT_PIPELINE: [PipelineStage; 5] = [
    PipelineStage {
        key: "analyzing_logs",
        label: "Log Analysis Agent",
    },
    PipelineStage {
        key: "analyzing_metrics",
        label: "Metrics Analysis Agent",
    },
    PipelineStage {
        key: "inferring_root_cause",
        label: "Root Cause Agent",
    },
    PipelineStage {
        key: "generating_recommendations",
        label: "Recommendation Agent",
    },
    PipelineStage {
        key: "finalizing_report",
        label: "Report Generator Agent",
    },
];

/// Position of the stage with the given key, if any.
pub fn stage_index(pipeline: &[PipelineStage], key: &str) -> Option<usize> {
    pipeline.iter().position(|stage| stage.key == key)
}
