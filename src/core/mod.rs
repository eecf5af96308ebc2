pub mod listing;
pub mod models;
pub mod pipeline;
pub mod poller;
pub mod steps;
pub mod submitter;

#[cfg(test)]
pub(crate) mod testing;

pub use listing::{IncidentSummary, fetch_incidents};
pub use models::{Job, JobStatus, Recommendation, ReportContent, RootCause};
pub use pipeline::{DONE_STEP, INCIDENT_PIPELINE, PipelineStage};
pub use poller::{
    DEFAULT_POLL_INTERVAL, IncidentPoller, JobUpdate, PollEvent, PollHandle, PollOutcome,
    PollerState, StopReason,
};
pub use steps::{StageStatus, StageView, derive_stage_views};
pub use submitter::{IncidentDraft, JobSubmitter};
