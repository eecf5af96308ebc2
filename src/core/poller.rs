//! Polling lifecycle for a single incident job.
//!
//! Each [`IncidentPoller`] owns one job id and runs in its own task. It keeps
//! at most one request in flight: the next fetch is scheduled only after the
//! previous one settles. Every snapshot is turned into stage views and handed
//! to the observer callback. The task stops on the first terminal snapshot
//! (after delivering it) or when the returned [`PollHandle`] is cancelled.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Level, debug, info, warn};

use super::models::{Job, JobStatus};
use super::pipeline::{INCIDENT_PIPELINE, PipelineStage};
use super::steps::{StageView, derive_stage_views};
use crate::api::IncidentApi;
use crate::error::ApiError;
use crate::logging::LogThrottle;

/// Reference poll cadence.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Minimum spacing between `warn`-level poll failure logs.
const FAILURE_LOG_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Polling,
    Stopped(StopReason),
}

/// Inputs to the poller state machine.
#[derive(Debug, Clone, Copy)]
pub enum PollEvent<'a> {
    Start,
    Snapshot(&'a Job),
    FetchFailed,
    Cancel,
}

impl PollerState {
    /// The one transition rule. `Stopped` absorbs every event.
    pub fn transition(self, event: PollEvent<'_>) -> PollerState {
        match (self, event) {
            (PollerState::Stopped(reason), _) => PollerState::Stopped(reason),
            (_, PollEvent::Cancel) => PollerState::Stopped(StopReason::Cancelled),
            (PollerState::Idle, PollEvent::Start) => PollerState::Polling,
            (PollerState::Idle, _) => PollerState::Idle,
            (PollerState::Polling, PollEvent::Snapshot(job)) if job.status.is_terminal() => {
                if job.status == JobStatus::Completed {
                    PollerState::Stopped(StopReason::Completed)
                } else {
                    PollerState::Stopped(StopReason::Failed)
                }
            }
            (PollerState::Polling, PollEvent::Snapshot(_)) => PollerState::Polling,
            (PollerState::Polling, PollEvent::Start | PollEvent::FetchFailed) => {
                PollerState::Polling
            }
        }
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, PollerState::Stopped(_))
    }
}

/// One delivered poll result.
#[derive(Debug, Clone)]
pub struct JobUpdate {
    pub snapshot: Job,
    pub stages: Vec<StageView>,
    /// Error text of a failed job whose step matched no stage.
    pub failure_reason: Option<String>,
}

impl JobUpdate {
    pub fn new(pipeline: &[PipelineStage], snapshot: Job) -> Self {
        let stages = derive_stage_views(pipeline, &snapshot);
        let failure_reason = snapshot.failure_reason(pipeline).map(str::to_string);
        Self {
            snapshot,
            stages,
            failure_reason,
        }
    }
}

/// How a poller finished.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Completed(Job),
    Failed(Job),
    Cancelled,
}

/// Polls one job until it reaches a terminal status.
pub struct IncidentPoller {
    api: Arc<dyn IncidentApi>,
    job_id: String,
    interval: Duration,
    pipeline: &'static [PipelineStage],
}

impl IncidentPoller {
    pub fn new(api: Arc<dyn IncidentApi>, job_id: impl Into<String>) -> Self {
        Self {
            api,
            job_id: job_id.into(),
            interval: DEFAULT_POLL_INTERVAL,
            pipeline: &INCIDENT_PIPELINE,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_pipeline(mut self, pipeline: &'static [PipelineStage]) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Start polling. The first fetch happens immediately; `on_update` is
    /// called synchronously with every snapshot, in fetch order.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn subscribe<F>(self, on_update: F) -> PollHandle
    where
        F: FnMut(JobUpdate) + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let (state_tx, state_rx) = watch::channel(PollerState::Idle);
        let task = tokio::spawn(self.run(on_update, cancel.clone(), state_tx));

        PollHandle {
            cancel,
            state: state_rx,
            task,
        }
    }

    async fn run<F>(
        self,
        mut on_update: F,
        cancel: CancellationToken,
        state_tx: watch::Sender<PollerState>,
    ) -> PollOutcome
    where
        F: FnMut(JobUpdate) + Send + 'static,
    {
        let failures = FailureLog::new(FAILURE_LOG_INTERVAL);
        let mut state = PollerState::Idle.transition(PollEvent::Start);
        state_tx.send_replace(state);
        info!(job_id = %self.job_id, interval = ?self.interval, "Polling incident job");

        loop {
            let fetched = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                result = self.api.get_incident(&self.job_id) => Some(result),
            };

            // A result that settles after cancellation is dropped here.
            let fetched = match fetched {
                Some(result) if !cancel.is_cancelled() => result,
                _ => return self.cancelled(state, &state_tx),
            };

            match fetched {
                Ok(job) => {
                    failures.recovered();
                    debug!(
                        job_id = %self.job_id,
                        status = %job.status,
                        step = job.step.as_deref().unwrap_or("-"),
                        "Fetched job snapshot"
                    );
                    state = state.transition(PollEvent::Snapshot(&job));
                    state_tx.send_replace(state);

                    let outcome = match state {
                        PollerState::Stopped(StopReason::Completed) => {
                            Some(PollOutcome::Completed(job.clone()))
                        }
                        PollerState::Stopped(StopReason::Failed) => {
                            Some(PollOutcome::Failed(job.clone()))
                        }
                        PollerState::Stopped(StopReason::Cancelled) => Some(PollOutcome::Cancelled),
                        _ => None,
                    };

                    on_update(JobUpdate::new(self.pipeline, job));

                    if let Some(outcome) = outcome {
                        info!(job_id = %self.job_id, ?state, "Job reached terminal status, polling stopped");
                        return outcome;
                    }
                }
                Err(e) => {
                    state = state.transition(PollEvent::FetchFailed);
                    self.log_fetch_failure(&e, &failures);
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return self.cancelled(state, &state_tx),
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }

    fn cancelled(&self, state: PollerState, state_tx: &watch::Sender<PollerState>) -> PollOutcome {
        state_tx.send_replace(state.transition(PollEvent::Cancel));
        info!(job_id = %self.job_id, "Polling cancelled");
        PollOutcome::Cancelled
    }

    fn log_fetch_failure(&self, error: &ApiError, failures: &FailureLog) {
        if error.is_not_found() {
            // Freshly created jobs may not be visible yet.
            debug!(job_id = %self.job_id, "Job not found yet, still waiting");
        } else if failures.level() == Level::WARN {
            warn!(job_id = %self.job_id, error = %error, "Poll failed, retrying");
        } else {
            debug!(job_id = %self.job_id, error = %error, "Poll failed, retrying");
        }
    }
}

/// Picks the log level for poll failures: one warning per window during an
/// outage, and a fresh warning for the first failure after a recovery.
struct FailureLog {
    throttle: LogThrottle,
}

impl FailureLog {
    fn new(interval: Duration) -> Self {
        Self {
            throttle: LogThrottle::new(interval),
        }
    }

    fn level(&self) -> Level {
        if self.throttle.should_log() {
            Level::WARN
        } else {
            Level::DEBUG
        }
    }

    /// A fetch succeeded.
    fn recovered(&self) {
        self.throttle.reset();
    }
}

/// Cancellation handle for a running poller.
///
/// Dropping the handle does not stop the poller; call [`PollHandle::cancel`].
pub struct PollHandle {
    cancel: CancellationToken,
    state: watch::Receiver<PollerState>,
    task: JoinHandle<PollOutcome>,
}

impl PollHandle {
    /// Stop polling. A fetch that settles after this call is discarded, even
    /// if the request was already in flight.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn state(&self) -> PollerState {
        *self.state.borrow()
    }

    /// Token that cancels this poller when triggered.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the poller to stop.
    pub async fn finished(self) -> Result<PollOutcome, tokio::task::JoinError> {
        self.task.await
    }
}
