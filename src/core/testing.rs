//! Scripted in-memory `IncidentApi` for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{Notify, oneshot};

use super::models::{Job, JobStatus};
use crate::api::{CreateIncidentRequest, IncidentApi};
use crate::error::ApiError;

pub fn job(id: &str, status: JobStatus, step: Option<&str>) -> Job {
    Job {
        job_id: id.to_string(),
        status,
        step: step.map(str::to_string),
        result: None,
    }
}

/// What the next `get_incident` call returns.
pub enum Fetch {
    Ready(Result<Job, ApiError>),
    /// Resolves only once the sender fires.
    Gated(oneshot::Receiver<Job>),
}

#[derive(Default)]
pub struct ScriptedApi {
    creates: Mutex<VecDeque<Result<Job, ApiError>>>,
    created: Mutex<Vec<CreateIncidentRequest>>,
    fetches: Mutex<VecDeque<Fetch>>,
    fetch_count: AtomicUsize,
    fetch_started: Notify,
    listing: Mutex<Vec<Job>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_create(&self, result: Result<Job, ApiError>) {
        self.creates.lock().unwrap().push_back(result);
    }

    pub fn push_fetch(&self, result: Result<Job, ApiError>) {
        self.fetches.lock().unwrap().push_back(Fetch::Ready(result));
    }

    pub fn push_gated_fetch(&self) -> oneshot::Sender<Job> {
        let (tx, rx) = oneshot::channel();
        self.fetches.lock().unwrap().push_back(Fetch::Gated(rx));
        tx
    }

    pub fn set_listing(&self, jobs: Vec<Job>) {
        *self.listing.lock().unwrap() = jobs;
    }

    pub fn created_requests(&self) -> Vec<CreateIncidentRequest> {
        self.created.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    /// Wait until at least `n` fetches have started.
    pub async fn wait_for_fetches(&self, n: usize) {
        loop {
            let notified = self.fetch_started.notified();
            if self.fetch_count() >= n {
                return;
            }
            notified.await;
        }
    }
}

#[async_trait]
impl IncidentApi for ScriptedApi {
    async fn create_incident(&self, request: &CreateIncidentRequest) -> Result<Job, ApiError> {
        self.created.lock().unwrap().push(request.clone());
        self.creates
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(job("created", JobStatus::Processing, None)))
    }

    async fn get_incident(&self, job_id: &str) -> Result<Job, ApiError> {
        let next = self.fetches.lock().unwrap().pop_front();
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        self.fetch_started.notify_waiters();

        match next {
            Some(Fetch::Ready(result)) => result,
            Some(Fetch::Gated(rx)) => rx.await.map_err(|_| ApiError::Status {
                status: 599,
                body: "gate dropped".to_string(),
            }),
            None => Err(ApiError::NotFound {
                job_id: job_id.to_string(),
            }),
        }
    }

    async fn list_incidents(&self) -> Result<Vec<Job>, ApiError> {
        Ok(self.listing.lock().unwrap().clone())
    }
}
