//! Error types for the incident monitoring client.

/// Bad user input, caught before anything is sent to the service.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Incident description must not be empty")]
    EmptyDescription,

    #[error("Invalid JSON in metrics field: {0}")]
    InvalidMetrics(#[source] serde_json::Error),

    #[error("Metrics must be a JSON object, got {found}")]
    MetricsNotObject { found: &'static str },
}

/// Errors from the remote incident service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (connect, timeout, TLS, ...).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-2xx status code.
    #[error("Incident service error ({status}): {body}")]
    Status { status: u16, body: String },

    /// The job resource does not exist (yet).
    #[error("Incident job not found: {job_id}")]
    NotFound { job_id: String },

    /// The response body did not match the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}

/// Returned by [`crate::core::JobSubmitter::submit`].
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The creation request failed; no job is assumed to exist.
    #[error("Failed to submit incident, please retry: {0}")]
    Submission(#[source] ApiError),
}

impl SubmitError {
    /// Whether resubmitting the same input could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SubmitError::Submission(_))
    }
}
