//! Command handlers for the `incmon` binary.
//!
//! Everything here is presentation: the handlers drive the core and print
//! what it produces.

pub mod render;

use anyhow::{Context, Result};
use tracing::info;

use crate::context::AppContext;
use crate::core::{IncidentDraft, JobStatus, JobUpdate, PollOutcome, fetch_incidents};

/// Options for following a job.
#[derive(Debug, Clone, Copy, Default)]
pub struct WatchOptions {
    /// Print every snapshot as pretty JSON.
    pub raw: bool,
}

/// Submit a draft and print the new job id.
pub async fn run_submit(ctx: &AppContext, draft: &IncidentDraft) -> Result<String> {
    let job_id = ctx.submitter().submit(draft).await?;
    println!("Submitted incident {}", job_id);
    Ok(job_id)
}

/// Follow a job until it finishes or the user presses Ctrl-C.
pub async fn run_watch(ctx: &AppContext, job_id: &str, options: WatchOptions) -> Result<PollOutcome> {
    let mut last_printed: Option<String> = None;

    let handle = ctx.poller(job_id).subscribe(move |update: JobUpdate| {
        if options.raw {
            match serde_json::to_string_pretty(&update.snapshot) {
                Ok(json) => println!("{}", json),
                Err(e) => tracing::warn!(error = %e, "Failed to encode snapshot"),
            }
        }

        let text = render::render_update(&update);
        if last_printed.as_deref() != Some(text.as_str()) {
            println!("{}", text);
            last_printed = Some(text);
        }

        if update.snapshot.status == JobStatus::Completed {
            print!("{}", render::render_report(update.snapshot.result.as_ref()));
        }
    });

    let cancel = handle.cancellation_token();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, stopping");
            cancel.cancel();
        }
    });

    let outcome = handle.finished().await.context("Poller task failed")?;
    ctrl_c.abort();
    Ok(outcome)
}

/// Print every job the service knows about.
pub async fn run_list(ctx: &AppContext) -> Result<()> {
    let incidents = fetch_incidents(ctx.api.as_ref())
        .await
        .context("Failed to fetch incidents")?;
    print!("{}", render::render_incident_list(&incidents));
    Ok(())
}
