//! Plain-text rendering of job updates, reports and listings.

use std::fmt::Write;

use crate::core::{IncidentSummary, JobUpdate, ReportContent, StageStatus, StageView};

fn status_marker(status: StageStatus) -> &'static str {
    match status {
        StageStatus::Completed => "✔",
        StageStatus::Running => "▶",
        StageStatus::Failed => "✘",
        StageStatus::Pending => "○",
    }
}

pub fn render_stages(stages: &[StageView]) -> String {
    let width = stages.iter().map(|s| s.label.len()).max().unwrap_or(0);
    let mut out = String::new();
    for stage in stages {
        let _ = writeln!(
            out,
            "  {} {:<width$}  {}",
            status_marker(stage.status),
            stage.label,
            stage.description,
            width = width
        );
    }
    out
}

/// Header, stage list and, if present, the failure banner.
pub fn render_update(update: &JobUpdate) -> String {
    let job = &update.snapshot;
    let mut out = format!(
        "Incident #{}  [{}]\n",
        job.short_id(),
        job.status.as_str().to_uppercase()
    );
    out.push_str(&render_stages(&update.stages));
    if let Some(reason) = &update.failure_reason {
        let _ = writeln!(out, "  Failed: {}", reason);
    }
    out
}

pub fn render_report(report: Option<&ReportContent>) -> String {
    let Some(report) = report else {
        return "Report is generating...\n".to_string();
    };

    let mut out = String::new();
    let _ = writeln!(out, "Summary\n  {}", report.summary);

    if let Some(cause) = &report.root_cause {
        let _ = writeln!(
            out,
            "Root cause ({:.0}% confidence)\n  {}\n  {}",
            cause.confidence_score * 100.0,
            cause.cause,
            cause.reasoning
        );
    }

    if !report.recommendations.is_empty() {
        out.push_str("Recommendations\n");
        for rec in &report.recommendations {
            let safety = if rec.is_safe { "" } else { "  [review before applying]" };
            let _ = writeln!(out, "  - {}: {}{}", rec.action, rec.description, safety);
        }
    }

    if let Some(at) = report.generated_at {
        let _ = writeln!(out, "Generated {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
    }

    out
}

pub fn render_incident_list(incidents: &[IncidentSummary]) -> String {
    if incidents.is_empty() {
        return "No incidents found.\n".to_string();
    }

    let mut out = String::new();
    for incident in incidents {
        let _ = writeln!(
            out,
            "{:<10} {:<11} {}",
            incident.short_id,
            incident.status.as_str(),
            incident.step.as_deref().unwrap_or("-")
        );
    }
    out
}
