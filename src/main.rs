use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use incmon::cli::{self, WatchOptions};
use incmon::config::AppConfig;
use incmon::context::AppContext;
use incmon::core::{IncidentDraft, PollOutcome};
use incmon::logging;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "incmon")]
#[command(about = "Submit incident analysis jobs and follow their progress", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ./incmon.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: ConfigArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a new incident for analysis
    Submit(SubmitArgs),
    /// Follow a job until it completes or fails
    Watch {
        job_id: String,
        /// Also print each snapshot as JSON
        #[arg(long)]
        raw: bool,
    },
    /// List all incident jobs
    List,
    /// Print the effective configuration
    Config,
}

#[derive(Args)]
struct SubmitArgs {
    #[arg(long, short)]
    description: String,

    /// Read log lines from a file ("-" for stdin)
    #[arg(long, conflicts_with = "log")]
    logs_file: Option<PathBuf>,

    /// A single log line; may be repeated
    #[arg(long)]
    log: Vec<String>,

    /// Metrics as a JSON object
    #[arg(long, conflicts_with = "metrics_file")]
    metrics: Option<String>,

    #[arg(long)]
    metrics_file: Option<PathBuf>,

    /// Follow the job after submitting
    #[arg(long)]
    watch: bool,
}

#[derive(Args, Serialize)]
struct ConfigArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    poll_interval_ms: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    request_timeout_secs: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    verbose: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    json_logs: Option<bool>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let config = AppConfig::load(args.config.as_deref(), Some(&args.overrides))?;
    logging::init(config.log_config());

    match args.command {
        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
        Commands::List => {
            let ctx = AppContext::new(config)?;
            cli::run_list(&ctx).await?;
        }
        Commands::Watch { job_id, raw } => {
            let ctx = AppContext::new(config)?;
            watch(&ctx, &job_id, WatchOptions { raw }).await?;
        }
        Commands::Submit(submit) => {
            let ctx = AppContext::new(config)?;
            let draft = read_draft(&submit)?;
            let job_id = cli::run_submit(&ctx, &draft).await?;
            if submit.watch {
                watch(&ctx, &job_id, WatchOptions::default()).await?;
            }
        }
    }

    Ok(())
}

async fn watch(ctx: &AppContext, job_id: &str, options: WatchOptions) -> Result<()> {
    match cli::run_watch(ctx, job_id, options).await? {
        PollOutcome::Failed(job) => anyhow::bail!("Incident job {} failed", job.job_id),
        PollOutcome::Completed(_) | PollOutcome::Cancelled => Ok(()),
    }
}

fn read_draft(args: &SubmitArgs) -> Result<IncidentDraft> {
    let logs = match &args.logs_file {
        Some(path) => read_text(path).context("Failed to read logs")?,
        None => args.log.join("\n"),
    };

    let metrics = match (&args.metrics, &args.metrics_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => read_text(path).context("Failed to read metrics")?,
        (None, None) => String::new(),
    };

    Ok(IncidentDraft {
        description: args.description.clone(),
        logs,
        metrics,
    })
}

fn read_text(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        return std::io::read_to_string(std::io::stdin()).context("Failed to read stdin");
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
