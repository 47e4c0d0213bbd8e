//! Command-line front end for the job service client.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::Value;

use job_relay::config::{load_config, override_host, ClientConfig};
use job_relay::jobs::{Job, JobClient, JobError, Principal};
use job_relay::observability::{init_logging, init_metrics};

#[derive(Parser)]
#[command(name = "job-relay")]
#[command(about = "Submit and observe jobs on a remote job service", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured API host.
    #[arg(long)]
    host: Option<String>,

    /// Bearer token sent with every request.
    #[arg(long, env = "JOB_RELAY_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Identity recorded in logs for submitted jobs.
    #[arg(long, default_value = "cli")]
    principal: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a job and print it
    Submit {
        /// Job type, the last path segment of the create route
        job_type: String,
        /// JSON payload
        #[arg(long)]
        payload: String,
        /// Poll until the job finishes
        #[arg(long)]
        wait: bool,
        /// Poll timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Fetch the current state of a job
    Get { job_id: String },
    /// Poll a job until it finishes or the timeout passes
    Poll {
        job_id: String,
        /// Poll timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };
    if let Some(host) = &cli.host {
        config = override_host(config, host)?;
    }

    init_logging(&config.observability)?;
    tracing::debug!(
        host = %config.api.host,
        requests_per_second = config.rate_limit.requests_per_second,
        max_attempts = config.retries.max_attempts,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let jobs = JobClient::from_config(&config)?;
    let mut principal = Principal::new(cli.principal.clone());
    if let Some(token) = &cli.token {
        principal = principal.with_token(token.clone());
    }

    tokio::select! {
        result = run(&jobs, &principal, cli.command) => {
            let job = result?;
            println!("{}", serde_json::to_string_pretty(&job)?);
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted");
            std::process::exit(130);
        }
    }

    Ok(())
}

async fn run(jobs: &JobClient, principal: &Principal, command: Commands) -> Result<Job, JobError> {
    match command {
        Commands::Submit {
            job_type,
            payload,
            wait,
            timeout_ms,
        } => {
            let payload: Value = serde_json::from_str(&payload).map_err(|e| JobError::InvalidInput {
                field: "payload",
                reason: e.to_string(),
            })?;
            if wait {
                let timeout = timeout_or_default(jobs, timeout_ms);
                jobs.submit_and_wait(&job_type, payload, principal, timeout).await
            } else {
                jobs.submit(&job_type, payload, principal).await
            }
        }
        Commands::Get { job_id } => jobs.fetch(&job_id, principal).await,
        Commands::Poll { job_id, timeout_ms } => {
            let timeout = timeout_or_default(jobs, timeout_ms);
            jobs.poll(&job_id, timeout, principal).await
        }
    }
}

fn timeout_or_default(jobs: &JobClient, timeout_ms: Option<u64>) -> Duration {
    timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| jobs.default_timeout())
}
