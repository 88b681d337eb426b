//! Conflux Runtime
//!
//! Runs a single version of a stored pipeline.
//!
//! Architecture:
//! - Configuration: Command-line flags with `CONFLUX_*` environment fallbacks
//! - Repository: Resolves the pipeline version from the key-value and object stores
//! - Services: Artifact materialization, service registration, execution
//! - API: Status endpoint reporting the service registration
//!
//! The process exits once the pipeline finishes, fails, or is interrupted.

mod api;
mod config;
mod error;
mod repository;
mod runtime;
mod service;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, DEFAULT_STATUS_ADDR, DEFAULT_WORK_DIR, RepoConfig};

#[derive(Parser)]
#[command(name = "conflux")]
#[command(about = "Conflux pipeline runtime", long_about = None)]
struct Cli {
    /// Key of the pipeline to run
    #[arg(long, env = "CONFLUX_PIPELINE", default_value = "")]
    pipeline: String,

    /// Version of the pipeline to run
    #[arg(long, env = "CONFLUX_VERSION", default_value = "")]
    version: String,

    /// NATS server URL
    #[arg(long, env = "CONFLUX_REPO_URL", default_value = "")]
    repo_url: String,

    /// Key-value bucket holding pipeline metadata
    #[arg(long, env = "CONFLUX_REPO_KV", default_value = "")]
    repo_kv: String,

    /// Object store bucket holding pipeline blobs
    #[arg(long, env = "CONFLUX_REPO_OB", default_value = "")]
    repo_ob: String,

    /// Namespace prefix of every metadata key
    #[arg(long, env = "CONFLUX_REPO_PREFIX", default_value = "")]
    repo_prefix: String,

    /// NATS credentials file
    #[arg(long, env = "CONFLUX_REPO_CREDS_FILE")]
    repo_creds_file: Option<String>,

    /// User JWT, used together with --repo-seed
    #[arg(long, env = "CONFLUX_REPO_JWT")]
    repo_jwt: Option<String>,

    /// NKey seed, used together with --repo-jwt
    #[arg(long, env = "CONFLUX_REPO_SEED")]
    repo_seed: Option<String>,

    /// Directory artifacts are written to
    #[arg(long, env = "CONFLUX_WORK_DIR", default_value = DEFAULT_WORK_DIR)]
    work_dir: PathBuf,

    /// Bind address of the status endpoint
    #[arg(long, env = "CONFLUX_STATUS_ADDR", default_value = DEFAULT_STATUS_ADDR)]
    status_addr: String,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let mut config = Config::new(
            cli.pipeline,
            cli.version,
            RepoConfig {
                url: cli.repo_url,
                kv_bucket: cli.repo_kv,
                object_bucket: cli.repo_ob,
                prefix: cli.repo_prefix,
                creds_file: cli
                    .repo_creds_file
                    .filter(|path| !path.is_empty())
                    .map(PathBuf::from),
                jwt: cli.repo_jwt,
                seed: cli.repo_seed,
            },
        );
        config.work_dir = cli.work_dir;
        config.status_addr = cli.status_addr;
        config
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "conflux_runtime=info,conflux_engine=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from(Cli::parse());

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, stopping pipeline");
                cancel.cancel();
            }
        }
    });

    info!("Starting Conflux runtime");

    match runtime::run(&config, cancel).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
