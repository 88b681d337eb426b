//! Runtime configuration
//!
//! Built once in `main` from command-line flags and environment variables,
//! then passed by reference to the runtime.

use std::path::PathBuf;

use conflux_client::{ConnectOptions, Credentials};

use crate::error::RuntimeError;

/// Default directory artifacts are written to
pub const DEFAULT_WORK_DIR: &str = "/tmp";

/// Default bind address of the status endpoint
pub const DEFAULT_STATUS_ADDR: &str = "0.0.0.0:8080";

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Key of the pipeline to run
    pub pipeline: String,

    /// Version of the pipeline to run
    pub version: String,

    /// Backend connection and bucket settings
    pub repo: RepoConfig,

    /// Directory artifacts are materialized into
    pub work_dir: PathBuf,

    /// Bind address of the status endpoint (e.g., "0.0.0.0:8080")
    pub status_addr: String,
}

/// Backend connection settings
#[derive(Debug, Clone, Default)]
pub struct RepoConfig {
    /// NATS server URL (e.g., "nats://localhost:4222")
    pub url: String,

    /// Key-value bucket holding pipeline metadata
    pub kv_bucket: String,

    /// Object store bucket holding pipeline blobs
    pub object_bucket: String,

    /// Namespace prefix applied to every metadata key
    pub prefix: String,

    pub creds_file: Option<PathBuf>,
    pub jwt: Option<String>,
    pub seed: Option<String>,
}

impl Config {
    /// Creates a configuration with default work directory and status address
    pub fn new(pipeline: impl Into<String>, version: impl Into<String>, repo: RepoConfig) -> Self {
        Self {
            pipeline: pipeline.into(),
            version: version.into(),
            repo,
            work_dir: PathBuf::from(DEFAULT_WORK_DIR),
            status_addr: DEFAULT_STATUS_ADDR.to_string(),
        }
    }

    /// Validates the configuration
    ///
    /// Runs before any network activity; the pipeline and version are
    /// checked first.
    pub fn validate(&self) -> Result<(), RuntimeError> {
        if self.pipeline.is_empty() {
            return Err(RuntimeError::Config("pipeline is required".to_string()));
        }

        if self.version.is_empty() {
            return Err(RuntimeError::Config("version is required".to_string()));
        }

        if self.repo.url.is_empty() {
            return Err(RuntimeError::Config("repo-url is required".to_string()));
        }

        if self.repo.kv_bucket.is_empty() {
            return Err(RuntimeError::Config("repo-kv is required".to_string()));
        }

        if self.repo.object_bucket.is_empty() {
            return Err(RuntimeError::Config("repo-ob is required".to_string()));
        }

        Ok(())
    }

    /// Connection options for the backend
    ///
    /// The connection is named after the pipeline so it can be told apart
    /// in server monitoring.
    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions::new(
            self.repo.url.clone(),
            format!("conflux-{}", self.pipeline),
            Credentials::from_parts(
                self.repo.creds_file.clone(),
                self.repo.jwt.clone(),
                self.repo.seed.clone(),
            ),
        )
    }
}
