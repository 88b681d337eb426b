//! Runtime error types
//!
//! Every setup failure surfaces here and ends the process.

use conflux_client::ClientError;
use thiserror::Error;

use crate::repository::ResolveError;
use crate::service::MaterializeError;

#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A required run parameter is missing
    #[error("{0}")]
    Config(String),

    #[error("Unable to connect to the backend: {0}")]
    Connect(#[source] ClientError),

    #[error("Unable to open the repository: {0}")]
    Repository(#[source] ClientError),

    #[error("Unable to get pipeline: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Unable to load pipeline: {0}")]
    Materialize(#[from] MaterializeError),

    #[error("Unable to add service: {0:#}")]
    Register(anyhow::Error),

    #[error("Unable to run pipeline: {0:#}")]
    Execution(anyhow::Error),
}
