//! Conflux Backend Client
//!
//! Read-only access to the two stores a pipeline version lives in:
//! a key-value bucket holding JSON metadata records and an object store
//! holding the raw blobs.
//!
//! Storage access goes through the [`Backend`] trait so the NATS
//! implementation can be swapped for the in-memory one in tests.
//!
//! # Example
//!
//! ```no_run
//! use conflux_client::{ConnectOptions, Credentials, NatsBackend, StoreClient};
//! use conflux_core::domain::pipeline::PipelineIdentity;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> conflux_client::Result<()> {
//!     let options = ConnectOptions::new("nats://localhost:4222", "conflux-orders", Credentials::None);
//!     let nats = conflux_client::connect(&options).await?;
//!     let backend = NatsBackend::open(nats, "pipelines", "artifacts").await?;
//!     let client = StoreClient::new(Arc::new(backend));
//!
//!     let identity: PipelineIdentity = client.get_metadata("ns.pipeline.orders").await?;
//!     println!("Resolved pipeline: {}", identity.name);
//!     Ok(())
//! }
//! ```

pub mod error;
mod memory;
mod nats;

pub use error::{ClientError, Result};
pub use memory::MemoryBackend;
pub use nats::{ConnectOptions, Credentials, NatsBackend, connect};

use async_trait::async_trait;
use conflux_core::namespace::normalize_blob_path;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

/// Raw access to a metadata store and a blob store
///
/// Implementations return [`ClientError::NotFound`] when a key or object
/// is absent. Paths handed to `get_object` are already normalized.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Reads the raw value stored under a metadata key
    async fn get_entry(&self, key: &str) -> Result<Vec<u8>>;

    /// Reads the full content of a blob
    async fn get_object(&self, path: &str) -> Result<Vec<u8>>;
}

/// Typed client over a [`Backend`]
///
/// Every call reaches the backend; nothing is cached.
#[derive(Clone)]
pub struct StoreClient {
    backend: Arc<dyn Backend>,
}

impl StoreClient {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Reads a metadata record and decodes it from JSON
    pub async fn get_metadata<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        debug!("Getting metadata {}", key);

        let raw = self.backend.get_entry(key).await?;
        serde_json::from_slice(&raw).map_err(|source| ClientError::Decode {
            key: key.to_string(),
            source,
        })
    }

    /// Reads a blob, adding the leading `/` to the path when missing
    pub async fn get_blob(&self, path: &str) -> Result<Vec<u8>> {
        let path = normalize_blob_path(path);
        debug!("Getting blob {}", path);

        self.backend.get_object(&path).await
    }
}
