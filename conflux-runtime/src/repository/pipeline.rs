//! Pipeline repository
//!
//! Walks the metadata namespace for a (pipeline, version) pair and fetches
//! every blob the version references:
//! - Pipeline identity at `{prefix}.pipeline.{key}`
//! - Version record at `{prefix}.pipeline.{key}.version.{version}`
//! - Definition at `{blob_root}/{content_key}`
//! - Artifacts at `{blob_root}.{artifact_key}`
//!
//! Resolution is a single attempt and all-or-nothing.

use async_trait::async_trait;
use conflux_client::{ClientError, StoreClient};
use conflux_core::domain::pipeline::{PipelineIdentity, PipelineVersion, VersionRecord};
use conflux_core::namespace::{self, Namespace};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while resolving a pipeline version
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("unable to get pipeline {key}: {source}")]
    Pipeline {
        key: String,
        #[source]
        source: ClientError,
    },

    #[error("unable to get version {version}: {source}")]
    Version {
        version: String,
        #[source]
        source: ClientError,
    },

    #[error("unable to get entrypoint {path}: {source}")]
    Entrypoint {
        path: String,
        #[source]
        source: ClientError,
    },

    #[error("unable to get artifact {key}: {source}")]
    Artifact {
        key: String,
        #[source]
        source: ClientError,
    },
}

/// Repository trait for resolving pipeline versions
#[async_trait]
pub trait PipelineRepository: Send + Sync {
    /// Resolves a pipeline version with its definition and artifacts
    ///
    /// # Arguments
    /// * `key` - The pipeline key
    /// * `version` - The version to resolve
    async fn resolve(&self, key: &str, version: &str) -> Result<PipelineVersion, ResolveError>;
}

/// Repository backed by a [`StoreClient`]
pub struct StorePipelineRepository {
    client: StoreClient,
    namespace: Namespace,
}

impl StorePipelineRepository {
    /// Creates a repository; `namespace` applies to every key it derives
    pub fn new(client: StoreClient, namespace: Namespace) -> Self {
        Self { client, namespace }
    }
}

#[async_trait]
impl PipelineRepository for StorePipelineRepository {
    async fn resolve(&self, key: &str, version: &str) -> Result<PipelineVersion, ResolveError> {
        debug!("Getting pipeline {}", key);

        let pipeline_path = self.namespace.pipeline_path(key);
        let identity: PipelineIdentity = self
            .client
            .get_metadata(&pipeline_path)
            .await
            .map_err(|source| ResolveError::Pipeline {
                key: key.to_string(),
                source,
            })?;

        let version_path = self.namespace.version_path(key, version);
        let record: VersionRecord = self
            .client
            .get_metadata(&version_path)
            .await
            .map_err(|source| ResolveError::Version {
                version: version.to_string(),
                source,
            })?;

        let blob_root = namespace::blob_root(&version_path);

        let content_path = namespace::content_path(&blob_root, &record.content_key);
        let content = self
            .client
            .get_blob(&content_path)
            .await
            .map_err(|source| ResolveError::Entrypoint {
                path: content_path.clone(),
                source,
            })?;

        let mut artifacts = HashMap::new();
        for artifact_key in record.artifact_keys() {
            let path = namespace::artifact_path(&blob_root, artifact_key);
            let bytes = self
                .client
                .get_blob(&path)
                .await
                .map_err(|source| ResolveError::Artifact {
                    key: artifact_key.to_string(),
                    source,
                })?;

            artifacts.insert(artifact_key.to_string(), bytes);
        }

        info!(
            "Resolved pipeline {} version {} ({} artifact(s))",
            identity.key,
            record.version,
            artifacts.len()
        );

        Ok(PipelineVersion {
            key: identity.key,
            name: identity.name,
            version: record.version,
            content,
            artifacts,
        })
    }
}
