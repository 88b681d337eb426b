//! Pipeline domain types

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

use crate::domain::service::ServiceConfig;

/// Identity record of a pipeline family
///
/// Stored once per pipeline key in the metadata store by the publishing side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PipelineIdentity {
    pub key: String,
    pub name: String,
}

/// One published revision of a pipeline
///
/// `content_key` names the blob holding the pipeline definition,
/// `artifact_keys` the blobs that must be present next to it at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VersionRecord {
    pub version: String,
    pub content_key: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub artifact_keys: Vec<String>,
    #[serde(default)]
    pub status: String,
}

impl VersionRecord {
    /// Artifact keys to fetch, in publishing order, without empty placeholders
    pub fn artifact_keys(&self) -> impl Iterator<Item = &str> {
        self.artifact_keys
            .iter()
            .map(String::as_str)
            .filter(|key| !key.is_empty())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A pipeline version with all of its blobs fetched into memory
///
/// Built fresh for every run and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineVersion {
    pub key: String,
    pub name: String,
    pub version: String,
    /// The pipeline definition handed to the engine
    pub content: Vec<u8>,
    /// Supporting files keyed by their relative path
    pub artifacts: HashMap<String, Vec<u8>>,
}

impl PipelineVersion {
    /// Service registration parameters for this version
    ///
    /// The queue group is the pipeline key so every instance of the same
    /// pipeline shares inbound work.
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            name: format!("conflux-{}", self.key),
            version: self.version.clone(),
            description: self.name.clone(),
            queue_group: self.key.clone(),
        }
    }

    /// The pipeline definition as text
    pub fn definition(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.content)
    }

    /// Artifact keys in sorted order
    pub fn artifact_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.artifacts.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}
