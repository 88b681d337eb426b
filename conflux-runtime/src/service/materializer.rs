//! Artifact materializer
//!
//! Writes the artifacts of a resolved version into the working directory,
//! using each artifact key as a relative file path. The pipeline definition
//! itself stays in memory.

use async_trait::async_trait;
use conflux_core::domain::pipeline::PipelineVersion;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("unable to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to write file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The key would resolve outside the working directory
    #[error("artifact key {0} escapes the working directory")]
    InvalidKey(String),
}

/// Service trait for writing artifacts to disk
#[async_trait]
pub trait Materializer: Send + Sync {
    /// Writes every artifact under `work_dir`, overwriting existing files
    ///
    /// # Returns
    /// The paths that were written
    async fn materialize(
        &self,
        pipeline: &PipelineVersion,
        work_dir: &Path,
    ) -> Result<Vec<PathBuf>, MaterializeError>;
}

/// Materializer writing to the local filesystem
#[derive(Debug, Default)]
pub struct FsMaterializer;

impl FsMaterializer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Materializer for FsMaterializer {
    async fn materialize(
        &self,
        pipeline: &PipelineVersion,
        work_dir: &Path,
    ) -> Result<Vec<PathBuf>, MaterializeError> {
        info!(
            pipeline = %pipeline.key,
            version = %pipeline.version,
            "Loading artifacts into {}",
            work_dir.display()
        );

        let mut written = Vec::with_capacity(pipeline.artifacts.len());

        for key in pipeline.artifact_keys() {
            let target = target_path(work_dir, key)?;
            info!(pipeline = %pipeline.key, version = %pipeline.version, "Loading artifact {}", key);

            if let Some(dir) = target.parent() {
                tokio::fs::create_dir_all(dir)
                    .await
                    .map_err(|source| MaterializeError::CreateDir {
                        path: dir.to_path_buf(),
                        source,
                    })?;
            }

            tokio::fs::write(&target, &pipeline.artifacts[key])
                .await
                .map_err(|source| MaterializeError::Write {
                    path: target.clone(),
                    source,
                })?;

            written.push(target);
        }

        Ok(written)
    }
}

/// Joins an artifact key onto the working directory
///
/// Leading separators are dropped so keys always stay relative; parent
/// directory segments are rejected.
fn target_path(work_dir: &Path, key: &str) -> Result<PathBuf, MaterializeError> {
    let relative = Path::new(key.trim_start_matches('/'));

    let mut target = work_dir.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => target.push(segment),
            Component::CurDir => {}
            _ => return Err(MaterializeError::InvalidKey(key.to_string())),
        }
    }

    if target == work_dir {
        return Err(MaterializeError::InvalidKey(key.to_string()));
    }

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn version_with(artifacts: &[(&str, &[u8])]) -> PipelineVersion {
        PipelineVersion {
            key: "orders".to_string(),
            name: "Orders".to_string(),
            version: "1.0.0".to_string(),
            content: b"definition".to_vec(),
            artifacts: artifacts
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_vec()))
                .collect::<HashMap<_, _>>(),
        }
    }

    #[tokio::test]
    async fn test_materialize_creates_nested_directories() {
        let temp = tempfile::tempdir().unwrap();
        let pv = version_with(&[("lib/a.so", b"so"), ("config.json", b"{}")]);

        let written = FsMaterializer::new()
            .materialize(&pv, temp.path())
            .await
            .unwrap();

        assert_eq!(
            written,
            vec![temp.path().join("config.json"), temp.path().join("lib/a.so")]
        );
        assert_eq!(std::fs::read(temp.path().join("lib/a.so")).unwrap(), b"so");
        assert_eq!(std::fs::read(temp.path().join("config.json")).unwrap(), b"{}");
    }

    #[tokio::test]
    async fn test_definition_is_not_written() {
        let temp = tempfile::tempdir().unwrap();
        let pv = version_with(&[]);

        let written = FsMaterializer::new()
            .materialize(&pv, temp.path())
            .await
            .unwrap();

        assert!(written.is_empty());
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_materialize_is_idempotent() {
        let temp = tempfile::tempdir().unwrap();
        let pv = version_with(&[("lib/a.so", b"so"), ("data/x.csv", b"1,2")]);
        let materializer = FsMaterializer::new();

        materializer.materialize(&pv, temp.path()).await.unwrap();
        let first = std::fs::read(temp.path().join("data/x.csv")).unwrap();

        materializer.materialize(&pv, temp.path()).await.unwrap();
        let second = std::fs::read(temp.path().join("data/x.csv")).unwrap();

        assert_eq!(first, second);
        assert_eq!(std::fs::read(temp.path().join("lib/a.so")).unwrap(), b"so");
    }

    #[tokio::test]
    async fn test_existing_file_is_overwritten() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("config.json"), b"stale").unwrap();

        let pv = version_with(&[("config.json", b"fresh")]);
        FsMaterializer::new()
            .materialize(&pv, temp.path())
            .await
            .unwrap();

        assert_eq!(std::fs::read(temp.path().join("config.json")).unwrap(), b"fresh");
    }

    #[tokio::test]
    async fn test_directory_error_reports_path() {
        let temp = tempfile::tempdir().unwrap();
        // A file where a directory is needed
        std::fs::write(temp.path().join("lib"), b"not a dir").unwrap();

        let pv = version_with(&[("lib/a.so", b"so")]);
        let err = FsMaterializer::new()
            .materialize(&pv, temp.path())
            .await
            .unwrap_err();

        match err {
            MaterializeError::CreateDir { path, .. } => assert_eq!(path, temp.path().join("lib")),
            other => panic!("expected directory error, got {other:?}"),
        }
    }

    #[test]
    fn test_target_path() {
        let work_dir = Path::new("/tmp/work");
        assert_eq!(
            target_path(work_dir, "lib/a.so").unwrap(),
            PathBuf::from("/tmp/work/lib/a.so")
        );
        assert_eq!(
            target_path(work_dir, "/lib/a.so").unwrap(),
            PathBuf::from("/tmp/work/lib/a.so")
        );
        assert!(target_path(work_dir, "../etc/passwd").is_err());
        assert!(target_path(work_dir, "lib/../../x").is_err());
        assert!(target_path(work_dir, "/").is_err());
    }
}
