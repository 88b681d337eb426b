//! Execution service
//!
//! Hands the resolved pipeline definition to the embedded engine and blocks
//! until the stream finishes or the run is cancelled. The definition is
//! passed in memory; it is never written to the working directory.

use anyhow::{Context, Result};
use async_trait::async_trait;
use conflux_core::domain::pipeline::PipelineVersion;
use conflux_engine::{EnvModule, LogModule, ModuleRegistry, StreamBuilder};
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::service::sinks::{RuntimeVarProvider, TracingLogSink};

/// Service trait for executing a resolved pipeline
#[async_trait]
pub trait ExecutionService: Send + Sync {
    /// Builds and runs the pipeline definition
    ///
    /// # Arguments
    /// * `pipeline` - The resolved pipeline version
    /// * `vars` - Runtime variables readable from the definition
    /// * `cancel` - Stops the run when cancelled
    async fn execute(
        &self,
        pipeline: &PipelineVersion,
        vars: HashMap<String, String>,
        cancel: CancellationToken,
    ) -> Result<()>;
}

/// Execution service backed by the embedded engine
#[derive(Debug, Default)]
pub struct EngineExecutionService;

impl EngineExecutionService {
    pub fn new() -> Self {
        Self
    }

    fn create_registry(pipeline: &PipelineVersion, vars: HashMap<String, String>) -> ModuleRegistry {
        let mut registry = ModuleRegistry::new();
        registry.register(LogModule::new(TracingLogSink::new(pipeline.key.clone())));
        registry.register(EnvModule::new(RuntimeVarProvider::new(vars)));
        registry
    }
}

#[async_trait]
impl ExecutionService for EngineExecutionService {
    async fn execute(
        &self,
        pipeline: &PipelineVersion,
        vars: HashMap<String, String>,
        cancel: CancellationToken,
    ) -> Result<()> {
        let definition = pipeline
            .definition()
            .context("Pipeline definition is not valid UTF-8")?;

        let registry = Self::create_registry(pipeline, vars);
        let stream = StreamBuilder::new(&registry)
            .build(definition)
            .context("Unable to build stream")?;

        info!(
            "Starting pipeline {} version {} ({} stage(s))",
            pipeline.key,
            pipeline.version,
            stream.stage_names().len()
        );

        stream.run(cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline(definition: &str) -> PipelineVersion {
        PipelineVersion {
            key: "orders".to_string(),
            name: "Orders".to_string(),
            version: "1.0.0".to_string(),
            content: definition.as_bytes().to_vec(),
            artifacts: HashMap::new(),
        }
    }

    fn vars() -> HashMap<String, String> {
        HashMap::from([
            ("pipeline".to_string(), "orders".to_string()),
            ("version".to_string(), "1.0.0".to_string()),
        ])
    }

    #[tokio::test]
    async fn test_execute_reads_runtime_vars() {
        let pv = pipeline(
            r#"
            return {
                name = "orders",
                stages = {
                    { name = "check", script = function()
                        if env.require("pipeline") ~= "orders" then error("wrong pipeline") end
                        log.info("running " .. env.get("version"))
                    end },
                },
            }
        "#,
        );

        EngineExecutionService::new()
            .execute(&pv, vars(), CancellationToken::new())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_build_error_is_reported() {
        let pv = pipeline("input:\n  generate: {}\n");

        let err = EngineExecutionService::new()
            .execute(&pv, vars(), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("Unable to build stream"));
    }

    #[tokio::test]
    async fn test_run_error_is_reported() {
        let pv = pipeline(
            r#"return { name = "x", stages = { { name = "fail", script = function() env.require("missing") end } } }"#,
        );

        let err = EngineExecutionService::new()
            .execute(&pv, vars(), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Stage 'fail' failed"));
    }

    #[tokio::test]
    async fn test_invalid_utf8_definition() {
        let mut pv = pipeline("");
        pv.content = vec![0xff, 0x00];

        let result = EngineExecutionService::new()
            .execute(&pv, vars(), CancellationToken::new())
            .await;
        assert!(result.is_err());
    }
}
