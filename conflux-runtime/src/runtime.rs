//! Runtime orchestrator
//!
//! Drives a single pipeline run from configuration to completion:
//! resolve the version, write its artifacts, register the service, expose
//! the status endpoint and hand the definition to the engine. The service
//! registration is stopped on every exit path once it exists.

use std::collections::HashMap;
use std::sync::Arc;

use conflux_client::{NatsBackend, StoreClient};
use conflux_core::Namespace;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::api;
use crate::config::Config;
use crate::error::RuntimeError;
use crate::repository::{PipelineRepository, StorePipelineRepository};
use crate::service::{
    EngineExecutionService, ExecutionService, FsMaterializer, Materializer, NatsRegistrar,
    ServiceRegistrar,
};

/// Connects to the backend and runs the configured pipeline
///
/// The configuration is validated before any network activity.
pub async fn run(config: &Config, cancel: CancellationToken) -> Result<(), RuntimeError> {
    config.validate()?;

    let client = conflux_client::connect(&config.connect_options())
        .await
        .map_err(RuntimeError::Connect)?;

    let backend = NatsBackend::open(
        client.clone(),
        &config.repo.kv_bucket,
        &config.repo.object_bucket,
    )
    .await
    .map_err(RuntimeError::Repository)?;

    let repository = StorePipelineRepository::new(
        StoreClient::new(Arc::new(backend)),
        Namespace::new(config.repo.prefix.clone()),
    );

    let runtime = Runtime::new(
        Arc::new(repository),
        Arc::new(FsMaterializer::new()),
        Arc::new(NatsRegistrar::new(client)),
        Arc::new(EngineExecutionService::new()),
    );

    runtime.execute(config, cancel).await
}

/// Runs one pipeline version against its collaborators
pub struct Runtime {
    repository: Arc<dyn PipelineRepository>,
    materializer: Arc<dyn Materializer>,
    registrar: Arc<dyn ServiceRegistrar>,
    execution: Arc<dyn ExecutionService>,
}

impl Runtime {
    pub fn new(
        repository: Arc<dyn PipelineRepository>,
        materializer: Arc<dyn Materializer>,
        registrar: Arc<dyn ServiceRegistrar>,
        execution: Arc<dyn ExecutionService>,
    ) -> Self {
        Self {
            repository,
            materializer,
            registrar,
            execution,
        }
    }

    /// Executes the configured pipeline version
    ///
    /// Blocks until the engine finishes or `cancel` fires. A panic raised by
    /// the engine is resumed after the registration has been stopped.
    pub async fn execute(&self, config: &Config, cancel: CancellationToken) -> Result<(), RuntimeError> {
        config.validate()?;

        info!("Resolving pipeline {} version {}", config.pipeline, config.version);
        let pipeline = self
            .repository
            .resolve(&config.pipeline, &config.version)
            .await?;

        self.materializer
            .materialize(&pipeline, &config.work_dir)
            .await?;

        let registration = self
            .registrar
            .register(pipeline.service_config())
            .await
            .map_err(RuntimeError::Register)?;

        let service_info = match registration.info().await {
            Ok(info) => Arc::new(info),
            Err(e) => {
                if let Err(stop) = registration.stop().await {
                    warn!("Failed to stop service registration: {:#}", stop);
                }
                return Err(RuntimeError::Register(e));
            }
        };
        info!(
            "Service {} ({}) registered for pipeline {}",
            service_info.name, service_info.id, pipeline.key
        );

        // Runs until the process exits
        api::spawn_status_server(config.status_addr.clone(), service_info);

        let vars = HashMap::from([
            ("pipeline".to_string(), pipeline.key.clone()),
            ("version".to_string(), pipeline.version.clone()),
            (
                "work_dir".to_string(),
                config.work_dir.display().to_string(),
            ),
        ]);

        let execution = Arc::clone(&self.execution);
        let outcome = tokio::spawn(async move { execution.execute(&pipeline, vars, cancel).await }).await;

        if let Err(e) = registration.stop().await {
            warn!("Failed to stop service registration: {:#}", e);
        }

        match outcome {
            Ok(Ok(())) => {
                info!("Pipeline {} finished", config.pipeline);
                Ok(())
            }
            Ok(Err(e)) => Err(RuntimeError::Execution(e)),
            Err(join) if join.is_panic() => std::panic::resume_unwind(join.into_panic()),
            Err(join) => Err(RuntimeError::Execution(anyhow::anyhow!(
                "Execution task was cancelled: {}",
                join
            ))),
        }
    }
}
