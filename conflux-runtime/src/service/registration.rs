//! Service registration
//!
//! Advertises the running pipeline as a discoverable service. Instances of
//! the same pipeline register with the same queue group and share inbound
//! work.

use anyhow::{Context, Result, anyhow};
use async_nats::service::ServiceExt;
use async_trait::async_trait;
use conflux_core::domain::service::{ServiceConfig, ServiceInfo};
use tracing::info;

/// Service trait for registering the runtime
#[async_trait]
pub trait ServiceRegistrar: Send + Sync {
    /// Registers a service and returns a handle that deregisters it on `stop`
    async fn register(&self, config: ServiceConfig) -> Result<Box<dyn Registration>>;
}

/// A live service registration
#[async_trait]
pub trait Registration: Send + Sync {
    /// Current registration info
    async fn info(&self) -> Result<ServiceInfo>;

    /// Deregisters the service
    async fn stop(self: Box<Self>) -> Result<()>;
}

/// Registrar using the NATS micro-service API
pub struct NatsRegistrar {
    client: async_nats::Client,
}

impl NatsRegistrar {
    pub fn new(client: async_nats::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ServiceRegistrar for NatsRegistrar {
    async fn register(&self, config: ServiceConfig) -> Result<Box<dyn Registration>> {
        let service = self
            .client
            .service_builder()
            .description(config.description.clone())
            .queue_group(config.queue_group.clone())
            .start(config.name.clone(), config.version.clone())
            .await
            .map_err(|e| anyhow!("Failed to start service {}: {}", config.name, e))?;

        info!(
            "Registered service {} version {} in queue group {}",
            config.name, config.version, config.queue_group
        );

        Ok(Box::new(NatsRegistration { service }))
    }
}

struct NatsRegistration {
    service: async_nats::service::Service,
}

#[async_trait]
impl Registration for NatsRegistration {
    async fn info(&self) -> Result<ServiceInfo> {
        let info = self.service.info().await;
        let value = serde_json::to_value(&info).context("Failed to encode service info")?;
        serde_json::from_value(value).context("Failed to decode service info")
    }

    async fn stop(self: Box<Self>) -> Result<()> {
        self.service
            .stop()
            .await
            .map_err(|e| anyhow!("Failed to stop service: {}", e))
    }
}
