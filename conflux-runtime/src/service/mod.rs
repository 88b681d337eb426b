//! Service layer
//!
//! Services do the work between resolution and shutdown: writing artifacts,
//! registering the service identity and running the pipeline.
//!
//! All services are trait-based to enable testing and dependency injection.

mod execution;
mod materializer;
mod registration;
mod sinks;

// Re-export traits
pub use execution::ExecutionService;
pub use materializer::{MaterializeError, Materializer};
pub use registration::{Registration, ServiceRegistrar};

// Re-export implementations
pub use execution::EngineExecutionService;
pub use materializer::FsMaterializer;
pub use registration::NatsRegistrar;
