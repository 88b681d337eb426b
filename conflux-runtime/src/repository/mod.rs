//! Repository layer
//!
//! Resolves a pipeline version from the backend stores. Repositories are
//! trait-based so the runtime can be driven by fakes in tests.

mod pipeline;

pub use pipeline::{PipelineRepository, ResolveError, StorePipelineRepository};
