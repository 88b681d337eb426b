//! Core domain types
//!
//! Records read from the metadata store, the resolved in-memory form of a
//! pipeline version, and the service identity advertised while it runs.

pub mod log;
pub mod pipeline;
pub mod service;
