//! Conflux Engine
//!
//! Embedded pipeline engine used by the Conflux runtime.
//! It includes:
//! - Module trait and registry for Lua modules
//! - A restricted sandbox for evaluating pipeline definitions
//! - Core module implementations (log, env)
//! - Stream building and cancellable execution

pub mod definition;
pub mod module;
pub mod modules;
pub mod sandbox;
pub mod stream;

pub use definition::{StageDefinition, StreamDefinition};
pub use module::{EngineModule, ModuleRegistry};
pub use modules::{EnvModule, LogModule, LogSink, VarProvider};
pub use sandbox::create_sandbox;
pub use stream::{Stream, StreamBuilder};

pub use conflux_core::domain::log::LogLevel;
