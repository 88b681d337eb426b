//! Concrete implementations of LogSink and VarProvider for the runtime
//!
//! Script logs are forwarded to `tracing`, tagged with the pipeline key.
//! Runtime variables (pipeline key, version, work directory) are readable
//! through the `env` module.

use conflux_core::domain::log::LogLevel;
use conflux_engine::{LogSink, VarProvider};
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

/// Log sink writing script messages to `tracing`
pub struct TracingLogSink {
    pipeline: String,
}

impl TracingLogSink {
    pub fn new(pipeline: impl Into<String>) -> Self {
        Self {
            pipeline: pipeline.into(),
        }
    }
}

impl LogSink for TracingLogSink {
    fn write(&mut self, level: LogLevel, message: &str) {
        let pipeline = self.pipeline.as_str();
        match level {
            LogLevel::Debug => debug!(pipeline, "{}", message),
            LogLevel::Info => info!(pipeline, "{}", message),
            LogLevel::Warning => warn!(pipeline, "{}", message),
            LogLevel::Error => error!(pipeline, "{}", message),
        }
    }
}

/// Variable provider over a fixed map of runtime variables
pub struct RuntimeVarProvider {
    vars: HashMap<String, String>,
}

impl RuntimeVarProvider {
    pub fn new(vars: HashMap<String, String>) -> Self {
        Self { vars }
    }
}

impl VarProvider for RuntimeVarProvider {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.vars.keys().cloned().collect()
    }
}
