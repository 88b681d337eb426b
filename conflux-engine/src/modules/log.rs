//! Logging module for pipeline scripts
//!
//! Exposes `log.debug`, `log.info`, `log.warning` and `log.error`.
//! Messages are forwarded to a [`LogSink`] chosen by the embedding process.

use crate::module::EngineModule;
use conflux_core::domain::log::LogLevel;
use mlua::prelude::*;
use std::sync::{Arc, Mutex};

/// Destination for messages logged by scripts
pub trait LogSink: Send + Sync {
    /// Write a log message
    fn write(&mut self, level: LogLevel, message: &str);
}

/// Logging module, generic over where messages end up
pub struct LogModule<S: LogSink> {
    sink: Arc<Mutex<S>>,
}

impl<S: LogSink> LogModule<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink: Arc::new(Mutex::new(sink)),
        }
    }
}

impl<S: LogSink + 'static> EngineModule for LogModule<S> {
    fn id(&self) -> &'static str {
        "log"
    }

    fn register(&self, lua: &Lua) -> LuaResult<()> {
        let log_table = lua.create_table()?;

        for (name, level) in [
            ("debug", LogLevel::Debug),
            ("info", LogLevel::Info),
            ("warning", LogLevel::Warning),
            ("error", LogLevel::Error),
        ] {
            let sink = self.sink.clone();
            log_table.set(
                name,
                lua.create_function(move |_, msg: String| {
                    sink.lock()
                        .map_err(|e| LuaError::RuntimeError(format!("Failed to lock sink: {}", e)))?
                        .write(level, &msg);
                    Ok(())
                })?,
            )?;
        }

        lua.globals().set(self.id(), log_table)?;
        Ok(())
    }
}
