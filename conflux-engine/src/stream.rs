//! Stream building and execution
//!
//! A [`StreamBuilder`] turns definition text into a runnable [`Stream`]
//! inside a fresh sandbox with the registered modules loaded. Running a
//! stream executes its stages in order on a blocking thread until they
//! finish, one fails, or the cancellation token fires.

use anyhow::{Context, Result, anyhow};
use mlua::{HookTriggers, Lua, VmState};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::definition::{StreamDefinition, parse_stream_definition};
use crate::module::ModuleRegistry;
use crate::sandbox::create_sandbox;

/// VM instructions between two cancellation checks
const CANCEL_CHECK_INTERVAL: u32 = 1_000;

/// Builds streams from definition text
pub struct StreamBuilder<'a> {
    registry: &'a ModuleRegistry,
}

impl<'a> StreamBuilder<'a> {
    pub fn new(registry: &'a ModuleRegistry) -> Self {
        Self { registry }
    }

    /// Evaluates `source` and returns a stream ready to run
    ///
    /// # Errors
    /// Returns an error when the sandbox cannot be created, a module fails
    /// to register, or the definition is invalid.
    pub fn build(&self, source: &str) -> Result<Stream> {
        let lua = create_sandbox().context("Failed to create stream sandbox")?;
        self.registry
            .register_all(&lua)
            .context("Failed to register engine modules")?;

        let definition = parse_stream_definition(&lua, source)?;
        debug!(
            "Built stream '{}' with {} stage(s)",
            definition.name,
            definition.stages.len()
        );

        Ok(Stream { lua, definition })
    }
}

/// A runnable stream
pub struct Stream {
    lua: Lua,
    definition: StreamDefinition,
}

impl Stream {
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.definition
            .stages
            .iter()
            .map(|stage| stage.name.as_str())
            .collect()
    }

    /// Runs every stage to completion
    ///
    /// Cancellation stops the stream at the next check and is not an error.
    /// A panic inside the stream is resumed on the caller's task.
    pub async fn run(self, cancel: CancellationToken) -> Result<()> {
        let handle = tokio::task::spawn_blocking(move || self.run_blocking(&cancel));

        match handle.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => Err(anyhow!("Stream task failed: {}", e)),
        }
    }

    fn run_blocking(self, cancel: &CancellationToken) -> Result<()> {
        let hook_token = cancel.clone();
        self.lua
            .set_hook(
                HookTriggers::new().every_nth_instruction(CANCEL_CHECK_INTERVAL),
                move |_lua, _debug| {
                    if hook_token.is_cancelled() {
                        Err(mlua::Error::runtime("stream cancelled"))
                    } else {
                        Ok(VmState::Continue)
                    }
                },
            )
            .context("Failed to install cancellation hook")?;

        let total = self.definition.stages.len();
        match &self.definition.description {
            Some(description) => info!("Running stream '{}': {}", self.definition.name, description),
            None => info!("Running stream '{}'", self.definition.name),
        }

        for (idx, stage) in self.definition.stages.iter().enumerate() {
            if cancel.is_cancelled() {
                info!("Stream '{}' cancelled before stage '{}'", self.definition.name, stage.name);
                return Ok(());
            }

            if let Some(condition) = &stage.condition {
                let should_run = match condition.call::<bool>(()) {
                    Ok(should_run) => should_run,
                    Err(_) if cancel.is_cancelled() => return Ok(()),
                    Err(e) => {
                        return Err(anyhow!("Stage '{}' condition failed: {}", stage.name, e));
                    }
                };

                if !should_run {
                    debug!("Skipping stage '{}'", stage.name);
                    continue;
                }
            }

            info!("Executing stage {}/{}: {}", idx + 1, total, stage.name);

            match stage.script.call::<()>(()) {
                Ok(()) => debug!("Stage '{}' completed", stage.name),
                Err(_) if cancel.is_cancelled() => {
                    info!("Stream '{}' cancelled during stage '{}'", self.definition.name, stage.name);
                    return Ok(());
                }
                Err(e) => return Err(anyhow!("Stage '{}' failed: {}", stage.name, e)),
            }
        }

        info!("Stream '{}' completed", self.definition.name);
        Ok(())
    }
}
