//! Stream definitions
//!
//! A definition is a Lua chunk returning a table:
//!
//! ```lua
//! return {
//!     name = "orders",
//!     description = "Ingest orders",
//!     stages = {
//!         { name = "ingest", script = function() log.info("ingesting") end },
//!         { name = "report", condition = function() return env.has("report") end,
//!           script = function() end },
//!     },
//! }
//! ```
//!
//! Unlike the serializable domain records, a definition holds live Lua
//! function handles and only exists inside the sandbox that evaluated it.

use anyhow::{Context, Result, anyhow, bail};
use mlua::{Function, Lua, Table, Value};

/// Evaluated stream definition with executable stages
pub struct StreamDefinition {
    pub name: String,
    pub description: Option<String>,
    pub stages: Vec<StageDefinition>,
}

/// One stage of a stream
pub struct StageDefinition {
    pub name: String,
    /// Stage is skipped when this returns false
    pub condition: Option<Function>,
    pub script: Function,
}

/// Evaluate a definition in `lua` and extract its stages
///
/// # Errors
/// Returns an error if:
/// - The Lua source is invalid or does not return a table
/// - Required fields are missing (name, stages, stage scripts)
/// - The definition has no stages
pub fn parse_stream_definition(lua: &Lua, source: &str) -> Result<StreamDefinition> {
    let definition: Table = lua
        .load(source)
        .set_name("definition")
        .eval()
        .map_err(|e| anyhow!("Failed to evaluate stream definition: {}", e))?;

    let name: String = definition
        .get("name")
        .map_err(|e| anyhow!("Definition must have a 'name' field: {}", e))?;

    let description: Option<String> = definition.get("description").unwrap_or(None);

    let stages = parse_stages(&definition)?;

    Ok(StreamDefinition {
        name,
        description,
        stages,
    })
}

fn parse_stages(definition: &Table) -> Result<Vec<StageDefinition>> {
    let stages_table = match definition.get::<Value>("stages") {
        Ok(Value::Table(table)) => table,
        Ok(Value::Nil) => bail!("Definition must have a 'stages' field"),
        Ok(_) => bail!("Field 'stages' must be an array of stage tables"),
        Err(e) => return Err(anyhow!("Failed to read 'stages': {}", e)),
    };

    let mut stages = Vec::new();

    for (idx, entry) in stages_table.sequence_values::<Table>().enumerate() {
        let stage_table =
            entry.with_context(|| format!("Stage at index {} is not a table", idx + 1))?;

        let name: String = stage_table
            .get("name")
            .map_err(|e| anyhow!("Stage at index {} must have a 'name' field: {}", idx + 1, e))?;

        let condition: Option<Function> = stage_table
            .get("condition")
            .map_err(|e| anyhow!("Stage '{}' condition must be a function: {}", name, e))?;

        let script: Function = stage_table
            .get("script")
            .map_err(|e| anyhow!("Stage '{}' must have a 'script' function: {}", name, e))?;

        stages.push(StageDefinition {
            name,
            condition,
            script,
        });
    }

    if stages.is_empty() {
        bail!("Definition must have at least one stage");
    }

    Ok(stages)
}
