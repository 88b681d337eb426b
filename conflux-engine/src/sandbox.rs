//! Lua sandbox creation
//!
//! Pipeline definitions are evaluated in a restricted Lua state without
//! file, process or module loading access. Capabilities reach scripts only
//! through registered modules.

use mlua::{Lua, LuaOptions, Result as LuaResult, StdLib, Table};

/// Create a restricted Lua sandbox
///
/// Only the TABLE, STRING, MATH and COROUTINE libraries are loaded, and
/// `require`, `dofile` and `loadfile` are removed. The `pipeline` helper
/// table is always present.
///
/// # Example
/// ```
/// use conflux_engine::sandbox::create_sandbox;
///
/// let lua = create_sandbox()?;
/// let definition: mlua::Table = lua
///     .load(r#"return pipeline.define({ name = "orders", stages = {} })"#)
///     .eval()?;
/// let name: String = definition.get("name")?;
/// assert_eq!(name, "orders");
/// # Ok::<(), mlua::Error>(())
/// ```
pub fn create_sandbox() -> LuaResult<Lua> {
    let lua = Lua::new_with(
        StdLib::TABLE | StdLib::STRING | StdLib::MATH | StdLib::COROUTINE,
        LuaOptions::default(),
    )?;

    lua.globals().set("require", mlua::Nil)?;
    lua.globals().set("dofile", mlua::Nil)?;
    lua.globals().set("loadfile", mlua::Nil)?;

    register_pipeline_module(&lua)?;

    Ok(lua)
}

/// Register the pipeline helper module
///
/// `pipeline.define` and `pipeline.stage` return their argument unchanged;
/// they only make definitions read declaratively.
fn register_pipeline_module(lua: &Lua) -> LuaResult<()> {
    let pipeline = lua.create_table()?;

    let define_fn = lua.create_function(|_, definition: Table| Ok(definition))?;
    pipeline.set("define", define_fn)?;

    let stage_fn = lua.create_function(|_, config: Table| Ok(config))?;
    pipeline.set("stage", stage_fn)?;

    lua.globals().set("pipeline", pipeline)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sandbox_basic_lua() {
        let lua = create_sandbox().unwrap();

        let result: i32 = lua
            .load(
                r#"
                local t = {a = 1, b = 2}
                return t.a + t.b
            "#,
            )
            .eval()
            .unwrap();
        assert_eq!(result, 3);

        let result: String = lua.load(r#"return string.upper("hello")"#).eval().unwrap();
        assert_eq!(result, "HELLO");
    }

    #[test]
    fn test_sandbox_no_io() {
        let lua = create_sandbox().unwrap();

        let has_io: bool = lua.load(r#"return io ~= nil"#).eval().unwrap();
        assert!(!has_io);

        let has_os: bool = lua.load(r#"return os ~= nil"#).eval().unwrap();
        assert!(!has_os);
    }

    #[test]
    fn test_sandbox_no_require() {
        let lua = create_sandbox().unwrap();

        let result: LuaResult<()> = lua.load(r#"require("os")"#).exec();
        assert!(result.is_err());

        let result: LuaResult<()> = lua.load(r#"dofile("/etc/passwd")"#).exec();
        assert!(result.is_err());
    }

    #[test]
    fn test_sandbox_has_pipeline_helpers() {
        let lua = create_sandbox().unwrap();

        let result: String = lua
            .load(
                r#"
            local s = pipeline.stage({ name = "ingest" })
            local def = pipeline.define({ name = "test", stages = { s } })
            return def.stages[1].name
        "#,
            )
            .eval()
            .unwrap();
        assert_eq!(result, "ingest");
    }
}
