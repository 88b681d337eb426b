//! Environment module for pipeline scripts
//!
//! Gives scripts read access to runtime variables such as the pipeline key,
//! version, and the directory artifacts were written to.

use crate::module::EngineModule;
use mlua::prelude::*;
use std::sync::Arc;

/// Source of variables readable from scripts
pub trait VarProvider: Send + Sync {
    /// Get a variable by name
    fn get(&self, name: &str) -> Option<String>;

    /// Get all available variable names
    fn keys(&self) -> Vec<String>;
}

/// Environment module, generic over the variable source
pub struct EnvModule<V: VarProvider> {
    provider: Arc<V>,
}

impl<V: VarProvider> EnvModule<V> {
    pub fn new(provider: V) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }
}

impl<V: VarProvider + 'static> EngineModule for EnvModule<V> {
    fn id(&self) -> &'static str {
        "env"
    }

    fn register(&self, lua: &Lua) -> LuaResult<()> {
        let env_table = lua.create_table()?;

        // env.get(name, default?)
        {
            let provider = self.provider.clone();
            env_table.set(
                "get",
                lua.create_function(move |_, (name, default): (String, Option<String>)| {
                    Ok(provider.get(&name).or(default))
                })?,
            )?;
        }

        // env.require(name) errors when the variable is missing
        {
            let provider = self.provider.clone();
            env_table.set(
                "require",
                lua.create_function(move |_, name: String| {
                    provider.get(&name).ok_or_else(|| {
                        LuaError::RuntimeError(format!(
                            "Required environment variable '{}' is not set",
                            name
                        ))
                    })
                })?,
            )?;
        }

        {
            let provider = self.provider.clone();
            env_table.set(
                "has",
                lua.create_function(move |_, name: String| Ok(provider.get(&name).is_some()))?,
            )?;
        }

        {
            let provider = self.provider.clone();
            env_table.set(
                "keys",
                lua.create_function(move |_, ()| {
                    let mut keys = provider.keys();
                    keys.sort();
                    Ok(keys)
                })?,
            )?;
        }

        lua.globals().set(self.id(), env_table)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapProvider(HashMap<String, String>);

    impl VarProvider for MapProvider {
        fn get(&self, name: &str) -> Option<String> {
            self.0.get(name).cloned()
        }

        fn keys(&self) -> Vec<String> {
            self.0.keys().cloned().collect()
        }
    }

    fn lua_with_vars(vars: &[(&str, &str)]) -> Lua {
        let map = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let lua = Lua::new();
        EnvModule::new(MapProvider(map)).register(&lua).unwrap();
        lua
    }

    #[test]
    fn test_env_get_with_default() {
        let lua = lua_with_vars(&[("pipeline", "orders")]);

        let value: String = lua.load(r#"return env.get("pipeline")"#).eval().unwrap();
        assert_eq!(value, "orders");

        let value: String = lua
            .load(r#"return env.get("missing", "fallback")"#)
            .eval()
            .unwrap();
        assert_eq!(value, "fallback");

        let value: Option<String> = lua.load(r#"return env.get("missing")"#).eval().unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_env_require() {
        let lua = lua_with_vars(&[("version", "1.0.0")]);

        let value: String = lua.load(r#"return env.require("version")"#).eval().unwrap();
        assert_eq!(value, "1.0.0");

        let err = lua
            .load(r#"return env.require("work_dir")"#)
            .eval::<String>()
            .unwrap_err();
        assert!(err.to_string().contains("work_dir"));
    }

    #[test]
    fn test_env_has_and_keys() {
        let lua = lua_with_vars(&[("b", "2"), ("a", "1")]);

        let has: bool = lua.load(r#"return env.has("a")"#).eval().unwrap();
        assert!(has);
        let has: bool = lua.load(r#"return env.has("z")"#).eval().unwrap();
        assert!(!has);

        let keys: Vec<String> = lua.load("return env.keys()").eval().unwrap();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
