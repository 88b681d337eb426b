use mlua::prelude::*;

/// A module exposed to pipeline scripts as a Lua global.
///
/// # Example
///
/// ```rust
/// use conflux_engine::EngineModule;
/// use mlua::prelude::*;
///
/// struct ClockModule;
///
/// impl EngineModule for ClockModule {
///     fn id(&self) -> &'static str {
///         "clock"
///     }
///
///     fn register(&self, lua: &Lua) -> LuaResult<()> {
///         let table = lua.create_table()?;
///         table.set("zero", 0)?;
///         lua.globals().set(self.id(), table)?;
///         Ok(())
///     }
/// }
/// ```
pub trait EngineModule: Send + Sync {
    /// Returns the unique identifier for this module.
    ///
    /// Used as the global variable name in Lua: a module with id `"log"`
    /// is reached from scripts as `log.function_name()`.
    fn id(&self) -> &'static str;

    /// Registers this module's functions and values into the Lua context.
    ///
    /// # Errors
    /// Returns `LuaError` if registration fails (e.g., invalid function, type error)
    fn register(&self, lua: &Lua) -> LuaResult<()>;
}

/// Registry of modules loaded into every stream sandbox
pub struct ModuleRegistry {
    modules: Vec<Box<dyn EngineModule>>,
}

impl ModuleRegistry {
    /// Creates a new empty module registry
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    /// Registers a module
    ///
    /// # Panics
    /// Panics if a module with the same ID is already registered
    pub fn register<M: EngineModule + 'static>(&mut self, module: M) {
        let id = module.id();
        if self.modules.iter().any(|m| m.id() == id) {
            panic!("Module with id '{}' is already registered", id);
        }
        self.modules.push(Box::new(module));
    }

    /// Registers all modules into a Lua context
    ///
    /// # Errors
    /// Returns the first error encountered during registration
    pub fn register_all(&self, lua: &Lua) -> LuaResult<()> {
        for module in &self.modules {
            module.register(lua)?;
        }
        Ok(())
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
