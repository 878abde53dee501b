use super::api::{Command, PluginError, PluginResult};
use super::guard::guard;
use super::module::ModuleLease;
use crate::logging;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// External command registry the host binds loaded commands into
pub trait CommandRegistry: Send + Sync {
    fn register(&self, name: &str, command: Arc<dyn Command>);
}

/// Forwards command bindings produced during loading to the host's registry
#[derive(Clone)]
pub struct ExtensionDispatcher {
    registry: Arc<dyn CommandRegistry>,
}

impl ExtensionDispatcher {
    pub fn new(registry: Arc<dyn CommandRegistry>) -> Self {
        Self { registry }
    }

    pub fn register(&self, name: &str, handler: Arc<dyn Command>) {
        logging::log_command_registered(name);
        self.registry.register(name, handler);
    }
}

/// A command created from module code, bundled with the lease that keeps
/// the module mapped while the registry holds it.
pub(crate) struct LeasedCommand {
    inner: Box<dyn Command>,
    _lease: Option<ModuleLease>,
}

impl LeasedCommand {
    pub(crate) fn new(inner: Box<dyn Command>, lease: Option<ModuleLease>) -> Self {
        Self {
            inner,
            _lease: lease,
        }
    }
}

impl Command for LeasedCommand {
    fn execute(&self, args: &[String]) -> PluginResult<String> {
        self.inner.execute(args)
    }

    fn description(&self) -> String {
        self.inner.description()
    }
}

/// In-memory command registry. A later binding under the same name replaces
/// the earlier one, so reloading a package never duplicates its commands.
#[derive(Default)]
pub struct CommandTable {
    commands: RwLock<HashMap<String, Arc<dyn Command>>>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Bound names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .commands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.commands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.commands
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Look up `name` and run it
    pub fn execute(&self, name: &str, args: &[String]) -> PluginResult<String> {
        let command = self
            .get(name)
            .ok_or_else(|| PluginError::NotFound(format!("Command '{}'", name)))?;
        guard("execute", || command.execute(args))
    }
}

impl CommandRegistry for CommandTable {
    fn register(&self, name: &str, command: Arc<dyn Command>) {
        let previous = self
            .commands
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), command);
        if previous.is_some() {
            debug!(command = name, "Replaced existing command binding");
        }
    }
}
