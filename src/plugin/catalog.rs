//! Type catalogs: the explicit registration tables that replace runtime type
//! inspection. Each [`TypeDefinition`] names a stable identifier and the
//! capability roles it fills, so classification never has to construct a type
//! to find out what it is.

use super::api::{AutoInitializer, Command, Plugin, PluginResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub type PluginFactory = Arc<dyn Fn() -> PluginResult<Box<dyn Plugin>> + Send + Sync>;
pub type InitializerFactory = Arc<dyn Fn() -> PluginResult<Box<dyn AutoInitializer>> + Send + Sync>;
pub type CommandFactory = Arc<dyn Fn() -> PluginResult<Box<dyn Command>> + Send + Sync>;

/// Static registration record for a command type: the canonical name plus
/// any aliases it should also answer to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMarker {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl CommandMarker {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Canonical name first, then aliases in declaration order
    pub fn bindings(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// Capability roles a definition fills
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Roles {
    pub plugin: bool,
    pub auto_initializer: bool,
    pub command: bool,
}

/// A loadable type, identified by a stable id
#[derive(Clone)]
pub struct TypeDefinition {
    id: String,
    plugin: Option<PluginFactory>,
    initializer: Option<InitializerFactory>,
    command: Option<(CommandMarker, CommandFactory)>,
}

impl TypeDefinition {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            plugin: None,
            initializer: None,
            command: None,
        }
    }

    pub fn with_plugin<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> PluginResult<Box<dyn Plugin>> + Send + Sync + 'static,
    {
        self.plugin = Some(Arc::new(factory));
        self
    }

    pub fn with_auto_initializer<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> PluginResult<Box<dyn AutoInitializer>> + Send + Sync + 'static,
    {
        self.initializer = Some(Arc::new(factory));
        self
    }

    pub fn with_command<F>(mut self, marker: CommandMarker, factory: F) -> Self
    where
        F: Fn() -> PluginResult<Box<dyn Command>> + Send + Sync + 'static,
    {
        self.command = Some((marker, Arc::new(factory)));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn roles(&self) -> Roles {
        Roles {
            plugin: self.plugin.is_some(),
            auto_initializer: self.initializer.is_some(),
            command: self.command.is_some(),
        }
    }

    pub fn plugin_factory(&self) -> Option<&PluginFactory> {
        self.plugin.as_ref()
    }

    pub fn initializer_factory(&self) -> Option<&InitializerFactory> {
        self.initializer.as_ref()
    }

    pub fn command(&self) -> Option<(&CommandMarker, &CommandFactory)> {
        self.command.as_ref().map(|(marker, factory)| (marker, factory))
    }
}

impl fmt::Debug for TypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDefinition")
            .field("id", &self.id)
            .field("roles", &self.roles())
            .field("command", &self.command.as_ref().map(|(marker, _)| marker))
            .finish()
    }
}

/// Definitions indexed by id. The host supplies one as the shared parent
/// catalog; every native module exports its own.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    types: HashMap<String, TypeDefinition>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, definition: TypeDefinition) -> Self {
        self.insert(definition);
        self
    }

    /// Insert a definition, returning the one it replaced
    pub fn insert(&mut self, definition: TypeDefinition) -> Option<TypeDefinition> {
        self.types.insert(definition.id.clone(), definition)
    }

    pub fn get(&self, id: &str) -> Option<&TypeDefinition> {
        self.types.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.types.contains_key(id)
    }

    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.types.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
