use super::catalog::TypeCatalog;
use super::scope::PluginScope;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for plugin operations
pub type PluginResult<T> = Result<T, PluginError>;

/// Errors that can occur while loading or running plugins
#[derive(Debug, Clone, thiserror::Error)]
pub enum PluginError {
    /// A type could not be constructed or initialized
    #[error("Plugin initialization failed: {0}")]
    InitializationFailed(String),

    /// Plugin code returned an error at runtime
    #[error("Plugin execution failed: {0}")]
    ExecutionFailed(String),

    /// A type, entry or command does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The package manifest or catalog is malformed
    #[error("Invalid package: {0}")]
    Invalid(String),

    /// The package requires a newer host
    #[error("Version mismatch: required {required}, found {found}")]
    VersionMismatch { required: String, found: String },

    /// The archive container could not be read
    #[error("Archive error: {0}")]
    Archive(String),

    /// The native module could not be loaded
    #[error("Module error: {0}")]
    Module(String),

    /// Plugin code panicked
    #[error("Panic in {op}: {message}")]
    Panicked { op: String, message: String },
}

/// Identity of a plugin, supplied by the implementing type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginMetadata {
    pub name: String,
    pub author: String,
    pub version: String,
}

impl PluginMetadata {
    pub fn new(
        name: impl Into<String>,
        author: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            author: author.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for PluginMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{} by {}", self.name, self.version, self.author)
    }
}

/// A loaded unit of behavior with an enable/disable lifecycle.
///
/// The host calls [`Plugin::on_enable`] once after the plugin's scope is
/// created, and [`Plugin::on_disable`] at most once, after that scope has
/// been cancelled (or has completed) and every task spawned on it has
/// finished. Background work belongs on the scope handed to `on_enable`; a
/// plugin may cancel that scope itself to shut down early.
///
/// # Safety
///
/// Implementations living in native modules must be built with the same
/// compiler and the same version of this crate as the host.
pub trait Plugin: Send + Sync {
    /// Get plugin identity
    fn metadata(&self) -> PluginMetadata;

    /// Start the plugin
    fn on_enable(&self, scope: &PluginScope) -> PluginResult<()>;

    /// Stop the plugin
    fn on_disable(&self) -> PluginResult<()> {
        Ok(())
    }
}

/// A type whose `initialize` runs once, synchronously, while its package loads
pub trait AutoInitializer: Send + Sync {
    fn initialize(&self) -> PluginResult<()>;
}

/// A handler the host can bind under one or more command names
pub trait Command: Send + Sync {
    /// Execute the command with its raw arguments
    fn execute(&self, args: &[String]) -> PluginResult<String>;

    /// One-line help text
    fn description(&self) -> String {
        String::new()
    }
}

/// Symbol name for the catalog constructor function
///
/// Every native module must export a function with this name that returns a
/// heap-allocated [`TypeCatalog`]. Use [`export_catalog!`](crate::export_catalog)
/// to generate it.
pub const CATALOG_ENTRY_SYMBOL: &str = "plugin_host_catalog";

/// Type of the catalog constructor function
pub type CatalogConstructor = unsafe fn() -> *mut TypeCatalog;

/// Export a native module's type catalog.
///
/// ```rust,ignore
/// fn catalog() -> plugin_host::plugin::TypeCatalog {
///     TypeCatalog::new().with_type(TypeDefinition::new("greeter.Greeter").with_plugin(|| Ok(Box::new(Greeter))))
/// }
///
/// plugin_host::export_catalog!(catalog);
/// ```
#[macro_export]
macro_rules! export_catalog {
    ($builder:path) => {
        #[no_mangle]
        pub fn plugin_host_catalog() -> *mut $crate::plugin::TypeCatalog {
            let catalog: $crate::plugin::TypeCatalog = $builder();
            ::std::boxed::Box::into_raw(::std::boxed::Box::new(catalog))
        }
    };
}
