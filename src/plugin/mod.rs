pub mod api;
pub mod archive;
pub mod catalog;
pub mod classifier;
pub mod context;
pub mod dispatcher;
pub mod guard;
pub mod lifecycle;
pub mod loader;
pub mod manager;
pub mod manifest;
pub mod module;
pub mod scope;

pub use api::{
    AutoInitializer, CatalogConstructor, Command, Plugin, PluginError, PluginMetadata,
    PluginResult, CATALOG_ENTRY_SYMBOL,
};
pub use archive::{PackageArchive, MANIFEST_ENTRY};
pub use catalog::{CommandMarker, Roles, TypeCatalog, TypeDefinition};
pub use classifier::TypeClassifier;
pub use context::{LoadContext, ResolvedType};
pub use dispatcher::{CommandRegistry, CommandTable, ExtensionDispatcher};
pub use lifecycle::{LifecycleController, PluginHandle, PluginState};
pub use loader::PackageLoader;
pub use manager::{discover_archives, inspect_archives, PluginManager};
pub use manifest::PackageManifest;
pub use module::ModuleLease;
pub use scope::PluginScope;
