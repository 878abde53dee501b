use super::api::PluginResult;
use super::catalog::TypeCatalog;
use super::dispatcher::{CommandRegistry, ExtensionDispatcher};
use super::lifecycle::{LifecycleController, PluginHandle};
use super::loader::PackageLoader;
use super::manifest::PackageManifest;
use crate::config::HostConfig;
use crate::logging;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Handle;

/// Entry point of the plugin system: owns the lifecycle controller and
/// reloads the package directory on demand.
///
/// `reload` must not be called concurrently with itself; callers serialize it.
pub struct PluginManager {
    config: HostConfig,
    controller: Arc<LifecycleController>,
    loader: PackageLoader,
}

impl PluginManager {
    /// Create a manager with an empty shared catalog
    pub fn new(config: HostConfig, commands: Arc<dyn CommandRegistry>, runtime: Handle) -> Self {
        Self::with_shared_types(config, commands, TypeCatalog::new(), runtime)
    }

    /// Create a manager whose packages may reference the host's own types
    pub fn with_shared_types(
        config: HostConfig,
        commands: Arc<dyn CommandRegistry>,
        shared: TypeCatalog,
        runtime: Handle,
    ) -> Self {
        let controller = Arc::new(LifecycleController::new(runtime));
        let loader = PackageLoader::new(
            Arc::new(shared),
            Arc::clone(&controller),
            ExtensionDispatcher::new(commands),
        );

        Self {
            config,
            controller,
            loader,
        }
    }

    /// Disable every active plugin, then load each archive in the package
    /// directory. Failures are logged per archive and never returned.
    pub fn reload(&self) {
        self.controller.disable_all();

        let dir = &self.config.plugins_dir;
        logging::log_reload_start(dir);

        if let Err(e) = std::fs::create_dir_all(dir) {
            logging::log_plugins_dir_unavailable(dir, &e);
            return;
        }

        let archives = match discover_archives(&self.config) {
            Ok(archives) => archives,
            Err(e) => {
                logging::log_plugins_dir_unavailable(dir, &e);
                return;
            }
        };

        for archive in &archives {
            self.loader.load(archive);
        }

        logging::log_reload_complete(archives.len(), self.controller.len());
    }

    /// Disable every active plugin without waiting for teardown
    pub fn disable_all(&self) {
        self.controller.disable_all();
    }

    /// Disable every active plugin and wait for each `on_disable`
    pub async fn shutdown(&self) {
        self.controller.shutdown().await;
    }

    pub fn plugins(&self) -> Vec<Arc<PluginHandle>> {
        self.controller.plugins()
    }

    pub fn plugin_count(&self) -> usize {
        self.controller.len()
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }
}

/// Regular files in the package directory with a recognized extension.
///
/// Not recursive. A missing directory yields no archives. Sorted by file
/// name when `sort_archives` is set, directory order otherwise.
pub fn discover_archives(config: &HostConfig) -> io::Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(&config.plugins_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut archives: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && config.is_archive(path))
        .collect();

    if config.sort_archives {
        archives.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    }

    Ok(archives)
}

/// Read each discovered archive's manifest without loading code
pub fn inspect_archives(
    config: &HostConfig,
) -> io::Result<Vec<(PathBuf, PluginResult<PackageManifest>)>> {
    Ok(discover_archives(config)?
        .into_iter()
        .map(|path| {
            let manifest = PackageLoader::inspect(&path);
            (path, manifest)
        })
        .collect())
}
