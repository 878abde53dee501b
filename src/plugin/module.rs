use super::api::{CatalogConstructor, PluginError, PluginResult, CATALOG_ENTRY_SYMBOL};
use super::archive::PackageArchive;
use super::catalog::TypeCatalog;
use super::guard::panic_message;
use std::fmt;
use std::io::{Read, Seek};
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tracing::{debug, info};

/// A native module extracted from an archive and mapped into the process
struct LoadedModule {
    // dropped before the directory holding the file
    #[allow(dead_code)]
    library: libloading::Library,
    path: PathBuf,
    _dir: TempDir,
}

impl Drop for LoadedModule {
    fn drop(&mut self) {
        debug!(module = %self.path.display(), "Unloading native module");
    }
}

/// Keeps a native module mapped. Every value created from module code holds
/// one, and the module is unloaded when the last lease is dropped.
#[derive(Clone)]
pub struct ModuleLease(Arc<LoadedModule>);

impl fmt::Debug for ModuleLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ModuleLease").field(&self.0.path).finish()
    }
}

/// Extract `entry` from the archive into a private temporary directory, load
/// it, and call its catalog constructor.
pub(crate) fn load_module<R: Read + Seek>(
    archive: &mut PackageArchive<R>,
    entry: &str,
) -> PluginResult<(TypeCatalog, ModuleLease)> {
    let bytes = archive.read_entry(entry)?;

    let file_name = Path::new(entry)
        .file_name()
        .ok_or_else(|| PluginError::Invalid(format!("Invalid library entry: {}", entry)))?;

    let dir = tempfile::Builder::new()
        .prefix("plugin-host-")
        .tempdir()
        .map_err(|e| PluginError::Module(format!("Failed to create module directory: {}", e)))?;
    let path = dir.path().join(file_name);
    std::fs::write(&path, bytes)
        .map_err(|e| PluginError::Module(format!("Failed to extract {}: {}", entry, e)))?;

    info!(module = %path.display(), archive = %archive.path().display(), "Loading native module");

    unsafe {
        let library = libloading::Library::new(&path)
            .map_err(|e| PluginError::Module(format!("Failed to load library: {}", e)))?;

        let catalog = {
            let constructor: libloading::Symbol<CatalogConstructor> = library
                .get(CATALOG_ENTRY_SYMBOL.as_bytes())
                .map_err(|e| {
                    PluginError::Invalid(format!(
                        "Module does not export '{}': {}",
                        CATALOG_ENTRY_SYMBOL, e
                    ))
                })?;

            let catalog_ptr = std::panic::catch_unwind(AssertUnwindSafe(|| constructor()))
                .map_err(|payload| PluginError::Panicked {
                    op: CATALOG_ENTRY_SYMBOL.to_string(),
                    message: panic_message(payload),
                })?;
            if catalog_ptr.is_null() {
                return Err(PluginError::Module(
                    "Catalog constructor returned null".to_string(),
                ));
            }

            *Box::from_raw(catalog_ptr)
        };

        debug!(types = ?catalog.ids(), "Native module catalog loaded");

        Ok((
            catalog,
            ModuleLease(Arc::new(LoadedModule {
                library,
                path,
                _dir: dir,
            })),
        ))
    }
}
