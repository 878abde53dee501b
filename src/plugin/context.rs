use super::api::{PluginError, PluginResult};
use super::archive::PackageArchive;
use super::catalog::{TypeCatalog, TypeDefinition};
use super::manifest::PackageManifest;
use super::module::{load_module, ModuleLease};
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// A definition resolved through a [`LoadContext`], with the lease of the
/// module its code lives in (none for host-shared types).
pub struct ResolvedType {
    pub definition: TypeDefinition,
    pub lease: Option<ModuleLease>,
}

struct LocalModule {
    // closures in the catalog point into the module
    catalog: TypeCatalog,
    lease: ModuleLease,
}

/// Isolated loading context for one archive.
///
/// Lives for exactly one load: it owns the open archive and the archive's own
/// catalog, and borrows the host's shared catalog. Resolution is parent-first,
/// so a shared type resolves to the same definition in every package.
pub struct LoadContext<'p> {
    manifest: PackageManifest,
    parent: &'p TypeCatalog,
    local: Option<LocalModule>,
    archive: PackageArchive<File>,
}

impl<'p> LoadContext<'p> {
    /// Open `path`, validate its manifest and map its native module, if any
    pub fn open(path: &Path, parent: &'p TypeCatalog) -> PluginResult<Self> {
        let mut archive = PackageArchive::open(path)?;
        debug!(
            archive = %path.display(),
            entries = archive.entry_names().len(),
            "Archive opened"
        );

        let manifest = archive.manifest()?;
        manifest
            .validate()
            .map_err(|e| PluginError::Invalid(format!("Invalid manifest: {}", e)))?;
        manifest.check_host_compat(env!("CARGO_PKG_VERSION"))?;

        let local = match manifest.library {
            Some(ref entry) => {
                let (catalog, lease) = load_module(&mut archive, entry)?;
                Some(LocalModule { catalog, lease })
            }
            None => None,
        };

        Ok(Self {
            manifest,
            parent,
            local,
            archive,
        })
    }

    pub fn manifest(&self) -> &PackageManifest {
        &self.manifest
    }

    /// Type identifiers declared by the package, in load order
    pub fn type_ids(&self) -> &[String] {
        &self.manifest.types
    }

    /// Resolve `id` without constructing anything
    pub fn resolve(&self, id: &str) -> PluginResult<ResolvedType> {
        if let Some(definition) = self.parent.get(id) {
            return Ok(ResolvedType {
                definition: definition.clone(),
                lease: None,
            });
        }

        if let Some(ref local) = self.local {
            if let Some(definition) = local.catalog.get(id) {
                return Ok(ResolvedType {
                    definition: definition.clone(),
                    lease: Some(local.lease.clone()),
                });
            }
        }

        Err(PluginError::NotFound(format!(
            "Type '{}' is not defined by package '{}' or the host",
            id, self.manifest.name
        )))
    }
}

impl Drop for LoadContext<'_> {
    fn drop(&mut self) {
        debug!(archive = %self.archive.path().display(), "Load context released");
    }
}
