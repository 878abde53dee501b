use super::api::{PluginError, PluginResult};
use super::archive::PackageArchive;
use super::catalog::TypeCatalog;
use super::classifier::TypeClassifier;
use super::context::LoadContext;
use super::dispatcher::ExtensionDispatcher;
use super::lifecycle::LifecycleController;
use super::manifest::PackageManifest;
use crate::logging;
use std::path::Path;
use std::sync::Arc;

/// Loads one archive at a time into an isolated [`LoadContext`]
pub struct PackageLoader {
    /// Host-shared types, consulted before any archive-local type
    shared: Arc<TypeCatalog>,
    controller: Arc<LifecycleController>,
    dispatcher: ExtensionDispatcher,
}

impl PackageLoader {
    pub fn new(
        shared: Arc<TypeCatalog>,
        controller: Arc<LifecycleController>,
        dispatcher: ExtensionDispatcher,
    ) -> Self {
        Self {
            shared,
            controller,
            dispatcher,
        }
    }

    /// Load every type the archive declares.
    ///
    /// Never fails: an archive-fatal error is logged with the archive path
    /// and only the rest of this archive is skipped.
    pub fn load(&self, archive: &Path) {
        logging::log_loading_archive(archive);

        if let Err(e) = self.try_load(archive) {
            logging::log_archive_failed(archive, &e);
        }
    }

    fn try_load(&self, archive: &Path) -> PluginResult<()> {
        let context = LoadContext::open(archive, &self.shared)?;
        let classifier = TypeClassifier::new(&self.controller, &self.dispatcher);

        for id in context.type_ids() {
            let resolved = context.resolve(id)?;
            classifier.classify(archive, resolved);
        }

        logging::log_archive_loaded(
            archive,
            &context.manifest().name,
            context.type_ids().len(),
        );
        Ok(())
    }

    /// Read and validate an archive's manifest without loading any code
    pub fn inspect(archive: &Path) -> PluginResult<PackageManifest> {
        let manifest = PackageArchive::open(archive)?.manifest()?;
        manifest
            .validate()
            .map_err(|e| PluginError::Invalid(format!("Invalid manifest: {}", e)))?;
        Ok(manifest)
    }
}
