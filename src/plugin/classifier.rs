use super::api::Command;
use super::context::ResolvedType;
use super::dispatcher::{ExtensionDispatcher, LeasedCommand};
use super::guard::guard;
use super::lifecycle::LifecycleController;
use crate::logging;
use std::path::Path;
use std::sync::Arc;

/// Dispatches one resolved type to every role it fills, in the fixed order
/// Plugin, AutoInitializer, Command. A failure in one role is logged and
/// does not stop the others.
pub struct TypeClassifier<'a> {
    controller: &'a LifecycleController,
    dispatcher: &'a ExtensionDispatcher,
}

impl<'a> TypeClassifier<'a> {
    pub fn new(controller: &'a LifecycleController, dispatcher: &'a ExtensionDispatcher) -> Self {
        Self {
            controller,
            dispatcher,
        }
    }

    pub fn classify(&self, archive: &Path, resolved: ResolvedType) {
        let ResolvedType { definition, lease } = resolved;
        let type_id = definition.id();

        if let Some(factory) = definition.plugin_factory() {
            let instance = guard("plugin factory", || factory()).and_then(|plugin| {
                let metadata = guard("metadata", || Ok(plugin.metadata()))?;
                Ok((plugin, metadata))
            });
            match instance {
                Ok((plugin, metadata)) => {
                    self.controller
                        .activate_from(plugin, metadata, Some(archive), lease.clone());
                }
                Err(e) => logging::log_instantiation_failed(archive, type_id, "plugin", &e),
            }
        }

        if let Some(factory) = definition.initializer_factory() {
            let result = guard("auto-initializer factory", || factory())
                .and_then(|initializer| guard("initialize", || initializer.initialize()));
            match result {
                Ok(()) => logging::log_initializer_ran(type_id),
                Err(e) => {
                    logging::log_instantiation_failed(archive, type_id, "auto-initializer", &e)
                }
            }
        }

        if let Some((marker, factory)) = definition.command() {
            match guard("command factory", || factory()) {
                Ok(command) => {
                    let command: Arc<dyn Command> =
                        Arc::new(LeasedCommand::new(command, lease.clone()));
                    for name in marker.bindings() {
                        self.dispatcher.register(name, Arc::clone(&command));
                    }
                }
                Err(e) => logging::log_instantiation_failed(archive, type_id, "command", &e),
            }
        }
    }
}
