//! Structured logging helpers for the plugin host.
//!
//! Loading never returns errors to its caller, so these events are the only
//! record of what happened to each archive and plugin. Keep field names stable:
//! `archive`, `plugin`, `type_id`, `command`.

use crate::plugin::{PluginError, PluginMetadata};
use std::path::Path;

/// Log host startup with build metadata.
pub fn log_host_start(plugins_dir: &Path) {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        git = env!("GIT_HASH"),
        rustc = env!("RUSTC_VERSION"),
        plugins_dir = %plugins_dir.display(),
        "Plugin host starting"
    );
}

/// Log the start of a reload pass.
pub fn log_reload_start(dir: &Path) {
    tracing::info!(dir = %dir.display(), "Reloading plugins");
}

/// Log the end of a reload pass.
pub fn log_reload_complete(archives: usize, active: usize) {
    tracing::info!(archives, active, "Reload finished");
}

/// Log that the package directory could not be prepared or read.
pub fn log_plugins_dir_unavailable(dir: &Path, error: &std::io::Error) {
    tracing::error!(dir = %dir.display(), %error, "Plugin directory unavailable");
}

/// Log archive loading event.
pub fn log_loading_archive(path: &Path) {
    tracing::info!(archive = %path.display(), "Loading plugin archive");
}

/// Log successful archive load.
pub fn log_archive_loaded(path: &Path, package: &str, types: usize) {
    tracing::info!(archive = %path.display(), package, types, "Plugin archive loaded");
}

/// Log an archive-fatal failure. Only this archive is skipped.
pub fn log_archive_failed(path: &Path, error: &PluginError) {
    tracing::warn!(archive = %path.display(), %error, "Exception in loading plugin archive");
}

/// Log a type that could not be constructed or initialized.
pub fn log_instantiation_failed(path: &Path, type_id: &str, role: &str, error: &PluginError) {
    tracing::warn!(
        archive = %path.display(),
        type_id,
        role,
        %error,
        "Failed to instantiate type"
    );
}

pub fn log_initializer_ran(type_id: &str) {
    tracing::debug!(type_id, "Auto-initializer ran");
}

pub fn log_plugin_enabled(id: u64, metadata: &PluginMetadata) {
    tracing::info!(
        id,
        plugin = %metadata.name,
        version = %metadata.version,
        author = %metadata.author,
        "Plugin enabled"
    );
}

pub fn log_plugin_enable_failed(id: u64, metadata: &PluginMetadata, error: &PluginError) {
    tracing::warn!(id, plugin = %metadata.name, %error, "Plugin failed to enable");
}

pub fn log_plugin_disabled(id: u64, metadata: &PluginMetadata) {
    tracing::info!(id, plugin = %metadata.name, "Plugin disabled");
}

pub fn log_plugin_disable_failed(id: u64, metadata: &PluginMetadata, error: &PluginError) {
    tracing::error!(id, plugin = %metadata.name, %error, "Error disabling plugin");
}

/// A registered plugin had no scope to cancel.
pub fn log_integrity_error(id: u64, metadata: &PluginMetadata) {
    tracing::error!(id, plugin = %metadata, "Scope of registered plugin not found");
}

/// Log command binding.
pub fn log_command_registered(name: &str) {
    tracing::debug!(command = name, "Command registered");
}
