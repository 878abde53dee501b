pub mod cli;
pub mod config;
pub mod logging;
pub mod plugin;
use miette::Diagnostic;

pub use config::HostConfig;
pub use plugin::{PluginManager, TypeCatalog};

/// Result type alias for host-level operations
pub type Result<T> = miette::Result<T>;

/// Error types for the plugin host
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum HostError {
    #[error("Invalid configuration: {0}")]
    #[diagnostic(
        code(host::config_invalid),
        help("Check `.plugin-host.toml` for typos. Every key is optional; remove the file to fall back to defaults.")
    )]
    ConfigError(String),

    #[error("File operation failed: {0}")]
    #[diagnostic(
        code(host::file_error),
        help("Check if you have necessary permissions and that the path exists.")
    )]
    FileError(String),

    #[error("Command failed: {0}")]
    #[diagnostic(
        code(host::command_failed),
        help("Use `plugin-host list` to see which packages are installed. Commands are only available after their package loads successfully.")
    )]
    CommandError(String),

    #[error("Runtime error: {0}")]
    #[diagnostic(code(host::runtime_error))]
    RuntimeError(String),
}
