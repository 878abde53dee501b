use crate::cli::args::{ExecArgs, ListArgs};
use crate::config::HostConfig;
use crate::logging;
use crate::plugin::{inspect_archives, CommandTable, PackageManifest, PluginManager};
use crate::{HostError, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Handle, Runtime};

/// How long `run` and `exec` wait for plugins to finish tearing down
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

fn print_info(message: impl AsRef<str>) {
    println!("{}", message.as_ref().cyan());
}

fn print_success(message: impl AsRef<str>) {
    println!("{}", message.as_ref().green());
}

fn print_warning(message: impl AsRef<str>) {
    println!("{}", message.as_ref().yellow());
}

fn build_runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("plugin-host")
        .build()
        .map_err(|e| HostError::RuntimeError(format!("Failed to start async runtime: {}", e)).into())
}

/// Execute the run command
pub fn run(config: HostConfig) -> Result<()> {
    build_runtime()?.block_on(run_until_interrupted(config))
}

async fn run_until_interrupted(config: HostConfig) -> Result<()> {
    let commands = Arc::new(CommandTable::new());
    let manager = PluginManager::new(config, commands.clone(), Handle::current());
    logging::log_host_start(&manager.config().plugins_dir);

    print_info(format!(
        "Loading plugins from {}",
        manager.config().plugins_dir.display()
    ));
    tokio::task::block_in_place(|| manager.reload());
    print_summary(&manager, &commands);

    print_info("Plugins running. Press Ctrl-C to stop.");
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| HostError::RuntimeError(format!("Failed to listen for Ctrl-C: {}", e)))?;

    print_info("Shutting down plugins...");
    shutdown(&manager).await;
    Ok(())
}

/// Execute the exec command
pub fn exec(config: HostConfig, args: ExecArgs) -> Result<()> {
    build_runtime()?.block_on(exec_once(config, args))
}

async fn exec_once(config: HostConfig, args: ExecArgs) -> Result<()> {
    let commands = Arc::new(CommandTable::new());
    let manager = PluginManager::new(config, commands.clone(), Handle::current());

    tokio::task::block_in_place(|| manager.reload());
    let result = tokio::task::block_in_place(|| commands.execute(&args.name, &args.args));
    shutdown(&manager).await;

    match result {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => Err(HostError::CommandError(format!("{}: {}", args.name, e)).into()),
    }
}

async fn shutdown(manager: &PluginManager) {
    match tokio::time::timeout(SHUTDOWN_TIMEOUT, manager.shutdown()).await {
        Ok(()) => print_success("All plugins disabled"),
        Err(_) => print_warning(format!(
            "Some plugins did not stop within {}s",
            SHUTDOWN_TIMEOUT.as_secs()
        )),
    }
}

fn print_summary(manager: &PluginManager, commands: &CommandTable) {
    let plugins = manager.plugins();
    if plugins.is_empty() {
        print_warning("No plugins enabled");
    } else {
        print_success(format!("{} plugin(s) enabled", plugins.len()));
        for handle in &plugins {
            let source = handle
                .archive()
                .and_then(|path| path.file_name())
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "host".to_string());
            println!(
                "  {} {} ({:?}, from {})",
                handle.metadata().name.bold(),
                format!("v{}", handle.metadata().version).dimmed(),
                handle.state(),
                source
            );
        }
    }

    let names = commands.names();
    if !names.is_empty() {
        print_info(format!("Commands: {}", names.join(", ")));
    }
}

#[derive(Serialize)]
struct ArchiveListing {
    archive: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    manifest: Option<PackageManifest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Execute the list command
pub fn list(config: &HostConfig, args: ListArgs) -> Result<()> {
    let entries = inspect_archives(config).map_err(|e| {
        HostError::FileError(format!(
            "Failed to read plugin directory {:?}: {}",
            config.plugins_dir, e
        ))
    })?;

    let listings: Vec<ArchiveListing> = entries
        .into_iter()
        .map(|(archive, manifest)| match manifest {
            Ok(manifest) => ArchiveListing {
                archive,
                manifest: Some(manifest),
                error: None,
            },
            Err(e) => ArchiveListing {
                archive,
                manifest: None,
                error: Some(e.to_string()),
            },
        })
        .collect();

    if args.json {
        let json = serde_json::to_string_pretty(&listings)
            .map_err(|e| HostError::RuntimeError(format!("Failed to serialize listing: {}", e)))?;
        println!("{}", json);
        return Ok(());
    }

    if listings.is_empty() {
        print_warning(format!(
            "No plugin archives found in {}",
            config.plugins_dir.display()
        ));
        return Ok(());
    }

    for listing in &listings {
        match (&listing.manifest, &listing.error) {
            (Some(manifest), _) => {
                println!(
                    "{} {} {}",
                    manifest.name.bold(),
                    format!("v{}", manifest.version).dimmed(),
                    listing.archive.display()
                );
                if !manifest.description.is_empty() {
                    println!("  {}", manifest.description);
                }
                for id in &manifest.types {
                    println!("  - {}", id);
                }
            }
            (None, error) => println!(
                "{} {}: {}",
                "invalid".red(),
                listing.archive.display(),
                error.as_deref().unwrap_or("unknown error")
            ),
        }
    }

    Ok(())
}
