//! Sample plugin package.
//!
//! Futures spawned here only wait on cancellation tokens. This module links
//! its own copy of the runtime crates, so timers and the host's log
//! subscriber are not reachable from inside it.

use plugin_host::plugin::{
    AutoInitializer, Command, CommandMarker, Plugin, PluginError, PluginMetadata, PluginResult,
    PluginScope, TypeCatalog, TypeDefinition,
};
use std::sync::atomic::{AtomicUsize, Ordering};

static GREETINGS: AtomicUsize = AtomicUsize::new(0);

struct Banner;

impl AutoInitializer for Banner {
    fn initialize(&self) -> PluginResult<()> {
        eprintln!("greeter package loaded");
        Ok(())
    }
}

struct Greeter;

impl Plugin for Greeter {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new("greeter", "Plugin Host Contributors", env!("CARGO_PKG_VERSION"))
    }

    fn on_enable(&self, scope: &PluginScope) -> PluginResult<()> {
        let token = scope.child_token();
        scope.spawn(async move {
            token.cancelled().await;
        });
        Ok(())
    }

    fn on_disable(&self) -> PluginResult<()> {
        eprintln!(
            "greeter stopped after {} greeting(s)",
            GREETINGS.load(Ordering::Relaxed)
        );
        Ok(())
    }
}

struct Greet;

impl Command for Greet {
    fn execute(&self, args: &[String]) -> PluginResult<String> {
        let name = match args {
            [] => "world".to_string(),
            names => names.join(" "),
        };
        if name.trim().is_empty() {
            return Err(PluginError::ExecutionFailed("name cannot be blank".to_string()));
        }
        GREETINGS.fetch_add(1, Ordering::Relaxed);
        Ok(format!("Hello, {}!", name))
    }

    fn description(&self) -> String {
        "Greet someone by name".to_string()
    }
}

fn catalog() -> TypeCatalog {
    TypeCatalog::new()
        .with_type(
            TypeDefinition::new("greeter.Banner").with_auto_initializer(|| Ok(Box::new(Banner))),
        )
        .with_type(TypeDefinition::new("greeter.Greeter").with_plugin(|| Ok(Box::new(Greeter))))
        .with_type(
            TypeDefinition::new("greeter.Greet")
                .with_command(CommandMarker::new("greet").with_alias("hello"), || {
                    Ok(Box::new(Greet))
                }),
        )
}

plugin_host::export_catalog!(catalog);
