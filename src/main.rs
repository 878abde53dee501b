use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use plugin_host::cli::{Cli, Commands, Verbosity};
use plugin_host::config::HostConfig;
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn initialize_tracing(verbosity: Verbosity) {
    let log_level = verbosity.to_log_level();
    let fallback_filter = format!("plugin_host={}", log_level);

    let use_json = std::env::var("PLUGIN_HOST_JSON").is_ok();

    if use_json {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true);

        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| fallback_filter.clone().into()),
            )
            .with(json_layer)
            .init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true);

        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| fallback_filter.into()),
            )
            .with(fmt_layer)
            .init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let verbosity = cli.verbosity();

    initialize_tracing(verbosity);

    let mut config = HostConfig::load_or_default();
    if let Some(dir) = cli.plugins_dir {
        config = config.with_plugins_dir(dir);
    }

    let result = match cli.command {
        Commands::Run => plugin_host::cli::commands::run(config),
        Commands::List(args) => plugin_host::cli::commands::list(&config, args),
        Commands::Exec(args) => plugin_host::cli::commands::exec(config, args),
        Commands::Completions(args) => {
            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "plugin-host", &mut io::stdout());
            Ok(())
        }
    };

    result.map_err(|report| anyhow::anyhow!("{:?}", report))
}
