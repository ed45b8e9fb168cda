// rgbscape - RGB lighting surface with virtual devices

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // === Utility ===
        Commands::Color { hex } => commands::utility::color(&hex),
        Commands::Init { force } => commands::utility::init(cli.config.as_deref(), force),

        // === Surface ===
        Commands::Run {
            fps,
            frames,
            output,
        } => {
            let config = commands::load_config(cli.config.as_deref())?;
            init_tracing(config.surface.log_filter.as_deref())?;
            commands::surface::run(&config, fps, frames, output)
        }
        Commands::Dump { json, flush } => {
            let config = commands::load_config(cli.config.as_deref())?;
            init_tracing(config.surface.log_filter.as_deref())?;
            commands::surface::dump(&config, json, flush)
        }
    }
}

/// `RUST_LOG` plus the config's `log_filter` directive
fn init_tracing(extra: Option<&str>) -> anyhow::Result<()> {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Some(directive) = extra {
        filter = filter.add_directive(directive.parse()?);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
