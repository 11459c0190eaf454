//! wifi-recon CLI entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wifi_recon_cli::{commands, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Channel(args) => commands::execute_channel(args)?,
        Commands::Frequency(args) => commands::execute_frequency(args)?,
        Commands::Inspect(args) => commands::execute_inspect(args)?,
        Commands::Config(cmd) => commands::execute_config(cmd)?,
        Commands::Version => {
            println!("wifi-recon {}", env!("CARGO_PKG_VERSION"));
            println!("core library version: {}", wifi_recon_core::VERSION);
        }
    }

    Ok(())
}
