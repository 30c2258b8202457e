//! Lensgauge CLI
//!
//! Serves the upload form, measures local images, and manages the
//! configuration file.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

mod cli;
mod commands;
mod config;
mod config_handlers;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Serve { host, port } => {
            let mut config = config::load_config(args.config.as_deref())?;
            commands::apply_serve_overrides(&mut config, host, port);
            commands::serve(config).await?;
        }
        Command::Measure { image, output } => {
            let config = config::load_config(args.config.as_deref())?;
            let measurement = commands::measure(&config, &image, output.as_deref())?;
            println!("{}", measurement.label());
            if let Some(output) = output {
                tracing::info!(path = %output.display(), "Annotated image written");
            }
        }
        Command::Config { action } => {
            config_handlers::handle_config_command(args.config.as_deref(), action)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "info,lensgauge=debug,tower_http=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
