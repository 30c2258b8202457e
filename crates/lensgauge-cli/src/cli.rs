//! Command-line definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Lensgauge - estimate object diameter from an uploaded image
#[derive(Parser, Debug)]
#[command(name = "lensgauge")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true, env = "LENSGAUGE_CONFIG")]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the upload web server
    Serve {
        /// Interface to bind (overrides server.host)
        #[arg(long, env = "LENSGAUGE_HOST")]
        host: Option<String>,

        /// Port to listen on (overrides server.port)
        #[arg(short, long, env = "LENSGAUGE_PORT")]
        port: Option<u16>,
    },

    /// Measure a local image without starting the server
    Measure {
        /// Image to measure
        image: PathBuf,

        /// Write the annotated image here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the resolved config file path
    Path,

    /// Print the effective configuration as TOML
    Show,

    /// Print one value by dotted key, e.g. `server.port`
    Get {
        /// Dotted key
        key: String,
    },

    /// Write a default configuration file
    Init {
        /// Destination (defaults to the platform config directory)
        #[arg(short, long)]
        file: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the configuration as LENSGAUGE_* environment variables
    Export {
        /// Format as `--env KEY=VALUE` for `docker run`
        #[arg(long)]
        docker_env: bool,
    },
}
