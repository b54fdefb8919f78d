//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use photomirror_core::TracingOutputFormat;

/// photomirror - Mirror a Google Photos library to a local directory
#[derive(Debug, Parser)]
#[command(name = "photomirror")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "PHOTOMIRROR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Log output format (pretty, compact, json)
    #[arg(long, default_value = "compact")]
    pub log_format: TracingOutputFormat,

    #[command(flatten)]
    pub auth: AuthArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// How to obtain the OAuth token.
#[derive(Debug, Clone, Args)]
pub struct AuthArgs {
    /// OAuth client ID
    #[arg(long, env = "CLIENT_ID", hide_env_values = true)]
    pub client_id: Option<String>,

    /// OAuth client secret
    #[arg(long, env = "CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Redirect target registered for the OAuth client
    #[arg(long)]
    pub redirect_url: Option<String>,

    /// Paste the authorization code instead of running the local callback listener
    #[arg(long)]
    pub manual: bool,

    /// Open the consent page in the default browser
    #[arg(long)]
    pub open: bool,
}

/// Available commands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Download every library item not yet present locally (default)
    Sync {
        /// Destination directory (defaults to the current directory)
        #[arg(long, short)]
        output_dir: Option<PathBuf>,
    },

    /// Print every item of the library
    List {
        /// Print one JSON object per line
        #[arg(long)]
        json: bool,
    },
}
