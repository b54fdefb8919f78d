//! photomirror CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use photomirror_core::{TracingConfig, init_tracing};

use photomirror_client::cli::{Cli, Command};
use photomirror_client::commands;
use photomirror_client::config::ClientConfig;
use photomirror_client::error::{ClientError, ClientResult};
use photomirror_client::interrupt::Interrupt;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Initialize tracing
    let tracing_config = if cli.debug || config.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::default()
    }
    .with_format(cli.log_format);

    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }

    let interrupt = Interrupt::new();
    interrupt.spawn_listener();

    match interrupt.guard(run(cli, config, &interrupt)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> ClientResult<ClientConfig> {
    match cli.config {
        Some(ref path) => ClientConfig::load_from(path).map_err(ClientError::Config),
        None => ClientConfig::load().map_err(ClientError::Config),
    }
}

async fn run(cli: Cli, config: ClientConfig, interrupt: &Interrupt) -> ClientResult<()> {
    let command = cli.command.unwrap_or(Command::Sync { output_dir: None });
    let client = commands::authenticate(&config, &cli.auth, interrupt.cancelled()).await?;

    match command {
        Command::Sync { output_dir } => {
            commands::sync::run(&client, config.output_dir(output_dir)).await
        }
        Command::List { json } => commands::list::run(&client, json).await,
    }
}
