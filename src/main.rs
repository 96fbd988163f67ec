// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Raglink main entry point - a thin CLI over the engine channel.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};

use raglink::{telemetry, Command, EngineClient, EngineConfig, Response, Status};

/// Raglink - command channel for the deadlock detection engine.
#[derive(Parser)]
#[command(name = "raglink")]
#[command(author, version, about = "Drive the deadlock detection engine over stdio", long_about = None)]
struct Cli {
    /// Path to the engine executable
    #[arg(short, long, env = "RAGLINK_ENGINE")]
    engine: PathBuf,

    /// Per-request reply timeout in milliseconds
    #[arg(long, env = "RAGLINK_TIMEOUT_MS", default_value_t = 5000)]
    timeout_ms: u64,

    /// Show verbose output
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Show debug output
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Subcommands for raglink.
#[derive(Subcommand)]
enum Commands {
    /// Health-check the engine
    Ping,

    /// Show the engine name and API version
    Version,

    /// Dump the current RAG state
    State,

    /// Run deadlock detection
    Detect,

    /// Interactive shell: one raw JSON command per line
    Shell,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init(telemetry::level_from_flags(cli.verbose, cli.debug));

    let config = EngineConfig::new(&cli.engine).with_request_timeout_ms(cli.timeout_ms);
    let client = EngineClient::new(config);

    client.start().await?;
    if let Err(err) = client.ensure_ready().await {
        client.stop().await?;
        return Err(err.into());
    }

    let result = run_command(&client, cli.command).await;
    client.stop().await?;
    result
}

async fn run_command(client: &EngineClient, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Ping => print_response(&client.ping().await?),
        Commands::Version => print_response(&client.get_version().await?),
        Commands::State => print_response(&client.rag_get_state().await?),
        Commands::Detect => print_response(&client.detect_deadlock().await?),
        Commands::Shell => run_shell(client).await?,
    }
    Ok(())
}

/// Read raw JSON commands from stdin, one per line, until EOF.
async fn run_shell(client: &EngineClient) -> anyhow::Result<()> {
    eprintln!(
        "{}",
        "Enter one JSON command per line, e.g. {\"command\": \"ping\"}. Ctrl-D to exit.".dimmed()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let command = match serde_json::from_str::<serde_json::Value>(trimmed)
            .map_err(anyhow::Error::from)
            .and_then(|value| Command::try_from(value).map_err(anyhow::Error::from))
        {
            Ok(command) => command,
            Err(err) => {
                eprintln!("{} {}", "invalid command:".red(), err);
                continue;
            }
        };

        match client.send(command).await {
            Ok(response) => print_response(&response),
            Err(err) => {
                eprintln!("{} {}", "channel error:".red(), err);
                if err.needs_restart() {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn print_response(response: &Response) {
    let status = match &response.status {
        Status::Success => "success".green(),
        Status::Ready => "ready".yellow(),
        other => other.to_string().red(),
    };

    match &response.message {
        Some(message) => println!("{} {}", status, message),
        None => println!("{}", status),
    }

    if let Some(data) = response.data_value() {
        match serde_json::to_string_pretty(&data) {
            Ok(pretty) => println!("{}", pretty),
            Err(_) => println!("{:?}", data),
        }
    }
}
