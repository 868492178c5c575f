//! checkweigher - data acquisition from CE3000/CE3100 controllers
//!
//! Runs one command against a controller and prints the result as JSON.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use checkweigher::{load_layout, Checkweigher, Command, DeviceConfig, Response};
use checkweigher_core::constants::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_PORT, DEFAULT_READ_TIMEOUT, DEFAULT_RETRY_ATTEMPTS,
};

#[derive(Parser)]
#[command(name = "checkweigher")]
#[command(about = "Enable data acquisition from CE3000/CE3100 checkweigher controllers")]
#[command(version)]
struct Cli {
    /// Device IP address
    ip: String,

    /// Device port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Command
    #[arg(short, long, value_enum, default_value_t = CommandArg::Ds)]
    command: CommandArg,

    /// Field layout file
    #[arg(long = "config", env = "CHECKWEIGHER_CONFIG", default_value = checkweigher::config::DEFAULT_LAYOUT_PATH)]
    config: PathBuf,

    /// Connection attempts before giving up
    #[arg(long, default_value_t = DEFAULT_RETRY_ATTEMPTS)]
    retries: usize,

    /// Connect timeout in seconds
    #[arg(long, default_value_t = DEFAULT_CONNECT_TIMEOUT)]
    connect_timeout: u64,

    /// Read timeout in seconds
    #[arg(long, default_value_t = DEFAULT_READ_TIMEOUT)]
    read_timeout: u64,

    /// Allow DC and DT, which alter controller state
    #[arg(long, env = "CHECKWEIGHER_ALLOW_DESTRUCTIVE")]
    allow_destructive: bool,
}

#[derive(Clone, Copy, ValueEnum)]
#[value(rename_all = "UPPER")]
enum CommandArg {
    /// Clear data
    Dc,
    /// Single set totals
    Ds,
    /// Timed totals
    Dt,
    /// Last 500 weighings
    As,
}

impl From<CommandArg> for Command {
    fn from(arg: CommandArg) -> Self {
        match arg {
            CommandArg::Dc => Command::ClearData,
            CommandArg::Ds => Command::SingleSetTotals,
            CommandArg::Dt => Command::TimedTotals,
            CommandArg::As => Command::BulkScan,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout carries the JSON result
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let layout = load_layout(&cli.config)
        .with_context(|| format!("cannot start without a field layout ({})", cli.config.display()))?;

    let config = DeviceConfig::new(cli.ip, cli.port)
        .with_retry_attempts(cli.retries)
        .with_connect_timeout(Duration::from_secs(cli.connect_timeout))
        .with_read_timeout(Duration::from_secs(cli.read_timeout))
        .with_destructive_commands(cli.allow_destructive);

    let command = Command::from(cli.command);
    tracing::info!("{}", command);

    let mut device = Checkweigher::new(config, layout);

    let result = device.execute(command).await;

    if let Err(e) = device.disconnect().await {
        tracing::warn!("Failed to close connection: {}", e);
    }

    let output = match result.with_context(|| format!("command {} failed", command.mnemonic()))? {
        Response::Cleared => json!({ "command": command.mnemonic(), "status": "cleared" }),
        Response::Totals(totals) => serde_json::to_value(totals)?,
        Response::Bulk(scan) => serde_json::to_value(scan)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
