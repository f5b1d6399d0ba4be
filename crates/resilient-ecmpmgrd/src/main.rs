//! resilient-ecmpmgrd - Resilient ECMP Configuration Manager
//!
//! Entry point for the resilient-ecmpmgrd daemon.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use eos_cfgmgr_common::shell::FASTCLI_CMD;
use eos_resilient_ecmpmgrd::{
    CliFacts, CliTransport, EcmpResult, ResilientEcmpMgr, ResourceState, SimulatedDevice,
    TaskFile,
};

/// Resilient ECMP configuration manager
#[derive(Parser, Debug)]
#[command(name = "resilient-ecmpmgrd")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Task file declaring the desired state (YAML, or JSON by extension)
    task: PathBuf,

    /// Override the state declared in the task file
    #[arg(short = 's', long, value_enum)]
    state: Option<ResourceState>,

    /// Compute commands without applying them
    #[arg(short = 'c', long)]
    check: bool,

    /// Read facts from a saved running config instead of the device
    #[arg(long)]
    running_config: Option<PathBuf>,

    /// Device CLI binary
    #[arg(long, default_value = FASTCLI_CMD)]
    cli_path: String,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,
}

/// Initializes tracing/logging subsystem
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: &Args) -> anyhow::Result<EcmpResult> {
    let task = TaskFile::load(&args.task)
        .await
        .with_context(|| format!("loading task file {}", args.task.display()))?;
    let state = args.state.unwrap_or(task.state);

    let result = match &args.running_config {
        Some(path) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading running config {}", path.display()))?;
            info!("Offline mode: using running config from {}", path.display());
            let device = SimulatedDevice::from_running_config(&text);
            ResilientEcmpMgr::new(device.clone(), device)
                .with_check_mode(args.check)
                .execute(&task.config, state)
                .await?
        }
        None => ResilientEcmpMgr::new(
            CliFacts::new(args.cli_path.as_str()),
            CliTransport::new(args.cli_path.as_str()),
        )
        .with_check_mode(args.check)
        .execute(&task.config, state)
        .await
        .context("reconciling resilient ECMP configuration")?,
    };

    Ok(result)
}

fn print_result(result: &EcmpResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    println!("changed: {}", result.changed);
    for command in &result.commands {
        println!("{}", command);
    }
    for warning in &result.warnings {
        println!("warning: {}", warning);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level);

    info!("--- Starting resilient-ecmpmgrd (Rust) ---");

    match run(&args).await.and_then(|result| print_result(&result, args.json)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("resilient-ecmpmgrd failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
