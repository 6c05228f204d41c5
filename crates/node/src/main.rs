//! Vigil node binary: ordered startup sequencing, health reporting, and
//! OS-native service installation.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_pub_crate)]

mod bootstrap;
mod commands;
mod error;
mod run_mode;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{Level, error};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_max_level(Level::INFO)
            .finish(),
    ) {
        eprintln!("failed to install tracing subscriber: {e}");
        return ExitCode::FAILURE;
    }

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Start(args) => commands::start(args).await.map(|()| ExitCode::SUCCESS),
        Commands::Health(args) => commands::health(args).await,
        Commands::InstallService(args) => commands::install(args).await.map(|()| ExitCode::SUCCESS),
        Commands::UninstallService(args) => {
            commands::uninstall(args).await.map(|()| ExitCode::SUCCESS)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "vigil", version, about, long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Run the startup sequence and enter the requested mode
    Start(StartArgs),
    /// Run health checks and report the service tier
    Health(HealthArgs),
    /// Install vigil as an OS-managed system service
    InstallService(InstallArgs),
    /// Remove the OS-managed system service
    UninstallService(UninstallArgs),
}

#[derive(Parser, Debug)]
pub(crate) struct StartArgs {
    /// Run mode (default|monitor|backup|dashboard|bootloader);
    /// bash, test, version, and help short-circuit before the sequence
    #[arg(index = 1, default_value = "default")]
    mode: String,

    /// Service home directory
    #[arg(long, env = "VIGIL_HOME", default_value = "/var/lib/vigil")]
    home: PathBuf,

    /// Path to the service configuration document
    #[arg(long, env = "VIGIL_CONFIG", default_value = "/etc/vigil/config.json")]
    config: PathBuf,
}

#[derive(Parser, Debug)]
pub(crate) struct HealthArgs {
    /// Check selection: quick, comprehensive, or a single probe name
    #[arg(index = 1)]
    target: Option<String>,

    /// Emit the report as JSON instead of human-readable text
    #[arg(long)]
    json: bool,

    /// Skip probes that require a running service instance
    #[arg(long)]
    standalone: bool,

    /// Service home directory
    #[arg(long, env = "VIGIL_HOME", default_value = "/var/lib/vigil")]
    home: PathBuf,

    /// Path to the service configuration document
    #[arg(long, env = "VIGIL_CONFIG", default_value = "/etc/vigil/config.json")]
    config: PathBuf,
}

#[derive(Parser, Debug)]
pub(crate) struct InstallArgs {
    /// Rotated log files to keep
    #[arg(long, default_value_t = 7)]
    log_retention: u32,

    /// Disable compression of rotated log files
    #[arg(long)]
    no_compress: bool,
}

#[derive(Parser, Debug)]
pub(crate) struct UninstallArgs {
    /// Also delete the data and configuration directories
    #[arg(long)]
    purge_data: bool,
}
