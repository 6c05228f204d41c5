use crate::StartArgs;
use crate::bootstrap::{Bootstrap, ReadyNode};
use crate::error::{Error, Result};
use crate::run_mode::RunMode;

use std::os::unix::process::CommandExt;
use std::time::Duration;

use chrono::Utc;
use clap::CommandFactory;
use console::style;
use tokio::signal::unix::{SignalKind, signal};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use vigil_environment::{HomeLayout, ResourcePolicy};
use vigil_health::{AggregationMode, Aggregator, CheckStatus, ProbeContext, Tier};

pub async fn start(args: StartArgs) -> Result<()> {
    // Pre-sequence modes short-circuit before step 1 and exit 0.
    match args.mode.as_str() {
        "bash" => return exec_shell(),
        "test" => return self_check(&args),
        "version" => {
            println!("vigil {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        "help" => {
            crate::Cli::command()
                .print_help()
                .map_err(|e| Error::Io("failed to print help", e))?;
            return Ok(());
        }
        _ => {}
    }

    let mode = RunMode::parse(&args.mode);

    let bootstrap = Bootstrap::new(&args.home, &args.config);
    let shutdown_token = bootstrap.shutdown_token().clone();

    // Signals must be honored from the first step onward; the database
    // wait alone can hold the sequence for a minute.
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| Error::Io("failed to create SIGTERM signal", e))?;
    let signal_token = shutdown_token.clone();
    let signal_task = tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("received SIGTERM, initiating shutdown"),
            _ = tokio::signal::ctrl_c() => info!("received SIGINT, initiating shutdown"),
        }
        signal_token.cancel();
    });

    let Some(node) = startup_result(bootstrap.run().await, &shutdown_token)? else {
        info!("shutdown complete");
        return Ok(());
    };

    info!("entering {mode:?} mode");
    dispatch(mode, &node).await?;

    signal_task.abort();
    info!("shutdown complete");
    Ok(())
}

/// Distinguishes an operator-requested shutdown during the sequence from a
/// genuine startup failure: the former exits 0, the latter propagates.
fn startup_result(
    result: Result<ReadyNode>,
    shutdown_token: &CancellationToken,
) -> Result<Option<ReadyNode>> {
    match result {
        Ok(node) => Ok(Some(node)),
        Err(_) if shutdown_token.is_cancelled() => {
            info!("shutdown requested during startup");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

async fn dispatch(mode: RunMode, node: &ReadyNode) -> Result<()> {
    match mode {
        RunMode::Default => run_default(node).await,
        RunMode::Monitor => run_monitor(node).await,
        RunMode::Backup => run_backup(node),
        RunMode::Dashboard => run_dashboard(node).await,
        RunMode::Bootloader => {
            wait_until_healthy(node).await?;
            run_default(node).await
        }
    }
}

async fn run_default(node: &ReadyNode) -> Result<()> {
    info!(
        "vigil ready on {}:{}",
        node.config.server.host, node.config.server.port
    );

    node.shutdown_token.cancelled().await;
    Ok(())
}

/// Periodic comprehensive aggregation at the configured interval.
async fn run_monitor(node: &ReadyNode) -> Result<()> {
    let interval = Duration::from_secs(node.config.monitoring.health_check_interval.max(1));
    let cx = probe_context(node);
    let aggregator = Aggregator::new();
    let mode = AggregationMode::Comprehensive { standalone: true };

    loop {
        let report = aggregator.run(&mode, &cx).await?;
        match report.tier {
            Tier::Healthy => info!("healthy ({}%)", report.percentage),
            Tier::Degraded => warn!(
                "degraded ({}%): {}/{} checks passed",
                report.percentage, report.checks_passed, report.total_checks
            ),
            Tier::Unhealthy => tracing::error!(
                "unhealthy ({}%): {}/{} checks passed",
                report.percentage,
                report.checks_passed,
                report.total_checks
            ),
        }

        tokio::select! {
            () = node.shutdown_token.cancelled() => return Ok(()),
            () = sleep(interval) => {}
        }
    }
}

/// One-shot copy of the configuration and local database into a
/// timestamped backup directory.
fn run_backup(node: &ReadyNode) -> Result<()> {
    let stamp = Utc::now().format("%Y%m%d%H%M%S");
    let backup_dir = node.layout.data_dir().join("backups").join(stamp.to_string());
    std::fs::create_dir_all(&backup_dir)
        .map_err(|e| Error::Io("failed to create backup directory", e))?;

    std::fs::copy(&node.config_path, backup_dir.join("config.json"))
        .map_err(|e| Error::Io("failed to back up configuration", e))?;

    if !node.config.database.engine.is_network() {
        let database_file = std::path::Path::new(&node.config.database.name);
        if database_file.is_file() {
            let file_name = database_file
                .file_name()
                .unwrap_or_else(|| std::ffi::OsStr::new("database"));
            std::fs::copy(database_file, backup_dir.join(file_name))
                .map_err(|e| Error::Io("failed to back up database", e))?;
        }
    }

    info!("backup written to {}", backup_dir.display());
    Ok(())
}

/// Live terminal status display, refreshed at the monitoring interval.
async fn run_dashboard(node: &ReadyNode) -> Result<()> {
    let interval = Duration::from_secs(node.config.monitoring.health_check_interval.max(1));
    let cx = probe_context(node);
    let aggregator = Aggregator::new();
    let mode = AggregationMode::Comprehensive { standalone: true };
    let term = console::Term::stdout();

    loop {
        let report = aggregator.run(&mode, &cx).await?;

        term.clear_screen()
            .map_err(|e| Error::Io("failed to clear terminal", e))?;
        println!("{}", style("vigil status").bold());
        println!();
        for result in &report.results {
            let status = match result.status {
                CheckStatus::Pass => style("pass").green(),
                CheckStatus::Warn => style("warn").yellow(),
                CheckStatus::Fail => style("fail").red(),
            };
            println!("  {status:>4}  {:<12} {}", result.name, result.message);
        }
        println!();
        println!(
            "  {:?}: {}/{} checks passed ({}%)",
            report.tier, report.checks_passed, report.total_checks, report.percentage
        );

        tokio::select! {
            () = node.shutdown_token.cancelled() => return Ok(()),
            () = sleep(interval) => {}
        }
    }
}

/// Re-runs the quick aggregation until it passes, for hosts whose
/// dependencies come up in unpredictable order.
async fn wait_until_healthy(node: &ReadyNode) -> Result<()> {
    let interval = Duration::from_secs(node.config.monitoring.health_check_interval.max(1));
    let cx = probe_context(node);
    let aggregator = Aggregator::new();

    loop {
        let report = aggregator.run(&AggregationMode::Quick, &cx).await?;
        if report.is_passing() {
            info!("bootloader gate passed");
            return Ok(());
        }

        warn!("not yet healthy ({}%), retrying", report.percentage);
        tokio::select! {
            () = node.shutdown_token.cancelled() => return Ok(()),
            () = sleep(interval) => {}
        }
    }
}

fn probe_context(node: &ReadyNode) -> ProbeContext {
    ProbeContext::new(
        node.layout.clone(),
        node.config_path.clone(),
        Some(node.config.clone()),
    )
    .with_cancellation(node.shutdown_token.clone())
}

/// Replaces the process with the operator's shell. Only returns on failure.
fn exec_shell() -> Result<()> {
    let shell = std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string());
    let err = std::process::Command::new(shell).exec();
    Err(Error::Io("failed to exec shell", err))
}

/// Environment self-check without entering the startup sequence.
fn self_check(args: &StartArgs) -> Result<()> {
    vigil_environment::check_required_vars(crate::bootstrap::REQUIRED_VARS)?;

    let layout = HomeLayout::new(&args.home);
    vigil_environment::ensure_directories(&layout.critical_directories(), 0o750)?;

    let snapshot = vigil_environment::resource_snapshot(layout.home(), &ResourcePolicy::default());
    println!(
        "environment ok: {} MB memory free, {} GB disk free",
        snapshot.memory_mb, snapshot.disk_gb
    );
    for warning in &snapshot.warnings {
        println!("{}: {warning}", style("warning").yellow());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interrupted_wait() -> Error {
        Error::Dependency(vigil_netwait::Error::Cancelled("database".to_string()))
    }

    #[test]
    fn cancelled_startup_is_a_clean_shutdown() {
        let token = CancellationToken::new();
        token.cancel();

        let outcome = startup_result(Err(interrupted_wait()), &token);
        assert!(matches!(outcome, Ok(None)));
    }

    #[test]
    fn startup_failure_without_shutdown_propagates() {
        let token = CancellationToken::new();

        let outcome = startup_result(Err(interrupted_wait()), &token);
        assert!(outcome.is_err());
    }
}
