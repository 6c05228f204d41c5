use crate::HealthArgs;
use crate::error::Result;

use std::process::ExitCode;

use console::style;
use vigil_environment::HomeLayout;
use vigil_health::{AggregationMode, Aggregator, CheckStatus, HealthReport, ProbeContext, Tier};

pub async fn health(args: HealthArgs) -> Result<ExitCode> {
    let layout = HomeLayout::new(&args.home);
    // The config probe reports an unreadable document itself; everything
    // else degrades gracefully without one.
    let config = vigil_config::load_existing(&args.config).ok();
    let cx = ProbeContext::new(layout, args.config.clone(), config);

    let mode = aggregation_mode(args.target.as_deref(), args.standalone);
    let report = Aggregator::new().run(&mode, &cx).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render(&report);
    }

    // Degraded is an operator signal, not a restart signal.
    Ok(if report.is_passing() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn aggregation_mode(target: Option<&str>, standalone: bool) -> AggregationMode {
    match target {
        None | Some("comprehensive") => AggregationMode::Comprehensive { standalone },
        Some("quick") => AggregationMode::Quick,
        Some(name) => AggregationMode::Single(name.to_string()),
    }
}

fn render(report: &HealthReport) {
    for result in &report.results {
        let status = match result.status {
            CheckStatus::Pass => style("pass").green(),
            CheckStatus::Warn => style("warn").yellow(),
            CheckStatus::Fail => style("fail").red(),
        };
        println!("{status:>4}  {:<12} {}", result.name, result.message);
    }

    let tier = match report.tier {
        Tier::Healthy => style("healthy").green(),
        Tier::Degraded => style("degraded").yellow(),
        Tier::Unhealthy => style("unhealthy").red(),
    };
    println!();
    println!(
        "{tier}: {}/{} checks passed ({}%)",
        report.checks_passed, report.total_checks, report.percentage
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_target_is_comprehensive() {
        assert!(matches!(
            aggregation_mode(None, false),
            AggregationMode::Comprehensive { standalone: false }
        ));
        assert!(matches!(
            aggregation_mode(None, true),
            AggregationMode::Comprehensive { standalone: true }
        ));
    }

    #[test]
    fn named_targets_map_to_modes() {
        assert!(matches!(
            aggregation_mode(Some("quick"), false),
            AggregationMode::Quick
        ));
        assert!(matches!(
            aggregation_mode(Some("ssl"), false),
            AggregationMode::Single(name) if name == "ssl"
        ));
    }
}
