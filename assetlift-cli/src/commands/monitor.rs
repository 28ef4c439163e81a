//! Monitor Command
//!
//! Prints the buffer strategy the upload scheduler would pick right now.

use crate::commands::session::format_bytes;
use crate::symbols;
use anyhow::Result;
use assetlift_monitor::{MemoryProbe, MonitorConfig, ResourceSnapshot, ResourceStrategyMonitor};
use console::style;

/// Monitor configuration
pub struct MonitorCommandConfig {
    pub monitor: MonitorConfig,
    pub json: bool,
}

/// Run monitor command
pub async fn run(config: MonitorCommandConfig) -> Result<()> {
    let monitor = ResourceStrategyMonitor::with_sysinfo(config.monitor);
    report(&monitor, config.json).await
}

async fn report<P: MemoryProbe>(monitor: &ResourceStrategyMonitor<P>, json: bool) -> Result<()> {
    let snapshot = monitor.snapshot().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    print_snapshot(&snapshot, monitor);
    Ok(())
}

fn print_snapshot<P: MemoryProbe>(snapshot: &ResourceSnapshot, monitor: &ResourceStrategyMonitor<P>) {
    let thresholds = monitor.thresholds();

    println!();
    println!("{}", style("Resource Strategy").bold().underlined());
    println!();
    if snapshot.malfunction {
        println!(
            "  {} Memory probe returned a non-positive reading",
            style(symbols::CROSS).red()
        );
    } else {
        println!("  Available memory: {}", format_bytes(snapshot.memory_available));
    }
    println!(
        "  Strategy:         {}",
        style(snapshot.strategy.to_string()).green()
    );
    println!("  Upload budget:    {:.0}%", snapshot.upload_budget * 100.0);
    println!("  Pause uploads:    {}", if snapshot.should_pause { "yes" } else { "no" });
    println!("  Thermal budget:   {}", snapshot.thermal_budget);
    println!(
        "  Battery level:    {}",
        snapshot
            .battery_level
            .map(|level| format!("{:.0}%", level * 100.0))
            .unwrap_or_else(|| "not tracked".to_string())
    );
    println!();
    println!("{}", style("Thresholds").dim());
    println!("  full     >= {}", format_bytes(thresholds.full_min_bytes));
    println!("  reduced  >= {}", format_bytes(thresholds.reduced_min_bytes));
    println!("  minimal  >= {}", format_bytes(thresholds.minimal_min_bytes));
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetlift_monitor::FixedProbe;

    #[tokio::test]
    async fn test_report_handles_malfunction() {
        let config = MonitorConfig {
            record_metrics: false,
            ..Default::default()
        };
        let monitor = ResourceStrategyMonitor::new(FixedProbe::new(-1), config);
        assert!(report(&monitor, false).await.is_ok());
        assert!(report(&monitor, true).await.is_ok());
    }
}
