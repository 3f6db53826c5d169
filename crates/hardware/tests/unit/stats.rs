//! # Statistics Tests

use dramctl_core::common::Command;
use dramctl_core::stats::{ControllerStats, STATS_SECTIONS};
use pretty_assertions::assert_eq;

fn sample() -> ControllerStats {
    let mut stats = ControllerStats {
        cycles: 100,
        refresh_cycles: 10,
        ..ControllerStats::default()
    };
    let commands = [
        Command::Activate { bank: 0, row: 1 },
        Command::Write {
            bank: 0,
            col: 0,
            auto_precharge: false,
        },
        Command::Write {
            bank: 0,
            col: 4,
            auto_precharge: true,
        },
        Command::Activate { bank: 1, row: 2 },
        Command::Read {
            bank: 1,
            col: 0,
            auto_precharge: false,
        },
        Command::Read {
            bank: 1,
            col: 4,
            auto_precharge: false,
        },
        Command::Precharge {
            bank: 1,
            all_banks: false,
        },
        Command::Precharge {
            bank: 0,
            all_banks: true,
        },
        Command::Refresh { bank: None },
        Command::ZqCalibration,
        Command::Nop,
    ];
    for command in &commands {
        stats.record(command);
    }
    stats
}

#[test]
fn record_counts_by_type() {
    let stats = sample();
    assert_eq!(stats.activates, 2);
    assert_eq!(stats.writes, 2);
    assert_eq!(stats.reads, 2);
    assert_eq!(stats.auto_precharges, 1);
    assert_eq!(stats.precharges, 1);
    assert_eq!(stats.precharge_alls, 1);
    assert_eq!(stats.refreshes, 1);
    assert_eq!(stats.zq_calibrations, 1);
}

#[test]
fn derived_metrics() {
    let stats = sample();
    assert!((stats.bus_utilization() - 0.04).abs() < 1e-9);
    assert!((stats.row_hit_rate() - 0.5).abs() < 1e-9);
}

#[test]
fn empty_stats_have_zero_rates() {
    let stats = ControllerStats::default();
    assert_eq!(stats.bus_utilization(), 0.0);
    assert_eq!(stats.row_hit_rate(), 0.0);
}

#[test]
fn format_selected_sections() {
    let stats = sample();
    let commands_only = stats.format_sections(&["commands".to_string()]);
    assert!(commands_only.contains("COMMAND MIX"));
    assert!(commands_only.contains("cmd.refresh"));
    assert!(!commands_only.contains("sim_cycles"));
    assert!(!commands_only.contains("REQUESTS"));

    let summary = stats.format_sections(&["summary".to_string()]);
    assert!(summary.contains("bus_utilization          4.00%"));
    assert!(summary.contains("row_hit_rate             50.00%"));
    assert!(summary.contains("refresh_cycles           10 (10.00%)"));
}

#[test]
fn display_prints_every_section() {
    let text = sample().to_string();
    assert!(text.starts_with("=========="));
    assert!(text.contains("DRAM CONTROLLER STATISTICS"));
    assert!(text.contains("sim_cycles               100"));
    assert!(text.contains("COMMAND MIX"));
    assert!(text.contains("REQUESTS"));
    let all: Vec<String> = STATS_SECTIONS.iter().map(|s| (*s).to_string()).collect();
    assert_eq!(sample().format_sections(&all), text);
}
