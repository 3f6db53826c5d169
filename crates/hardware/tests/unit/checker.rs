//! # Protocol Checker Tests
//!
//! Feeds hand-written command sequences to the checker the system tests rely on, so a
//! timing rule it stops enforcing shows up here rather than as a silently clean run.

use dramctl_core::common::Command;
use dramctl_core::config::Config;

use crate::common::checker::ProtocolChecker;

const PREA: Command = Command::Precharge {
    bank: 0,
    all_banks: true,
};
const REF: Command = Command::Refresh { bank: None };

const fn act(bank: usize, row: u32) -> Command {
    Command::Activate { bank, row }
}

fn checker() -> ProtocolChecker {
    // tRP 2, tRFC 16, write-to-precharge 5.
    ProtocolChecker::new(&Config::default())
}

fn replay(sequence: &[(u64, Command)]) -> Vec<String> {
    let mut checker = checker();
    for (cycle, command) in sequence {
        checker.observe(*cycle, &[*command], false);
    }
    checker.violations
}

fn flagged(sequence: &[(u64, Command)], rule: &str) -> bool {
    replay(sequence).iter().any(|v| v.contains(rule))
}

// ══════════════════════════════════════════════════════════
// 1. Refresh
// ══════════════════════════════════════════════════════════

#[test]
fn activate_waits_trfc_after_refresh() {
    let early = [(0, PREA), (2, REF), (17, act(3, 1))];
    assert!(flagged(&early, "ACTIVATE after REFRESH (tRFC)"));
    assert!(replay(&[(0, PREA), (2, REF), (18, act(3, 1))]).is_empty());
}

#[test]
fn refresh_waits_trp_after_precharge_all() {
    assert!(flagged(&[(0, PREA), (1, REF)], "REFRESH after PRECHARGE (tRP)"));
    assert!(replay(&[(0, PREA), (2, REF)]).is_empty());
}

#[test]
fn back_to_back_refreshes_keep_trfc() {
    assert!(flagged(&[(0, PREA), (2, REF), (10, REF)], "REFRESH after REFRESH (tRFC)"));
    assert!(replay(&[(0, PREA), (2, REF), (18, REF)]).is_empty());
}

#[test]
fn zqcs_waits_for_the_last_refresh() {
    assert!(flagged(&[(0, PREA), (2, REF), (10, Command::ZqCalibration)], "ZQCS after REFRESH"));
    let mut config = Config::default();
    config.timing.t_zqcs = Some(4);
    let mut checker = ProtocolChecker::new(&config);
    checker.observe(0, &[PREA], false);
    checker.observe(2, &[REF], false);
    checker.observe(18, &[Command::ZqCalibration], false);
    checker.observe(20, &[act(0, 1)], false);
    assert!(checker.violations.iter().any(|v| v.contains("tZQCS")));
}

// ══════════════════════════════════════════════════════════
// 2. Auto-precharge
// ══════════════════════════════════════════════════════════

#[test]
fn activate_after_write_auto_precharge_waits_for_recovery_and_trp() {
    let write = Command::Write {
        bank: 1,
        col: 0,
        auto_precharge: true,
    };
    // Precharge starts at 2 + 5; the next ACTIVATE may follow tRP later.
    assert!(flagged(&[(0, act(1, 4)), (2, write), (8, act(1, 5))], "tRP"));
    assert!(replay(&[(0, act(1, 4)), (2, write), (9, act(1, 5))]).is_empty());
}

#[test]
fn activate_after_read_auto_precharge_waits_trp() {
    let read = Command::Read {
        bank: 2,
        col: 8,
        auto_precharge: true,
    };
    assert!(flagged(&[(0, act(2, 4)), (2, read), (3, act(2, 5))], "tRP"));
    assert!(replay(&[(0, act(2, 4)), (2, read), (4, act(2, 5))]).is_empty());
}

#[test]
fn auto_precharge_respects_tras() {
    let mut config = Config::default();
    config.timing.t_ras = Some(6);
    config.timing.t_rc = Some(6);
    let read = Command::Read {
        bank: 0,
        col: 0,
        auto_precharge: true,
    };
    let mut checker = ProtocolChecker::new(&config);
    checker.observe(0, &[act(0, 1)], false);
    checker.observe(2, &[read], false);
    checker.observe(7, &[act(0, 2)], false);
    assert!(checker.violations.iter().any(|v| v.contains("tRP")), "{:?}", checker.violations);

    let mut checker = ProtocolChecker::new(&config);
    checker.observe(0, &[act(0, 1)], false);
    checker.observe(2, &[read], false);
    checker.observe(8, &[act(0, 2)], false);
    assert!(checker.is_clean(), "{:?}", checker.violations);
}
