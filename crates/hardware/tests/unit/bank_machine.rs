//! # Bank Machine Tests
//!
//! Drives a single bank machine with an ideal multiplexer that accepts every
//! offered command, and checks the resulting command sequences.

use std::collections::VecDeque;

use dramctl_core::common::Command;
use dramctl_core::config::Config;
use dramctl_core::controller::bank::{BankMachine, BankRequest, BankState};
use pretty_assertions::assert_eq;
use rstest::rstest;

/// Column word bits of the default geometry (10 column bits, BL4).
const COL_WORD_BITS: u32 = 8;

fn request(is_write: bool, row: u32, word: u32) -> BankRequest {
    BankRequest {
        is_write,
        addr: (u64::from(row) << COL_WORD_BITS) | u64::from(word),
    }
}

fn write(row: u32, word: u32) -> BankRequest {
    request(true, row, word)
}

fn read(row: u32, word: u32) -> BankRequest {
    request(false, row, word)
}

/// Feeds `(arrival cycle, request)` pairs and returns the issued commands with their cycles.
fn drive_timed(
    bank: &mut BankMachine,
    schedule: &[(u64, BankRequest)],
    max_cycles: u64,
) -> Vec<(u64, Command)> {
    let mut pending: VecDeque<(u64, BankRequest)> = schedule.iter().copied().collect();
    let mut trace = Vec::new();
    for cycle in 0..max_cycles {
        let out = bank.evaluate(false);
        let push = match pending.front() {
            Some(&(at, req)) if at <= cycle && out.req_ready => {
                let _ = pending.pop_front();
                Some(req)
            }
            _ => None,
        };
        if let Some(command) = out.command {
            trace.push((cycle, command));
        }
        bank.commit(false, out.command.is_some(), push);
        if pending.is_empty() && bank.buffer().is_empty() {
            break;
        }
    }
    assert!(bank.buffer().is_empty(), "bank did not drain in {max_cycles} cycles");
    trace
}

/// Feeds requests back to back from cycle 0.
fn drive(bank: &mut BankMachine, requests: &[BankRequest]) -> Vec<Command> {
    let schedule: Vec<_> = requests.iter().map(|&r| (0, r)).collect();
    drive_timed(bank, &schedule, 1_000)
        .into_iter()
        .map(|(_, command)| command)
        .collect()
}

fn act(bank: usize, row: u32) -> Command {
    Command::Activate { bank, row }
}

fn wr(bank: usize, word: u32, auto_precharge: bool) -> Command {
    Command::Write {
        bank,
        col: word << 2,
        auto_precharge,
    }
}

fn rd(bank: usize, word: u32, auto_precharge: bool) -> Command {
    Command::Read {
        bank,
        col: word << 2,
        auto_precharge,
    }
}

fn pre(bank: usize) -> Command {
    Command::Precharge {
        bank,
        all_banks: false,
    }
}

// ══════════════════════════════════════════════════════════
// 1. Row handling
// ══════════════════════════════════════════════════════════

#[test]
fn opens_the_requested_row() {
    let mut bank = BankMachine::new(2, &Config::default());
    let trace = drive(&mut bank, &[read(0x123, 0x45)]);
    assert_eq!(trace, vec![act(2, 0x123), rd(2, 0x45, false)]);
    assert_eq!(bank.open_row(), Some(0x123));
}

#[test]
fn same_row_requests_share_one_activate() {
    let mut bank = BankMachine::new(0, &Config::default());
    let requests: Vec<_> = (0..6).map(|word| write(0x10, word)).collect();
    let trace = drive(&mut bank, &requests);
    let mut expected = vec![act(0, 0x10)];
    expected.extend((0..6).map(|word| wr(0, word, false)));
    assert_eq!(trace, expected);
}

#[test]
fn row_change_with_auto_precharge() {
    let mut bank = BankMachine::new(1, &Config::default());
    let trace = drive(&mut bank, &[write(0xBA, 0xAD), read(0xDA, 0xAD)]);
    assert_eq!(
        trace,
        vec![
            act(1, 0xBA),
            wr(1, 0xAD, true),
            act(1, 0xDA),
            rd(1, 0xAD, false)
        ]
    );
}

#[test]
fn auto_precharge_only_on_last_access_of_row() {
    let mut bank = BankMachine::new(1, &Config::default());
    let trace = drive(
        &mut bank,
        &[write(0xBA, 0xAD), write(0xBA, 0xAE), read(0xDA, 0xAD)],
    );
    assert_eq!(
        trace,
        vec![
            act(1, 0xBA),
            wr(1, 0xAD, false),
            wr(1, 0xAE, true),
            act(1, 0xDA),
            rd(1, 0xAD, false)
        ]
    );
}

#[test]
fn row_change_without_auto_precharge_uses_precharge() {
    let mut config = Config::default();
    config.controller.with_auto_precharge = false;
    let mut bank = BankMachine::new(4, &config);
    let trace = drive(&mut bank, &[write(0xBA, 0xAD), read(0xDA, 0xAD)]);
    assert_eq!(
        trace,
        vec![
            act(4, 0xBA),
            wr(4, 0xAD, false),
            pre(4),
            act(4, 0xDA),
            rd(4, 0xAD, false)
        ]
    );
}

#[test]
fn delayed_row_change_uses_precharge() {
    let mut bank = BankMachine::new(1, &Config::default());
    let trace: Vec<_> = drive_timed(&mut bank, &[(0, write(0xBA, 1)), (30, write(0xDA, 1))], 200)
        .into_iter()
        .map(|(_, command)| command)
        .collect();
    assert_eq!(
        trace,
        vec![
            act(1, 0xBA),
            wr(1, 1, false),
            pre(1),
            act(1, 0xDA),
            wr(1, 1, false)
        ]
    );
}

#[rstest]
#[case(0)]
#[case(3)]
#[case(7)]
fn every_command_carries_the_bank_index(#[case] index: usize) {
    let mut bank = BankMachine::new(index, &Config::default());
    let requests: Vec<_> = (0..12u32)
        .map(|i| request(i % 3 == 0, (i * 7) % 5, i))
        .collect();
    let trace = drive(&mut bank, &requests);
    assert!(trace.iter().all(|c| c.bank() == Some(index)), "{trace:?}");
    assert_eq!(trace.iter().filter(|c| c.is_column()).count(), 12);
}

// ══════════════════════════════════════════════════════════
// 2. Timing
// ══════════════════════════════════════════════════════════

#[test]
fn column_waits_for_trcd() {
    let mut config = Config::default();
    config.timing.t_rcd = 5;
    let mut bank = BankMachine::new(0, &config);
    let trace = drive_timed(&mut bank, &[(0, read(1, 0))], 100);
    let (act_cycle, _) = trace[0];
    let (col_cycle, _) = trace[1];
    assert!(col_cycle - act_cycle >= 5, "{trace:?}");
}

#[test]
fn precharge_waits_for_write_recovery() {
    let mut config = Config::default();
    config.controller.with_auto_precharge = false;
    let mut bank = BankMachine::new(0, &config);
    let trace = drive_timed(&mut bank, &[(0, write(1, 0)), (0, write(2, 0))], 100);
    let write_cycle = trace.iter().find(|(_, c)| c.is_write()).map(|(t, _)| *t).unwrap();
    let pre_cycle = trace.iter().find(|(_, c)| c.is_precharge()).map(|(t, _)| *t).unwrap();
    assert!(pre_cycle - write_cycle >= u64::from(config.write_to_precharge()));
}

#[test]
fn activate_waits_for_trp_and_trc() {
    let mut config = Config::default();
    config.controller.with_auto_precharge = false;
    config.timing.t_rp = 4;
    config.timing.t_rc = Some(20);
    let mut bank = BankMachine::new(0, &config);
    let trace = drive_timed(&mut bank, &[(0, read(1, 0)), (0, read(2, 0))], 200);
    let acts: Vec<u64> = trace.iter().filter(|(_, c)| c.is_activate()).map(|(t, _)| *t).collect();
    let pre_cycle = trace.iter().find(|(_, c)| c.is_precharge()).map(|(t, _)| *t).unwrap();
    assert_eq!(acts.len(), 2);
    assert!(acts[1] - pre_cycle >= 4);
    assert!(acts[1] - acts[0] >= 20);
}

// ══════════════════════════════════════════════════════════
// 3. Buffering and lock
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(8)]
#[case(1)]
#[case(0)]
fn burst_completes_for_any_depth(#[case] depth: usize) {
    let mut config = Config::default();
    config.controller.cmd_buffer_depth = depth;
    let mut bank = BankMachine::new(3, &config);
    let requests: Vec<_> = (0..32).map(|word| write(0x55, word)).collect();
    let trace = drive(&mut bank, &requests);
    assert_eq!(trace.iter().filter(|c| c.is_activate()).count(), 1);
    let cols: Vec<u32> = trace
        .iter()
        .filter_map(|c| match c {
            Command::Write { col, .. } => Some(*col >> 2),
            _ => None,
        })
        .collect();
    assert_eq!(cols, (0..32).collect::<Vec<_>>(), "FIFO order within the bank");
}

#[test]
fn ready_drops_when_lookahead_full() {
    let mut config = Config::default();
    config.controller.cmd_buffer_depth = 2;
    let mut bank = BankMachine::new(0, &config);
    bank.commit(false, false, Some(read(1, 0)));
    // First request moves to the current register on the next edge.
    bank.commit(false, false, Some(read(1, 1)));
    bank.commit(false, false, Some(read(1, 2)));
    assert_eq!(bank.buffer().len(), 3);
    assert!(!bank.req_ready());
}

#[test]
fn lock_held_until_drained() {
    let mut bank = BankMachine::new(0, &Config::default());
    assert!(!bank.bank_lock());
    bank.commit(false, false, Some(write(7, 0)));
    assert!(bank.bank_lock());
    let mut cycles = 0;
    loop {
        let out = bank.evaluate(false);
        let column = out.command.is_some_and(|c| c.is_column());
        bank.commit(false, out.command.is_some(), None);
        if column {
            break;
        }
        assert!(bank.bank_lock());
        cycles += 1;
        assert!(cycles < 50);
    }
    assert!(!bank.bank_lock());
}

// ══════════════════════════════════════════════════════════
// 4. Refresh handshake
// ══════════════════════════════════════════════════════════

#[test]
fn refresh_closes_row_then_grants() {
    let mut bank = BankMachine::new(6, &Config::default());
    let _ = drive(&mut bank, &[read(9, 0)]);
    assert_eq!(bank.open_row(), Some(9));

    let mut issued = Vec::new();
    let mut granted = false;
    for _ in 0..20 {
        let out = bank.evaluate(true);
        assert!(out.command.is_none_or(|c| !c.is_activate() && !c.is_column()));
        if out.refresh_gnt {
            granted = true;
            break;
        }
        issued.extend(out.command);
        bank.commit(true, out.command.is_some(), None);
    }
    assert!(granted);
    assert_eq!(issued, vec![pre(6)]);
    assert_eq!(bank.state(), BankState::Refresh);
    assert_eq!(bank.open_row(), None);
    assert!(bank.bank_lock(), "parked for refresh");

    bank.commit(false, false, None);
    assert_eq!(bank.state(), BankState::Regular);
    assert!(!bank.bank_lock());
}

#[test]
fn closed_bank_grants_refresh_without_commands() {
    let mut bank = BankMachine::new(0, &Config::default());
    bank.commit(true, false, None);
    let out = bank.evaluate(true);
    assert!(out.command.is_none());
    assert!(out.refresh_gnt);
}

#[test]
fn pending_request_survives_refresh() {
    let mut bank = BankMachine::new(2, &Config::default());
    bank.commit(false, false, Some(read(3, 1)));
    for _ in 0..10 {
        let out = bank.evaluate(true);
        assert!(out.command.is_none_or(|c| !c.is_activate()));
        bank.commit(true, out.command.is_some(), None);
    }
    assert!(bank.bank_lock());
    let trace = drive(&mut bank, &[]);
    assert_eq!(trace, vec![act(2, 3), rd(2, 1, false)]);
}
