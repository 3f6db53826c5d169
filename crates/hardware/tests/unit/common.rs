//! # Common Building Blocks
//!
//! Tests for address decomposition, the round-robin arbiter, and the command
//! and DFI pin encodings.

use dramctl_core::common::addr::{AddressSlicer, BankDecoder};
use dramctl_core::common::command::A10;
use dramctl_core::common::{AddressMap, Command, DfiPhase, DramAddress, Request, RoundRobin};
use dramctl_core::config::{Config, MemoryType};
use proptest::prelude::*;
use rstest::rstest;

// ══════════════════════════════════════════════════════════
// 1. Address decomposition
// ══════════════════════════════════════════════════════════

#[test]
fn address_map_places_bank_above_column_words() {
    let config = Config::default();
    let map = AddressMap::new(&config);
    // DDR2: BL4, so two column bits are burst alignment; 8 column word bits remain.
    let address = map.encode(3, 0xBA, 0xAD << 2);
    assert_eq!(address, (0xBA << 11) | (3 << 8) | 0xAD);
    assert_eq!(
        map.decode(address),
        DramAddress {
            bank: 3,
            row: 0xBA,
            col: 0xAD << 2,
        }
    );
}

#[test]
fn bank_decoder_removes_bank_field() {
    let decoder = BankDecoder::new(3, 8);
    let address = (0x1234 << 11) | (5 << 8) | 0x7F;
    assert_eq!(decoder.bank(address), 5);
    assert_eq!(decoder.row_column(address), (0x1234 << 8) | 0x7F);
    assert_eq!(decoder.compose(5, decoder.row_column(address)), address);
}

#[test]
fn slicer_zeroes_alignment_bits() {
    let slicer = AddressSlicer::new(13, 10, 3);
    let local = (0x42 << 7) | 0x11;
    assert_eq!(slicer.row(local), 0x42);
    assert_eq!(slicer.col(local), 0x11 << 3);
    assert_eq!(slicer.col(local) & 0b111, 0);
}

#[test]
fn rank_bits_extend_bank_index() {
    let mut config = Config::default();
    config.phy.nranks = 2;
    let map = AddressMap::new(&config);
    let address = map.encode(12, 7, 0);
    assert_eq!(map.decode(address).bank, 12);
    assert_eq!(config.nbanks(), 16);
}

proptest! {
    #[test]
    fn decode_inverts_encode(bank in 0usize..8, row in 0u32..(1 << 13), word in 0u32..(1 << 8)) {
        let map = AddressMap::new(&Config::default());
        let col = word << 2;
        let decoded = map.decode(map.encode(bank, row, col));
        prop_assert_eq!(decoded, DramAddress { bank, row, col });
    }
}

#[test]
fn request_constructors() {
    assert!(Request::write(0x10).is_write);
    assert!(!Request::read(0x10).is_write);
    assert_eq!(Request::read(0x10).address, 0x10);
}

// ══════════════════════════════════════════════════════════
// 2. Round-robin arbiter
// ══════════════════════════════════════════════════════════

#[test]
fn arbiter_starts_at_zero() {
    let arbiter = RoundRobin::new(4);
    assert_eq!(arbiter.grant(), 0);
    assert_eq!(arbiter.len(), 4);
    assert!(!arbiter.is_empty());
}

#[test]
fn arbiter_moves_to_next_requester() {
    let mut arbiter = RoundRobin::new(4);
    arbiter.commit(true, &[false, false, true, false]);
    assert_eq!(arbiter.grant(), 2);
    arbiter.commit(true, &[true, false, true, false]);
    assert_eq!(arbiter.grant(), 0, "wraps past the end");
}

#[test]
fn arbiter_holder_keeps_grant_when_alone() {
    let mut arbiter = RoundRobin::new(4);
    arbiter.commit(true, &[true, false, false, false]);
    assert_eq!(arbiter.grant(), 0);
    arbiter.commit(true, &[false; 4]);
    assert_eq!(arbiter.grant(), 0);
}

#[test]
fn arbiter_holds_without_enable() {
    let mut arbiter = RoundRobin::new(4);
    arbiter.commit(false, &[false, true, true, true]);
    assert_eq!(arbiter.grant(), 0);
}

#[test]
fn arbiter_serves_every_requester_in_turn() {
    let mut arbiter = RoundRobin::new(3);
    let mut order = Vec::new();
    for _ in 0..6 {
        arbiter.commit(true, &[true, true, true]);
        order.push(arbiter.grant());
    }
    assert_eq!(order, vec![1, 2, 0, 1, 2, 0]);
}

// ══════════════════════════════════════════════════════════
// 3. Command and DFI encoding
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(Command::Activate { bank: 3, row: 0xBA })]
#[case(Command::Precharge { bank: 5, all_banks: false })]
#[case(Command::Precharge { bank: 0, all_banks: true })]
#[case(Command::Read { bank: 1, col: 0x2B4, auto_precharge: false })]
#[case(Command::Read { bank: 1, col: 0x2B4, auto_precharge: true })]
#[case(Command::Write { bank: 7, col: 0x10, auto_precharge: true })]
#[case(Command::Refresh { bank: None })]
#[case(Command::ZqCalibration)]
#[case(Command::Nop)]
fn dfi_decode_recovers_command(#[case] command: Command) {
    let phase = DfiPhase::drive(&command, 3, 1);
    assert_eq!(phase.decode(3), command);
}

#[test]
fn dfi_selects_rank_from_bank_index() {
    let command = Command::Activate { bank: 9, row: 4 };
    let phase = DfiPhase::drive(&command, 3, 2);
    assert_eq!(phase.cs_n, 0b01, "rank 1 selected, active low");
    assert_eq!(phase.bank, 1);
    assert_eq!(phase.decode(3), command);
}

#[test]
fn dfi_all_rank_commands_select_every_rank() {
    let phase = DfiPhase::drive(&Command::Refresh { bank: None }, 3, 4);
    assert_eq!(phase.cs_n, 0);
}

#[test]
fn dfi_data_enables_follow_column_commands() {
    let read = DfiPhase::drive(&Command::Read { bank: 0, col: 0, auto_precharge: false }, 3, 1);
    let write = DfiPhase::drive(&Command::Write { bank: 0, col: 0, auto_precharge: false }, 3, 1);
    assert!(read.rddata_en && !read.wrdata_en);
    assert!(write.wrdata_en && !write.rddata_en);
    assert!(DfiPhase::nop().is_nop());
}

#[test]
fn auto_precharge_rides_on_a10() {
    let pins = Command::Write { bank: 0, col: 0x2B4, auto_precharge: true }.pins();
    assert_eq!(pins.address, 0x2B4 | A10);
    assert!(pins.cas && pins.we && !pins.ras);
}

#[test]
fn command_classes() {
    let act = Command::Activate { bank: 0, row: 0 };
    let read = Command::Read { bank: 2, col: 0, auto_precharge: true };
    assert!(act.is_cmd() && act.is_activate() && !act.is_column());
    assert!(read.is_column() && read.is_read() && read.auto_precharge());
    assert_eq!(read.bank(), Some(2));
    assert_eq!(Command::Precharge { bank: 0, all_banks: true }.bank(), None);
}

#[test]
fn burst_length_sets_alignment() {
    let mut config = Config::default();
    config.phy.memtype = MemoryType::Ddr3;
    assert_eq!(config.address_align(), 3);
    config.phy.memtype = MemoryType::Sdr;
    assert_eq!(config.address_align(), 0);
}
