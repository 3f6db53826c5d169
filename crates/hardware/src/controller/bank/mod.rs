//! Bank Machine.
//!
//! One bank machine per DRAM bank turns the bank's request stream into ACTIVATE,
//! PRECHARGE, READ, and WRITE commands. It performs the following:
//! 1. **Buffering:** Requests queue in a lookahead FIFO feeding a current-request register.
//! 2. **Row Tracking:** The open row is remembered so same-row requests skip the ACTIVATE.
//! 3. **Per-Bank Timing:** tRCD, tRP, tRC, tRAS, and write-to-precharge are enforced locally;
//!    bus-wide constraints (tRRD, tFAW, tCCD, tWTR) belong to the multiplexer.
//! 4. **Refresh Handshake:** On `refresh_req` the bank stops opening rows, closes its row,
//!    and grants once precharge timing is met.

/// Lookahead FIFO and current-request register.
pub mod buffer;

pub use buffer::{BankRequest, CommandBuffer};

use crate::common::addr::AddressSlicer;
use crate::common::command::Command;
use crate::config::Config;
use crate::timing::{MinSpacing, TimingController};

/// Bank machine FSM state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BankState {
    /// Serving requests against the open row, or waiting for one.
    #[default]
    Regular,
    /// Closing the open row with an explicit PRECHARGE.
    Precharge,
    /// Waiting for the row closed by an auto-precharge access to finish.
    AutoPrecharge,
    /// Opening the row of the current request.
    Activate,
    /// Parked for a refresh.
    Refresh,
}

/// Combinational outputs of a bank machine for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BankOutputs {
    /// A request can be accepted from the crossbar.
    pub req_ready: bool,
    /// The bank has buffered work or is parked for refresh.
    pub bank_lock: bool,
    /// Command offered to the multiplexer.
    pub command: Option<Command>,
    /// The bank is closed and ready for the refresh sequence.
    pub refresh_gnt: bool,
}

/// Per-bank request-to-command state machine.
#[derive(Debug, Clone)]
pub struct BankMachine {
    index: usize,
    slicer: AddressSlicer,
    buffer: CommandBuffer,
    state: BankState,
    open_row: Option<u32>,
    with_auto_precharge: bool,
    /// Write to precharge.
    twtp: MinSpacing,
    /// Activate to activate.
    trc: MinSpacing,
    /// Activate to precharge.
    tras: MinSpacing,
    /// Activate to column command.
    trcd: MinSpacing,
    /// Precharge to activate.
    trp: MinSpacing,
}

impl BankMachine {
    /// Creates the bank machine for global bank `index`.
    pub fn new(index: usize, config: &Config) -> Self {
        let timing = &config.timing;
        Self {
            index,
            slicer: AddressSlicer::new(
                config.geom.rowbits,
                config.geom.colbits,
                config.address_align(),
            ),
            buffer: CommandBuffer::new(config.controller.cmd_buffer_depth),
            state: BankState::Regular,
            open_row: None,
            with_auto_precharge: config.controller.with_auto_precharge,
            twtp: MinSpacing::new(config.write_to_precharge()),
            trc: MinSpacing::optional(timing.t_rc),
            tras: MinSpacing::optional(timing.t_ras),
            trcd: MinSpacing::new(timing.t_rcd),
            trp: MinSpacing::new(timing.t_rp),
        }
    }

    /// Returns the global bank index.
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Returns the FSM state.
    pub const fn state(&self) -> BankState {
        self.state
    }

    /// Returns the open row, if any.
    pub const fn open_row(&self) -> Option<u32> {
        self.open_row
    }

    /// Returns the request buffer.
    pub const fn buffer(&self) -> &CommandBuffer {
        &self.buffer
    }

    /// Returns `true` if a request can be accepted this cycle.
    pub fn req_ready(&self) -> bool {
        self.buffer.ready()
    }

    /// Returns `true` while requests are buffered or the bank is parked for refresh.
    pub fn bank_lock(&self) -> bool {
        self.buffer.is_pending() || self.state == BankState::Refresh
    }

    /// Computes this cycle's outputs from the current state.
    ///
    /// # Arguments
    ///
    /// * `refresh_req` - The refresher is requesting a refresh.
    pub fn evaluate(&self, refresh_req: bool) -> BankOutputs {
        let mut outputs = BankOutputs {
            req_ready: self.req_ready(),
            bank_lock: self.bank_lock(),
            ..BankOutputs::default()
        };
        match self.state {
            BankState::Regular => {
                if refresh_req || !self.trcd.ready() {
                    return outputs;
                }
                if let Some(current) = self.buffer.current() {
                    let row = self.slicer.row(current.addr);
                    if self.open_row == Some(row) {
                        outputs.command = Some(self.column_command(current, row));
                    }
                }
            }
            BankState::Precharge => {
                if self.precharge_allowed() {
                    outputs.command = Some(self.precharge());
                }
            }
            BankState::AutoPrecharge => {}
            BankState::Activate => {
                if refresh_req || !(self.trc.ready() && self.trp.ready()) {
                    return outputs;
                }
                if let Some(current) = self.buffer.current() {
                    outputs.command = Some(Command::Activate {
                        bank: self.index,
                        row: self.slicer.row(current.addr),
                    });
                }
            }
            BankState::Refresh => {
                if self.open_row.is_some() {
                    if self.precharge_allowed() {
                        outputs.command = Some(self.precharge());
                    }
                } else {
                    outputs.refresh_gnt = self.twtp.ready() && self.trp.ready();
                }
            }
        }
        outputs
    }

    /// Applies one clock edge.
    ///
    /// # Arguments
    ///
    /// * `refresh_req` - Refresh request seen this cycle (same value passed to `evaluate`).
    /// * `accepted` - The multiplexer issued this bank's command this cycle.
    /// * `push` - Request accepted from the crossbar this cycle.
    pub fn commit(&mut self, refresh_req: bool, accepted: bool, push: Option<BankRequest>) {
        let command = if accepted {
            self.evaluate(refresh_req).command
        } else {
            None
        };
        let issued = command.unwrap_or_default();
        let mut consumed = false;
        let mut close_row = false;

        self.state = match self.state {
            BankState::Regular => {
                if refresh_req {
                    BankState::Refresh
                } else if issued.is_column() {
                    consumed = true;
                    if issued.auto_precharge() {
                        self.open_row = None;
                        BankState::AutoPrecharge
                    } else {
                        BankState::Regular
                    }
                } else if let Some(current) = self.buffer.current() {
                    match self.open_row {
                        Some(row) if row != self.slicer.row(current.addr) => BankState::Precharge,
                        Some(_) => BankState::Regular,
                        None => BankState::Activate,
                    }
                } else {
                    BankState::Regular
                }
            }
            BankState::Precharge => {
                if issued.is_precharge() {
                    self.open_row = None;
                    close_row = true;
                    BankState::Activate
                } else {
                    BankState::Precharge
                }
            }
            BankState::AutoPrecharge => {
                if self.precharge_allowed() {
                    close_row = true;
                    BankState::Activate
                } else {
                    BankState::AutoPrecharge
                }
            }
            BankState::Activate => {
                if refresh_req {
                    BankState::Refresh
                } else if let Command::Activate { row, .. } = issued {
                    self.open_row = Some(row);
                    BankState::Regular
                } else {
                    BankState::Activate
                }
            }
            BankState::Refresh => {
                if issued.is_precharge() {
                    self.open_row = None;
                    close_row = true;
                }
                if refresh_req {
                    BankState::Refresh
                } else {
                    BankState::Regular
                }
            }
        };

        self.twtp.tick(issued.is_write());
        self.trc.tick(issued.is_activate());
        self.tras.tick(issued.is_activate());
        self.trcd.tick(issued.is_activate());
        self.trp.tick(close_row);
        self.buffer.commit(consumed, push);
    }

    fn precharge_allowed(&self) -> bool {
        self.twtp.ready() && self.tras.ready()
    }

    const fn precharge(&self) -> Command {
        Command::Precharge {
            bank: self.index,
            all_banks: false,
        }
    }

    fn column_command(&self, current: &BankRequest, row: u32) -> Command {
        let auto_precharge = self.with_auto_precharge
            && self
                .buffer
                .next()
                .is_some_and(|next| self.slicer.row(next.addr) != row);
        let col = self.slicer.col(current.addr);
        if current.is_write {
            Command::Write {
                bank: self.index,
                col,
                auto_precharge,
            }
        } else {
            Command::Read {
                bank: self.index,
                col,
                auto_precharge,
            }
        }
    }
}
