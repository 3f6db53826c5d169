//! Multiplexer.
//!
//! Forwards at most one command per chooser per cycle from the bank machines to the DFI
//! phases. It performs the following:
//! 1. **Selection:** A column chooser and, for multi-phase PHYs, a row-command chooser pick
//!    round-robin among the banks whose command class is wanted.
//! 2. **Bus Timing:** tRRD and tFAW gate ACTIVATE; tCCD gates column commands; tWTR and the
//!    read-to-write turnaround delay direction switches.
//! 3. **Direction Control:** The FSM alternates between reading and writing, with
//!    `read_time`/`write_time` budgets preventing either direction from starving.
//! 4. **Refresh:** Once every bank grants, the bus is handed to the refresher until its
//!    sequence completes.
//! 5. **Steering:** Issued commands are registered onto their DFI phases.

/// Bandwidth counter.
pub mod bandwidth;

/// Command chooser.
pub mod chooser;

/// Command steerer.
pub mod steerer;

use tracing::debug;

pub use bandwidth::{Bandwidth, BandwidthSample};
pub use chooser::{Choice, ChooserOutput, CommandChooser, Wants};
pub use steerer::{Direction, SteerSource, Steerer};

use crate::common::command::Command;
use crate::common::dfi::DfiPhase;
use crate::config::Config;
use crate::controller::bank::BankOutputs;
use crate::controller::refresher::RefresherOutputs;
use crate::timing::{FourActivateWindow, MinSpacing, TimingController};

/// Multiplexer FSM state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MuxState {
    /// Issuing reads and row commands.
    #[default]
    Read,
    /// Issuing writes and row commands.
    Write,
    /// The refresher owns the command bus.
    Refresh,
    /// Write-to-read turnaround.
    WriteToRead,
    /// Read-to-write turnaround.
    ReadToWrite {
        /// Cycles left before writing may start.
        remaining: u32,
    },
}

/// Anti-starvation budget for one data direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarvationTimer {
    timeout: u32,
    remaining: u32,
}

impl StarvationTimer {
    /// Creates a timer; a timeout of 0 never expires.
    pub const fn new(timeout: u32) -> Self {
        Self {
            timeout,
            remaining: timeout.saturating_sub(1),
        }
    }

    /// Returns `true` once the direction has held the bus for its whole budget.
    pub const fn expired(&self) -> bool {
        self.timeout > 0 && self.remaining == 0
    }

    /// Advances one clock edge.
    ///
    /// # Arguments
    ///
    /// * `enabled` - The direction owned the bus this cycle; otherwise the budget reloads.
    pub const fn tick(&mut self, enabled: bool) {
        if !enabled {
            self.remaining = self.timeout.saturating_sub(1);
        } else if !self.expired() {
            self.remaining = self.remaining.saturating_sub(1);
        }
    }
}

/// Everything the multiplexer decided in one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MuxDecision {
    /// Column (request) chooser evaluation.
    pub req: ChooserOutput,
    /// Row-command chooser evaluation, for multi-phase PHYs.
    pub cmd: Option<ChooserOutput>,
    /// The column chooser's command would be accepted.
    pub req_ready: bool,
    /// The row-command chooser's command would be accepted.
    pub cmd_ready: bool,
    /// The refresher owns the command bus.
    pub refresh_ready: bool,
    /// Per bank machine: its command issued this cycle.
    pub accepted: Vec<bool>,
    /// Per DFI phase: command issued this cycle.
    pub issued: Vec<Option<Command>>,
    /// Some bank machine offers a READ.
    pub read_available: bool,
    /// Some bank machine offers a WRITE.
    pub write_available: bool,
    /// Every bank machine granted the pending refresh.
    pub go_to_refresh: bool,
}

impl MuxDecision {
    /// Returns the commands issued this cycle.
    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.issued.iter().flatten()
    }
}

/// Cross-bank command arbiter and DFI driver.
#[derive(Debug, Clone)]
pub struct Multiplexer {
    state: MuxState,
    choose_req: CommandChooser,
    choose_cmd: Option<CommandChooser>,
    steerer: Steerer,
    trrd: MinSpacing,
    tfaw: FourActivateWindow,
    tccd: MinSpacing,
    twtr: MinSpacing,
    read_to_write: u32,
    read_budget: StarvationTimer,
    write_budget: StarvationTimer,
    bandwidth: Option<Bandwidth>,
    direction_switches: u64,
}

impl Multiplexer {
    /// Creates the multiplexer for a validated configuration.
    pub fn new(config: &Config) -> Self {
        let nbanks = config.nbanks();
        let timing = &config.timing;
        let settings = &config.controller;
        Self {
            state: MuxState::Read,
            choose_req: CommandChooser::new(nbanks),
            choose_cmd: (config.phy.nphases > 1).then(|| CommandChooser::new(nbanks)),
            steerer: Steerer::new(&config.phy, config.geom.bankbits),
            trrd: MinSpacing::optional(timing.t_rrd),
            tfaw: FourActivateWindow::optional(timing.t_faw),
            tccd: MinSpacing::optional(timing.t_ccd),
            twtr: MinSpacing::new(config.write_to_read()),
            read_to_write: config.read_to_write(),
            read_budget: StarvationTimer::new(settings.read_time),
            write_budget: StarvationTimer::new(settings.write_time),
            bandwidth: settings.with_bandwidth.then(|| {
                Bandwidth::new(settings.bandwidth_period_bits, config.native_data_width())
            }),
            direction_switches: 0,
        }
    }

    /// Returns the FSM state.
    pub const fn state(&self) -> MuxState {
        self.state
    }

    /// Returns the registered DFI phases driven this cycle.
    pub fn dfi(&self) -> &[DfiPhase] {
        self.steerer.phases()
    }

    /// Returns the number of read/write direction switches so far.
    pub const fn direction_switches(&self) -> u64 {
        self.direction_switches
    }

    /// Returns the bandwidth counter, if enabled.
    pub const fn bandwidth(&self) -> Option<&Bandwidth> {
        self.bandwidth.as_ref()
    }

    /// Returns the bandwidth counter mutably, if enabled.
    pub const fn bandwidth_mut(&mut self) -> Option<&mut Bandwidth> {
        self.bandwidth.as_mut()
    }

    /// Decides this cycle's commands.
    ///
    /// # Arguments
    ///
    /// * `banks` - Outputs of every bank machine this cycle.
    /// * `refresh` - Outputs of the refresher this cycle.
    pub fn evaluate(&self, banks: &[BankOutputs], refresh: &RefresherOutputs) -> MuxDecision {
        let commands: Vec<Option<Command>> = banks.iter().map(|bank| bank.command).collect();
        let ras_allowed = self.trrd.ready() && self.tfaw.ready() && !refresh.valid;
        let cas_allowed = self.tccd.ready();

        let direction = match self.state {
            MuxState::Read => Some(Direction::Read),
            MuxState::Write => Some(Direction::Write),
            _ => None,
        };
        let (req_wants, cmd_wants) = match direction {
            Some(direction) => {
                let row = Wants {
                    cmds: true,
                    activates: ras_allowed,
                    ..Wants::NONE
                };
                let column = Wants {
                    reads: direction == Direction::Read,
                    writes: direction == Direction::Write,
                    ..Wants::NONE
                };
                if self.choose_cmd.is_some() {
                    (column, row)
                } else {
                    (
                        Wants {
                            reads: column.reads,
                            writes: column.writes,
                            ..row
                        },
                        Wants::NONE,
                    )
                }
            }
            None => (Wants::NONE, Wants::NONE),
        };

        let req = self.choose_req.evaluate(&commands, req_wants);
        let cmd = self
            .choose_cmd
            .as_ref()
            .map(|chooser| chooser.evaluate(&commands, cmd_wants));
        let admit = |choice: Option<&Choice>| {
            direction.is_some()
                && choice.is_some_and(|c| {
                    if c.command.is_column() {
                        cas_allowed
                    } else {
                        !c.command.is_activate() || ras_allowed
                    }
                })
        };
        let req_ready = admit(req.choice.as_ref());
        let cmd_ready = admit(cmd.as_ref().and_then(|c| c.choice.as_ref()));

        let (selection, refresh_ready) = match (self.state, direction) {
            (MuxState::Refresh, _) => (self.steerer.refresh_selection(), true),
            (_, Some(direction)) => (self.steerer.selection(direction), false),
            _ => (vec![SteerSource::Nop; self.steerer.phases().len()], false),
        };

        let mut accepted = vec![false; banks.len()];
        let issued = selection
            .iter()
            .map(|source| {
                let choice = match source {
                    SteerSource::Req if req_ready => req.choice,
                    SteerSource::Cmd if cmd_ready => cmd.as_ref().and_then(|c| c.choice),
                    SteerSource::Refresh => return refresh.command,
                    _ => None,
                }?;
                if let Some(flag) = accepted.get_mut(choice.bank) {
                    *flag = true;
                }
                Some(choice.command)
            })
            .collect();

        MuxDecision {
            req,
            cmd,
            req_ready,
            cmd_ready,
            refresh_ready,
            accepted,
            issued,
            read_available: commands.iter().flatten().any(Command::is_read),
            write_available: commands.iter().flatten().any(Command::is_write),
            go_to_refresh: refresh.valid
                && !banks.is_empty()
                && banks.iter().all(|bank| bank.refresh_gnt),
        }
    }

    /// Applies one clock edge.
    ///
    /// # Arguments
    ///
    /// * `decision` - This cycle's evaluation.
    /// * `refresh` - Outputs of the refresher this cycle.
    pub fn commit(&mut self, decision: &MuxDecision, refresh: &RefresherOutputs) {
        self.choose_req.commit(&decision.req, decision.req_ready);
        if let (Some(chooser), Some(output)) = (self.choose_cmd.as_mut(), decision.cmd.as_ref()) {
            chooser.commit(output, decision.cmd_ready);
        }

        let activate = decision.commands().any(Command::is_activate);
        let read = decision.commands().any(Command::is_read);
        let write = decision.commands().any(Command::is_write);
        let twtr_ready = self.twtr.ready();
        let read_expired = self.read_budget.expired();
        let write_expired = self.write_budget.expired();
        self.trrd.tick(activate);
        self.tfaw.tick(activate);
        self.tccd.tick(read || write);
        self.twtr.tick(write);
        self.read_budget.tick(self.state == MuxState::Read);
        self.write_budget.tick(self.state == MuxState::Write);
        if let Some(bandwidth) = self.bandwidth.as_mut() {
            bandwidth.tick(read, write);
        }

        let next = match self.state {
            MuxState::Read if decision.go_to_refresh => MuxState::Refresh,
            MuxState::Read
                if decision.write_available
                    && (!decision.read_available || read_expired) =>
            {
                self.read_to_write_state()
            }
            MuxState::Write if decision.go_to_refresh => MuxState::Refresh,
            MuxState::Write
                if decision.read_available
                    && (!decision.write_available || write_expired) =>
            {
                MuxState::WriteToRead
            }
            MuxState::Refresh if refresh.last => MuxState::Read,
            MuxState::WriteToRead if twtr_ready => MuxState::Read,
            MuxState::ReadToWrite { remaining } => {
                if remaining <= 1 {
                    MuxState::Write
                } else {
                    MuxState::ReadToWrite {
                        remaining: remaining - 1,
                    }
                }
            }
            state => state,
        };
        if matches!(
            (self.state, next),
            (MuxState::Read, MuxState::ReadToWrite { .. } | MuxState::Write)
                | (MuxState::Write, MuxState::WriteToRead)
        ) {
            self.direction_switches += 1;
            debug!(from = ?self.state, to = ?next, "direction switch");
        }
        self.state = next;
        self.steerer.commit(&decision.issued);
    }

    fn read_to_write_state(&self) -> MuxState {
        match self.read_to_write.saturating_sub(1) {
            0 => MuxState::Write,
            remaining => MuxState::ReadToWrite { remaining },
        }
    }
}
