//! DRAM controller core.
//!
//! Composes the bank machines, the multiplexer, and the refresher into one clocked unit.
//! Each call to [`Controller::step`] is one controller cycle:
//! 1. **Evaluate:** refresher, then every bank machine, then the multiplexer compute their
//!    outputs from the current register state.
//! 2. **Commit:** bank machines, multiplexer, and refresher apply their clock edge.
//!
//! Requests enter already decoded to a bank (see [`crate::crossbar`]); the controller
//! hands back per-bank data handshakes and drives the DFI phases.

/// Bank machine.
pub mod bank;

/// Multiplexer.
pub mod multiplexer;

/// Refresher.
pub mod refresher;

use tracing::info;

use self::bank::{BankMachine, BankOutputs, BankRequest};
use self::multiplexer::{MuxState, Multiplexer};
use self::refresher::Refresher;
use crate::common::command::Command;
use crate::common::dfi::DfiPhase;
use crate::common::error::ConfigError;
use crate::config::Config;
use crate::stats::ControllerStats;

/// Data handshake returned by a bank machine in one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BankResponse {
    /// A WRITE for this bank issued; its data is taken `write_latency` cycles later.
    pub wdata_ready: bool,
    /// A READ for this bank issued; its data returns `read_latency` cycles later.
    pub rdata_valid: bool,
}

/// Observable result of one controller cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ControllerCycle {
    /// Per bank: the offered request was accepted.
    pub req_accepted: Vec<bool>,
    /// Per bank: data handshakes.
    pub responses: Vec<BankResponse>,
    /// Per DFI phase: command issued this cycle (driven to the PHY next cycle).
    pub issued: Vec<Option<Command>>,
    /// Refresh was requested this cycle.
    pub refresh_req: bool,
}

impl ControllerCycle {
    /// Returns the commands issued this cycle.
    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.issued.iter().flatten()
    }
}

/// The command-scheduling core.
#[derive(Debug, Clone)]
pub struct Controller {
    config: Config,
    banks: Vec<BankMachine>,
    multiplexer: Multiplexer,
    refresher: Refresher,
    stats: ControllerStats,
}

impl Controller {
    /// Elaborates a controller.
    ///
    /// # Arguments
    ///
    /// * `config` - Controller configuration; validated before anything is built.
    ///
    /// # Returns
    ///
    /// The controller, or the first configuration error.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let banks = (0..config.nbanks())
            .map(|index| BankMachine::new(index, config))
            .collect();
        info!(
            memtype = ?config.phy.memtype,
            nphases = config.phy.nphases,
            nranks = config.phy.nranks,
            nbanks = config.nbanks(),
            rowbits = config.geom.rowbits,
            colbits = config.geom.colbits,
            "controller elaborated"
        );
        Ok(Self {
            config: config.clone(),
            banks,
            multiplexer: Multiplexer::new(config),
            refresher: Refresher::new(config),
            stats: ControllerStats::default(),
        })
    }

    /// Returns the configuration the controller was built from.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the number of bank machines.
    pub fn nbanks(&self) -> usize {
        self.banks.len()
    }

    /// Returns the bank machines.
    pub fn banks(&self) -> &[BankMachine] {
        &self.banks
    }

    /// Returns the multiplexer.
    pub const fn multiplexer(&self) -> &Multiplexer {
        &self.multiplexer
    }

    /// Returns the multiplexer mutably (bandwidth snapshots).
    pub const fn multiplexer_mut(&mut self) -> &mut Multiplexer {
        &mut self.multiplexer
    }

    /// Returns the refresher.
    pub const fn refresher(&self) -> &Refresher {
        &self.refresher
    }

    /// Returns the statistics collected so far.
    pub const fn stats(&self) -> &ControllerStats {
        &self.stats
    }

    /// Returns the registered DFI phases driven this cycle.
    pub fn dfi(&self) -> &[DfiPhase] {
        self.multiplexer.dfi()
    }

    /// Returns `true` if bank `bank` can accept a request this cycle.
    pub fn req_ready(&self, bank: usize) -> bool {
        self.banks.get(bank).is_some_and(BankMachine::req_ready)
    }

    /// Returns the lock of bank `bank` (buffered work or parked for refresh).
    pub fn bank_lock(&self, bank: usize) -> bool {
        self.banks.get(bank).is_some_and(BankMachine::bank_lock)
    }

    /// Returns `true` if no bank machine holds a request.
    pub fn is_idle(&self) -> bool {
        self.banks.iter().all(|bank| bank.buffer().is_empty())
    }

    /// Advances one controller cycle.
    ///
    /// # Arguments
    ///
    /// * `offers` - Request offered to each bank this cycle; an offer is taken only if the
    ///   bank is ready, matching a valid/ready handshake. Missing entries offer nothing.
    ///
    /// # Returns
    ///
    /// Accepted offers, data handshakes, and the commands issued this cycle.
    pub fn step(&mut self, offers: &[Option<BankRequest>]) -> ControllerCycle {
        let refresh = self.refresher.evaluate();
        let outputs: Vec<BankOutputs> = self
            .banks
            .iter()
            .map(|bank| bank.evaluate(refresh.valid))
            .collect();
        let decision = self.multiplexer.evaluate(&outputs, &refresh);

        let mut req_accepted = Vec::with_capacity(self.banks.len());
        let mut responses = Vec::with_capacity(self.banks.len());
        for (index, bank) in self.banks.iter_mut().enumerate() {
            let accepted = decision.accepted.get(index).copied().unwrap_or(false);
            let command = outputs[index].command.filter(|_| accepted);
            let push = offers
                .get(index)
                .copied()
                .flatten()
                .filter(|_| outputs[index].req_ready);
            bank.commit(refresh.valid, accepted, push);
            req_accepted.push(push.is_some());
            responses.push(BankResponse {
                wdata_ready: command.is_some_and(|c| c.is_write()),
                rdata_valid: command.is_some_and(|c| c.is_read()),
            });
        }

        let in_refresh = self.multiplexer.state() == MuxState::Refresh;
        self.multiplexer.commit(&decision, &refresh);
        self.refresher.commit(decision.refresh_ready);

        self.stats.cycles += 1;
        self.stats.refresh_cycles += u64::from(in_refresh);
        self.stats.direction_switches = self.multiplexer.direction_switches();
        self.stats.requests_accepted += req_accepted.iter().filter(|&&a| a).count() as u64;
        for response in &responses {
            self.stats.writes_completed += u64::from(response.wdata_ready);
            self.stats.reads_completed += u64::from(response.rdata_valid);
        }
        for command in decision.commands() {
            self.stats.record(command);
            #[cfg(feature = "always-trace")]
            info!(cycle = self.stats.cycles, ?command, "issue");
            #[cfg(not(feature = "always-trace"))]
            tracing::trace!(cycle = self.stats.cycles, ?command, "issue");
        }

        ControllerCycle {
            req_accepted,
            responses,
            issued: decision.issued,
            refresh_req: refresh.valid,
        }
    }
}
