//! System: crossbar and controller on one clock.
//!
//! Each call to [`System::step`] is one cycle:
//! 1. **Route:** The crossbar maps master commands onto bank offers from the registered
//!    grants and the bank locks sampled before the edge.
//! 2. **Schedule:** The controller evaluates and commits.
//! 3. **Handshake:** The crossbar delays the per-bank data strobes back to the masters and
//!    moves its arbiters.

use crate::common::addr::Request;
use crate::common::error::ConfigError;
use crate::config::Config;
use crate::controller::{Controller, ControllerCycle};
use crate::crossbar::{Crossbar, CrossbarBuilder, PortStatus};
use crate::stats::ControllerStats;

/// Observable result of one system cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemCycle {
    /// Per master: handshakes of this cycle.
    pub ports: Vec<PortStatus>,
    /// What the controller core did this cycle.
    pub controller: ControllerCycle,
}

/// Multi-port DRAM controller.
#[derive(Debug, Clone)]
pub struct System {
    controller: Controller,
    crossbar: Crossbar,
}

impl System {
    /// Builds the controller and one crossbar port per configured port.
    ///
    /// # Returns
    ///
    /// The system, or the first configuration error.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let controller = Controller::new(config)?;
        let mut builder = CrossbarBuilder::new(config);
        for port in &config.ports {
            let _ = builder.port(port)?;
        }
        Ok(Self {
            controller,
            crossbar: builder.build()?,
        })
    }

    /// Returns the controller core.
    pub const fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Returns the controller core mutably.
    pub const fn controller_mut(&mut self) -> &mut Controller {
        &mut self.controller
    }

    /// Returns the crossbar.
    pub const fn crossbar(&self) -> &Crossbar {
        &self.crossbar
    }

    /// Returns the statistics collected so far.
    pub const fn stats(&self) -> &ControllerStats {
        self.controller.stats()
    }

    /// Returns `true` once no request is buffered and no data strobe is in flight.
    pub fn is_idle(&self) -> bool {
        self.controller.is_idle() && !self.crossbar.is_busy()
    }

    /// Advances one cycle.
    ///
    /// # Arguments
    ///
    /// * `commands` - Command offered by each master this cycle; it stays offered until
    ///   the returned `cmd_ready` for that master is high.
    pub fn step(&mut self, commands: &[Option<Request>]) -> SystemCycle {
        let nbanks = self.controller.nbanks();
        let bank_ready: Vec<bool> = (0..nbanks).map(|b| self.controller.req_ready(b)).collect();
        let bank_locks: Vec<bool> = (0..nbanks).map(|b| self.controller.bank_lock(b)).collect();
        let routing = self.crossbar.route(commands, &bank_ready, &bank_locks);
        let controller = self.controller.step(&routing.offers);
        let ports = self.crossbar.commit(&routing, &controller.responses);
        SystemCycle { ports, controller }
    }
}
