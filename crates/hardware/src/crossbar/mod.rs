//! Crossbar.
//!
//! Multiplexes M master ports onto the N bank machines. It performs the following:
//! 1. **Decode:** The bank field of each master address selects the target bank; the rest
//!    becomes the bank-local address.
//! 2. **Arbitration:** One round-robin arbiter per bank. A master is excluded from every other
//!    bank while a bank it is granted on holds its lock, so a master has at most one bank
//!    transaction in flight. Once the holder has been served, its new requests are held
//!    back while another master waits, so the bank drains and the grant rotates.
//! 3. **Data Alignment:** `wdata_ready` and `rdata_valid` are routed back to the granted master
//!    through fixed shift registers matching the PHY write and read latencies.

/// Fixed-latency shift register.
pub mod delay;

/// Master ports.
pub mod port;

use tracing::info;

pub use delay::DelayLine;
pub use port::{Port, PortStatus};

use crate::common::addr::{BankDecoder, Request};
use crate::common::arbiter::RoundRobin;
use crate::common::error::ConfigError;
use crate::config::{Config, PortConfig};
use crate::controller::BankResponse;
use crate::controller::bank::BankRequest;

/// Combinational routing of one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Routing {
    /// Per bank: request forwarded from the granted master.
    pub offers: Vec<Option<BankRequest>>,
    /// Per bank: masters competing for it this cycle.
    pub requests: Vec<Vec<bool>>,
    /// Per master: its command is accepted this cycle.
    pub cmd_ready: Vec<bool>,
    /// Per bank: lock sampled for this cycle.
    pub bank_locks: Vec<bool>,
}

/// Builds a [`Crossbar`] port by port.
#[derive(Debug)]
pub struct CrossbarBuilder {
    decoder: BankDecoder,
    nbanks: usize,
    native_width: u32,
    write_latency: u32,
    read_latency: u32,
    ports: Vec<Port>,
}

impl CrossbarBuilder {
    /// Starts a crossbar for a controller configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            decoder: BankDecoder::new(config.bank_index_bits(), config.column_word_bits()),
            nbanks: config.nbanks(),
            native_width: config.native_data_width(),
            write_latency: config.phy.write_latency.saturating_add(1),
            read_latency: config.phy.read_latency.saturating_add(1),
            ports: Vec::new(),
        }
    }

    /// Adds a master port.
    ///
    /// # Returns
    ///
    /// The index of the new port, or [`ConfigError::NonIntegerWidthRatio`] if its width
    /// cannot be converted to the native width.
    pub fn port(&mut self, config: &PortConfig) -> Result<usize, ConfigError> {
        let index = self.ports.len();
        let port = Port::new(index, config, self.native_width)?;
        self.ports.push(port);
        Ok(index)
    }

    /// Finishes the crossbar.
    pub fn build(self) -> Result<Crossbar, ConfigError> {
        if self.ports.is_empty() {
            return Err(ConfigError::InvalidSettings(
                "crossbar needs at least one master port".to_string(),
            ));
        }
        let nmasters = self.ports.len();
        info!(
            masters = nmasters,
            banks = self.nbanks,
            write_latency = self.write_latency,
            read_latency = self.read_latency,
            "crossbar built"
        );
        Ok(Crossbar {
            decoder: self.decoder,
            arbiters: vec![RoundRobin::new(nmasters); self.nbanks],
            served: vec![false; self.nbanks],
            wdata_delay: vec![DelayLine::new(self.write_latency); nmasters],
            rdata_delay: vec![DelayLine::new(self.read_latency); nmasters],
            wdata_source: None,
            rdata_sink: None,
            ports: self.ports,
        })
    }
}

/// Master-to-bank router with per-bank arbitration.
#[derive(Debug, Clone)]
pub struct Crossbar {
    decoder: BankDecoder,
    ports: Vec<Port>,
    arbiters: Vec<RoundRobin>,
    /// Per bank: the granted master has had a request accepted since its grant.
    served: Vec<bool>,
    wdata_delay: Vec<DelayLine>,
    rdata_delay: Vec<DelayLine>,
    wdata_source: Option<usize>,
    rdata_sink: Option<usize>,
}

impl Crossbar {
    /// Returns the master ports.
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    /// Returns the number of master ports.
    pub fn nmasters(&self) -> usize {
        self.ports.len()
    }

    /// Returns `true` if the master granted on `bank` has had a request accepted since
    /// it took the grant.
    pub fn served(&self, bank: usize) -> bool {
        self.served.get(bank).copied().unwrap_or(false)
    }

    /// Returns the master currently granted on `bank`.
    pub fn grant(&self, bank: usize) -> Option<usize> {
        self.arbiters.get(bank).map(RoundRobin::grant)
    }

    /// Returns the master whose write data drives the shared write bus this cycle.
    pub const fn wdata_source(&self) -> Option<usize> {
        self.wdata_source
    }

    /// Returns the master receiving the shared read data this cycle.
    pub const fn rdata_sink(&self) -> Option<usize> {
        self.rdata_sink
    }

    /// Returns `true` while any data strobe is still in flight.
    pub fn is_busy(&self) -> bool {
        self.wdata_delay.iter().chain(&self.rdata_delay).any(DelayLine::is_busy)
    }

    /// Returns `true` if `master` is excluded from `bank` because another bank it is
    /// granted on holds its lock.
    pub fn master_locked(&self, master: usize, bank: usize, bank_locks: &[bool]) -> bool {
        self.arbiters.iter().enumerate().any(|(other, arbiter)| {
            other != bank
                && arbiter.grant() == master
                && bank_locks.get(other).copied().unwrap_or(false)
        })
    }

    /// Routes this cycle's master commands to the banks.
    ///
    /// # Arguments
    ///
    /// * `commands` - Command offered by each master.
    /// * `bank_ready` - Per bank: a request can be accepted.
    /// * `bank_locks` - Per bank: buffered work or parked for refresh.
    pub fn route(
        &self,
        commands: &[Option<Request>],
        bank_ready: &[bool],
        bank_locks: &[bool],
    ) -> Routing {
        let nmasters = self.ports.len();
        let mut routing = Routing {
            offers: vec![None; self.arbiters.len()],
            requests: Vec::with_capacity(self.arbiters.len()),
            cmd_ready: vec![false; nmasters],
            bank_locks: bank_locks.to_vec(),
        };
        for (bank, arbiter) in self.arbiters.iter().enumerate() {
            let selected: Vec<bool> = (0..nmasters)
                .map(|master| {
                    commands.get(master).copied().flatten().is_some_and(|command| {
                        self.decoder.bank(command.address) == bank
                            && !self.master_locked(master, bank, bank_locks)
                    })
                })
                .collect();
            let grant = arbiter.grant();
            let contended = selected
                .iter()
                .enumerate()
                .any(|(master, &waiting)| waiting && master != grant);
            let yielding = contended && self.served.get(bank).copied().unwrap_or(false);
            if !yielding && selected.get(grant).copied().unwrap_or(false) {
                if let Some(Some(command)) = commands.get(grant) {
                    routing.offers[bank] = Some(BankRequest {
                        is_write: command.is_write,
                        addr: self.decoder.row_column(command.address),
                    });
                    routing.cmd_ready[grant] = bank_ready.get(bank).copied().unwrap_or(false);
                }
            }
            routing.requests.push(selected);
        }
        routing
    }

    /// Applies one clock edge and returns the per-master handshakes of this cycle.
    ///
    /// # Arguments
    ///
    /// * `routing` - This cycle's routing.
    /// * `responses` - Per bank: data handshakes produced by the controller this cycle.
    pub fn commit(&mut self, routing: &Routing, responses: &[BankResponse]) -> Vec<PortStatus> {
        let nmasters = self.ports.len();
        let mut wdata = vec![false; nmasters];
        let mut rdata = vec![false; nmasters];
        for (bank, arbiter) in self.arbiters.iter().enumerate() {
            let response = responses.get(bank).copied().unwrap_or_default();
            let grant = arbiter.grant();
            if grant < nmasters {
                wdata[grant] |= response.wdata_ready;
                rdata[grant] |= response.rdata_valid;
            }
        }

        let mut status: Vec<PortStatus> = routing
            .cmd_ready
            .iter()
            .map(|&cmd_ready| PortStatus {
                cmd_ready,
                ..PortStatus::default()
            })
            .collect();
        for (master, port) in status.iter_mut().enumerate() {
            port.wdata_ready = self.wdata_delay[master].shift(wdata[master]);
            port.rdata_valid = self.rdata_delay[master].shift(rdata[master]);
        }
        self.wdata_source = status.iter().position(|port| port.wdata_ready);
        self.rdata_sink = status.iter().position(|port| port.rdata_valid);

        let banks = self.arbiters.iter_mut().zip(self.served.iter_mut());
        for (bank, (arbiter, served)) in banks.enumerate() {
            let requests = routing.requests.get(bank).map_or(&[][..], Vec::as_slice);
            let valid = routing.offers.get(bank).is_some_and(Option::is_some);
            let locked = routing.bank_locks.get(bank).copied().unwrap_or(false);
            let holder = arbiter.grant();
            let accepted = valid && routing.cmd_ready.get(holder).copied().unwrap_or(false);
            arbiter.commit(!valid && !locked, requests);
            *served = if arbiter.grant() == holder {
                *served || accepted
            } else {
                false
            };
        }
        status
    }
}
