//! Command steerer.
//!
//! Places the commands issued in a cycle onto the DFI phases and registers them, so the
//! PHY sees them one cycle later. Column commands go to the read or write phase, row
//! commands to the matching command phase, and refresh-sequence commands to phase 0.

use crate::common::command::Command;
use crate::common::dfi::DfiPhase;
use crate::config::PhyConfig;

/// Source driving one DFI phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SteerSource {
    /// Nothing.
    #[default]
    Nop,
    /// The row-command chooser.
    Cmd,
    /// The column (request) chooser.
    Req,
    /// The refresher.
    Refresh,
}

/// Data direction of the multiplexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Reading: columns on `rdphase`, rows on `rdcmdphase`.
    Read,
    /// Writing: columns on `wrphase`, rows on `wrcmdphase`.
    Write,
}

/// Registered DFI phase drivers.
#[derive(Debug, Clone)]
pub struct Steerer {
    phases: Vec<DfiPhase>,
    rdphase: usize,
    wrphase: usize,
    rdcmdphase: usize,
    wrcmdphase: usize,
    bankbits: u32,
    nranks: u32,
}

impl Steerer {
    /// Creates a steerer driving NOPs on every phase.
    ///
    /// # Arguments
    ///
    /// * `phy` - PHY phase assignment.
    /// * `bankbits` - Bank address bits per rank.
    pub fn new(phy: &PhyConfig, bankbits: u32) -> Self {
        Self {
            phases: vec![DfiPhase::nop(); phy.nphases as usize],
            rdphase: phy.rdphase as usize,
            wrphase: phy.wrphase as usize,
            rdcmdphase: phy.rdcmdphase as usize,
            wrcmdphase: phy.wrcmdphase as usize,
            bankbits,
            nranks: phy.nranks,
        }
    }

    /// Returns the registered phases driven to the PHY this cycle.
    pub fn phases(&self) -> &[DfiPhase] {
        &self.phases
    }

    /// Returns the source of every phase for a data direction.
    pub fn selection(&self, direction: Direction) -> Vec<SteerSource> {
        let (req, cmd) = match direction {
            Direction::Read => (self.rdphase, self.rdcmdphase),
            Direction::Write => (self.wrphase, self.wrcmdphase),
        };
        (0..self.phases.len())
            .map(|i| {
                if i == req {
                    SteerSource::Req
                } else if i == cmd {
                    SteerSource::Cmd
                } else {
                    SteerSource::Nop
                }
            })
            .collect()
    }

    /// Returns the source of every phase while refreshing.
    pub fn refresh_selection(&self) -> Vec<SteerSource> {
        (0..self.phases.len())
            .map(|i| {
                if i == 0 {
                    SteerSource::Refresh
                } else {
                    SteerSource::Nop
                }
            })
            .collect()
    }

    /// Registers the commands issued this cycle, one entry per phase.
    pub fn commit(&mut self, issued: &[Option<Command>]) {
        for (phase, command) in self.phases.iter_mut().zip(issued) {
            *phase = match command {
                Some(command) => DfiPhase::drive(command, self.bankbits, self.nranks),
                None => DfiPhase::nop(),
            };
        }
    }
}
