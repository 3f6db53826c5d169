//! Refresher.
//!
//! Periodically takes the command bus away from the bank machines to refresh the DRAM.
//! It performs the following:
//! 1. **Interval Timing:** A free-running tREFI timer, with expirations batched by the postponer.
//! 2. **Bus Request:** `valid` is raised and held; every bank machine closes its row and grants.
//! 3. **Sequence:** Once the multiplexer hands over the bus, PRECHARGE ALL, the REFRESH burst,
//!    and an optional ZQCS are issued on their fixed timeline, then `last` returns the bus.

/// Refresh command timeline.
pub mod sequencer;

/// Refresh interval timer and postponer.
pub mod timer;

use tracing::debug;

pub use sequencer::RefreshSequencer;
pub use timer::{RefreshPostponer, RefreshTimer};

use crate::common::command::Command;
use crate::config::Config;

/// Refresher FSM state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefresherState {
    /// Waiting for the next refresh request.
    #[default]
    Idle,
    /// Requesting the bus until the multiplexer grants it.
    WaitGrant,
    /// Running the refresh sequence.
    Sequence {
        /// Cycles since the bus was granted.
        elapsed: u32,
        /// This round ends with a ZQ calibration.
        with_zqcs: bool,
    },
}

/// Combinational outputs of the refresher for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefresherOutputs {
    /// Refresh requested; drives every bank machine's `refresh_req`.
    pub valid: bool,
    /// Command issued this cycle while the sequence runs.
    pub command: Option<Command>,
    /// The sequence completes this cycle.
    pub last: bool,
}

/// Periodic refresh coordinator.
#[derive(Debug, Clone)]
pub struct Refresher {
    enabled: bool,
    timer: RefreshTimer,
    postponer: RefreshPostponer,
    sequencer: RefreshSequencer,
    state: RefresherState,
    pending: bool,
    zqcs_interval: Option<u32>,
    rounds: u64,
}

impl Refresher {
    /// Creates a refresher from the controller configuration.
    pub fn new(config: &Config) -> Self {
        let timing = &config.timing;
        let settings = &config.controller;
        Self {
            enabled: settings.with_refresh,
            timer: RefreshTimer::new(timing.t_refi),
            postponer: RefreshPostponer::new(settings.refresh_postponing),
            sequencer: RefreshSequencer::new(
                timing.t_rp,
                timing.t_rfc,
                timing.t_zqcs.unwrap_or(0),
                settings.refresh_postponing,
            ),
            state: RefresherState::Idle,
            pending: false,
            zqcs_interval: settings.zqcs_interval,
            rounds: 0,
        }
    }

    /// Returns the FSM state.
    pub const fn state(&self) -> RefresherState {
        self.state
    }

    /// Returns the number of completed refresh rounds.
    pub const fn rounds(&self) -> u64 {
        self.rounds
    }

    /// Computes this cycle's outputs from the current state.
    pub fn evaluate(&self) -> RefresherOutputs {
        match self.state {
            RefresherState::Idle => RefresherOutputs::default(),
            RefresherState::WaitGrant => RefresherOutputs {
                valid: true,
                ..RefresherOutputs::default()
            },
            RefresherState::Sequence { elapsed, with_zqcs } => {
                let last = elapsed >= self.sequencer.length(with_zqcs);
                RefresherOutputs {
                    valid: !last,
                    command: self.sequencer.command(elapsed, with_zqcs),
                    last,
                }
            }
        }
    }

    /// Applies one clock edge.
    ///
    /// # Arguments
    ///
    /// * `ready` - The multiplexer has handed the command bus to the refresher.
    pub fn commit(&mut self, ready: bool) {
        if !self.enabled {
            return;
        }
        let expired = self.timer.done();
        let request = self.postponer.request(expired);
        self.timer.tick();
        self.postponer.tick(expired);

        self.state = match self.state {
            RefresherState::Idle => {
                if self.pending || request {
                    self.pending = false;
                    debug!(round = self.rounds, "refresh requested");
                    RefresherState::WaitGrant
                } else {
                    RefresherState::Idle
                }
            }
            RefresherState::WaitGrant => {
                self.pending |= request;
                if ready {
                    RefresherState::Sequence {
                        elapsed: 1,
                        with_zqcs: self.zqcs_due(),
                    }
                } else {
                    RefresherState::WaitGrant
                }
            }
            RefresherState::Sequence { elapsed, with_zqcs } => {
                self.pending |= request;
                if elapsed >= self.sequencer.length(with_zqcs) {
                    self.rounds += 1;
                    debug!(round = self.rounds, with_zqcs, "refresh done");
                    RefresherState::Idle
                } else {
                    RefresherState::Sequence {
                        elapsed: elapsed + 1,
                        with_zqcs,
                    }
                }
            }
        };
    }

    fn zqcs_due(&self) -> bool {
        self.zqcs_interval
            .is_some_and(|interval| (self.rounds + 1) % u64::from(interval.max(1)) == 0)
    }
}
