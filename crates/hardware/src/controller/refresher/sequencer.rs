//! Refresh command sequence.
//!
//! Cycle offsets relative to the cycle the multiplexer granted the bus:
//!
//! | Offset                         | Command         |
//! |--------------------------------|-----------------|
//! | `1`                            | PRECHARGE ALL   |
//! | `1 + tRP + k * tRFC`           | REFRESH `k`     |
//! | `1 + tRP + n * tRFC`           | ZQCS (optional) |
//! | last REFRESH/ZQCS + tRFC/tZQCS | done            |

use crate::common::command::Command;

/// Command timeline of one refresh round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSequencer {
    t_rp: u32,
    t_rfc: u32,
    t_zqcs: u32,
    refreshes: u32,
}

impl RefreshSequencer {
    /// Creates a sequencer.
    ///
    /// # Arguments
    ///
    /// * `t_rp` - Precharge period before the first REFRESH.
    /// * `t_rfc` - Refresh cycle time between REFRESH commands.
    /// * `t_zqcs` - ZQ calibration time, when ZQCS is appended.
    /// * `refreshes` - REFRESH commands per round (postponing factor).
    pub fn new(t_rp: u32, t_rfc: u32, t_zqcs: u32, refreshes: u32) -> Self {
        Self {
            t_rp,
            t_rfc: t_rfc.max(1),
            t_zqcs: t_zqcs.max(1),
            refreshes: refreshes.max(1),
        }
    }

    const fn first_refresh(&self) -> u32 {
        self.t_rp.saturating_add(1)
    }

    const fn refreshes_done(&self) -> u32 {
        self.first_refresh()
            .saturating_add(self.refreshes.saturating_mul(self.t_rfc))
    }

    /// Returns the command issued at `elapsed` cycles into the round.
    pub fn command(&self, elapsed: u32, with_zqcs: bool) -> Option<Command> {
        if elapsed == 1 {
            return Some(Command::Precharge {
                bank: 0,
                all_banks: true,
            });
        }
        if elapsed >= self.first_refresh() && elapsed < self.refreshes_done() {
            let offset = elapsed - self.first_refresh();
            return (offset % self.t_rfc == 0).then_some(Command::Refresh { bank: None });
        }
        (with_zqcs && elapsed == self.refreshes_done()).then_some(Command::ZqCalibration)
    }

    /// Returns the offset at which the round completes.
    pub fn length(&self, with_zqcs: bool) -> u32 {
        if with_zqcs {
            self.refreshes_done().saturating_add(self.t_zqcs)
        } else {
            self.refreshes_done()
        }
    }
}
