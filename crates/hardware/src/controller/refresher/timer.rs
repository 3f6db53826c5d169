//! Refresh interval timer and postponer.

/// Free-running countdown that fires once every `period` cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTimer {
    period: u32,
    count: u32,
}

impl RefreshTimer {
    /// Creates a timer that first fires after `period` cycles.
    pub const fn new(period: u32) -> Self {
        Self {
            period,
            count: period.saturating_sub(1),
        }
    }

    /// Returns `true` in the cycle the interval elapses.
    pub const fn done(&self) -> bool {
        self.count == 0
    }

    /// Advances one clock edge.
    pub const fn tick(&mut self) {
        self.count = if self.count == 0 {
            self.period.saturating_sub(1)
        } else {
            self.count - 1
        };
    }
}

/// Batches `postponing` timer expirations into one refresh request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshPostponer {
    postponing: u32,
    count: u32,
}

impl RefreshPostponer {
    /// Creates a postponer that requests on every `postponing`-th expiration.
    pub const fn new(postponing: u32) -> Self {
        let postponing = if postponing == 0 { 1 } else { postponing };
        Self {
            postponing,
            count: postponing - 1,
        }
    }

    /// Returns `true` if the timer expiration seen this cycle completes a batch.
    pub const fn request(&self, expired: bool) -> bool {
        expired && self.count == 0
    }

    /// Advances one clock edge.
    pub const fn tick(&mut self, expired: bool) {
        if expired {
            self.count = if self.count == 0 {
                self.postponing - 1
            } else {
                self.count - 1
            };
        }
    }
}
