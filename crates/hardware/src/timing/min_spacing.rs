//! Minimum Spacing Controller.
//!
//! Enforces a minimum distance of `n` cycles between two gated events. An event in
//! cycle `t` holds `ready` low for cycles `t+1 .. t+n-1`; the next event may issue at `t+n`.
//! A spacing of 0 or 1 never delays anything and the countdown is never armed.

use super::TimingController;

/// Countdown register enforcing a minimum event spacing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinSpacing {
    /// Required spacing in cycles.
    spacing: u32,
    /// Cycles left until the next event may issue.
    count: u32,
}

impl MinSpacing {
    /// Creates a controller that is initially ready.
    ///
    /// # Arguments
    ///
    /// * `spacing` - Minimum number of cycles between two events.
    pub const fn new(spacing: u32) -> Self {
        Self { spacing, count: 0 }
    }

    /// Creates a controller from an optional parameter; `None` never delays.
    pub const fn optional(spacing: Option<u32>) -> Self {
        match spacing {
            Some(spacing) => Self::new(spacing),
            None => Self::new(0),
        }
    }

    /// Returns the configured spacing.
    pub const fn spacing(&self) -> u32 {
        self.spacing
    }

    /// Returns the cycles left until `ready` rises.
    pub const fn remaining(&self) -> u32 {
        self.count
    }
}

impl TimingController for MinSpacing {
    fn ready(&self) -> bool {
        self.count == 0
    }

    fn tick(&mut self, pulse: bool) {
        self.count = if pulse {
            self.spacing.saturating_sub(1)
        } else {
            self.count.saturating_sub(1)
        };
    }
}
