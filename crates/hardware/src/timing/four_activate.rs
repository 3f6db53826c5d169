//! Four-Activate Window Controller.
//!
//! Bounds the number of ACTIVATE commands in any `w` consecutive cycles to four (tFAW).
//! The controller keeps the pulse history of the previous `w - 1` cycles in a shift
//! register; a new ACTIVATE may issue only while that history holds fewer than four.
//! It is shared by every bank, so activations anywhere count toward the same window.

use std::collections::VecDeque;

use super::TimingController;

/// ACTIVATEs allowed within one window.
const MAX_ACTIVATES: usize = 4;

/// Sliding window of ACTIVATE pulses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FourActivateWindow {
    /// Pulse history, oldest first, `window - 1` entries once full.
    history: VecDeque<bool>,
    /// Number of history entries currently set.
    active: usize,
    /// History length.
    depth: usize,
}

impl FourActivateWindow {
    /// Creates an empty window.
    ///
    /// # Arguments
    ///
    /// * `window` - Window length in cycles; 0 or 1 never delays.
    pub fn new(window: u32) -> Self {
        let depth = window.saturating_sub(1) as usize;
        Self {
            history: VecDeque::with_capacity(depth + 1),
            active: 0,
            depth,
        }
    }

    /// Creates a window from an optional parameter; `None` never delays.
    pub fn optional(window: Option<u32>) -> Self {
        Self::new(window.unwrap_or(0))
    }

    /// Returns the number of ACTIVATEs inside the trailing window.
    pub const fn active(&self) -> usize {
        self.active
    }
}

impl TimingController for FourActivateWindow {
    fn ready(&self) -> bool {
        self.active < MAX_ACTIVATES
    }

    fn tick(&mut self, pulse: bool) {
        self.history.push_back(pulse);
        if pulse {
            self.active += 1;
        }
        if self.history.len() > self.depth && self.history.pop_front() == Some(true) {
            self.active -= 1;
        }
    }
}
