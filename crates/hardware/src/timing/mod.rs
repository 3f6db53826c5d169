//! Timing-window controllers.
//!
//! This module defines the reusable counters that enforce DRAM timing parameters. It provides:
//! 1. **Timing Interface:** The `TimingController` trait shared by every constraint.
//! 2. **Minimum Spacing:** `MinSpacing`, a countdown enforcing a minimum distance between events.
//! 3. **Four-Activate Window:** `FourActivateWindow`, a sliding window bounding ACTIVATEs to four.
//!
//! Both follow the two-phase cycle model: `ready` reads the current register state,
//! `tick` applies the clock edge with the event observed during that cycle.

/// Sliding four-activate window (tFAW).
pub mod four_activate;

/// Minimum spacing countdown (tCCD, tRRD, tWTR, tRP, ...).
pub mod min_spacing;

pub use four_activate::FourActivateWindow;
pub use min_spacing::MinSpacing;

/// A timing constraint that gates one command class.
pub trait TimingController {
    /// Returns `true` if a gated command may issue in the current cycle.
    fn ready(&self) -> bool;

    /// Advances one clock edge.
    ///
    /// # Arguments
    ///
    /// * `pulse` - `true` if a gated command issued during the cycle that is ending.
    fn tick(&mut self, pulse: bool);
}
