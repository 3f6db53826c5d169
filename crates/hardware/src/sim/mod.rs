//! Whole-controller simulation.
//!
//! Wires master ports through the crossbar into the controller core and advances both on
//! one clock.

/// Crossbar plus controller, stepped together.
pub mod system;

pub use system::{System, SystemCycle};
