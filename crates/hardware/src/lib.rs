//! DRAM controller scheduling core.
//!
//! This crate implements a cycle-accurate model of a multi-port SDRAM controller with the following:
//! 1. **Timing:** Minimum-spacing and four-activate-window checkers.
//! 2. **Bank Machines:** Per-bank request buffering, row tracking, and command generation.
//! 3. **Refresh:** Periodic refresh with postponing, PRECHARGE ALL, and optional ZQ calibration.
//! 4. **Multiplexer:** Cross-bank command arbitration, read/write turnaround, and DFI steering.
//! 5. **Crossbar:** Master-port arbitration onto the banks with per-master data alignment.

/// Common types (requests, commands, DFI phases, arbiter, errors).
pub mod common;
/// Controller configuration (defaults, enums, hierarchical config structures).
pub mod config;
/// Controller core (bank machines, multiplexer, refresher).
pub mod controller;
/// Master-port crossbar.
pub mod crossbar;
/// Crossbar and controller stepped together.
pub mod sim;
/// Scheduler statistics collection and reporting.
pub mod stats;
/// Timing constraint checkers.
pub mod timing;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Command-scheduling core; construct with `Controller::new`.
pub use crate::controller::Controller;
/// Multi-port controller (crossbar plus core); construct with `System::new`.
pub use crate::sim::System;
