//! Common types used throughout the controller model.
//!
//! This module provides the building blocks shared by every scheduling component. It includes:
//! 1. **Addressing:** Master requests and the row-bank-column address map.
//! 2. **Commands:** The tagged DRAM command and its SDRAM pin encoding.
//! 3. **DFI:** The per-phase PHY command interface.
//! 4. **Arbitration:** The round-robin arbiter shared by the choosers and the crossbar.
//! 5. **Error Handling:** Configuration-time error taxonomy.

/// Requests and address decomposition.
pub mod addr;

/// Round-robin arbiter with clock enable.
pub mod arbiter;

/// DRAM command representation.
pub mod command;

/// DFI phase encoding and decoding.
pub mod dfi;

/// Configuration error definitions.
pub mod error;

pub use addr::{AddressMap, DramAddress, Request};
pub use arbiter::RoundRobin;
pub use command::Command;
pub use dfi::DfiPhase;
pub use error::ConfigError;
