//! # Unit Components
//!
//! This module serves as the central hub for the per-component tests of the scheduling
//! core, from the timing counters up to the full crossbar-plus-controller system.

/// Unit tests for shared building blocks.
///
/// This module includes tests for address decomposition, the round-robin arbiter,
/// and the command/DFI encodings.
pub mod common;



/// Bank machine command sequences and refresh handshake.
pub mod bank_machine;




/// Protocol checker rules used by the system scenarios.
pub mod checker;


/// Statistics counters and report formatting.
pub mod stats;
