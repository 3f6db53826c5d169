//! Configuration error definitions.
//!
//! This module defines the error taxonomy of the controller model. It provides:
//! 1. **Elaboration errors:** Address-mapping, geometry, and PHY settings the model cannot build.
//! 2. **Timing errors:** Parameter combinations that would permanently stall a command class.
//! 3. **Port errors:** Master ports whose data width cannot be converted to the native width.
//!
//! There are no runtime errors: once a controller is built, protocol violations are
//! unreachable and congestion shows up only as backpressure.

use thiserror::Error;

use crate::config::AddressMapping;

/// Errors raised while validating a configuration or elaborating the controller.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The requested address mapping is not implemented.
    ///
    /// Only [`AddressMapping::RowBankCol`] is supported.
    #[error("unsupported address mapping {0:?}: only RowBankCol is supported")]
    UnsupportedAddressMapping(AddressMapping),

    /// A master port's data width is not a power-of-two multiple or divisor of the native width.
    #[error("port data width {port} bits has no integer power-of-two ratio to the native width {native} bits")]
    NonIntegerWidthRatio {
        /// Requested port width in bits.
        port: u32,
        /// Native controller width in bits.
        native: u32,
    },

    /// A timing parameter is below the minimum the scheduler can honour.
    #[error("timing parameter {name} = {value} is below the minimum of {minimum} cycles")]
    TimingTooTight {
        /// Parameter name (e.g. `tRP`).
        name: &'static str,
        /// Configured value in cycles.
        value: u32,
        /// Smallest accepted value in cycles.
        minimum: u32,
    },

    /// The refresh sequence does not fit into the refresh interval, so refresh would
    /// occupy the command bus forever.
    #[error("refresh sequence of {sequence} cycles does not fit into a refresh window of {window} cycles")]
    RefreshSaturated {
        /// Cycles needed by one refresh sequence.
        sequence: u32,
        /// Cycles available between refresh requests (`tREFI * postponing`).
        window: u32,
    },

    /// A derived timing (a sum of configured parameters) does not fit in 32 bits.
    #[error("derived timing {0} overflows 32 bits")]
    TimingOverflow(&'static str),

    /// Row/bank/column geometry the controller cannot address.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// PHY settings that cannot be steered (phase indices, rank count).
    #[error("invalid PHY settings: {0}")]
    InvalidPhy(String),

    /// Controller settings outside their supported range.
    #[error("invalid controller settings: {0}")]
    InvalidSettings(String),

    /// The configuration document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}
