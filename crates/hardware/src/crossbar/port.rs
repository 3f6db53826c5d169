//! Master ports.
//!
//! Each master sees its own command channel plus delayed data strobes. Width and
//! clock-domain conversion happen outside the crossbar; a port only records its
//! validated width and domain.

use crate::common::error::ConfigError;
use crate::config::PortConfig;

/// A validated master port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    /// Port index (master number).
    pub index: usize,
    /// Data width in bits.
    pub data_width: u32,
    /// Clock domain name.
    pub clock_domain: String,
    /// Native width divided by port width, or its inverse when the port is wider.
    pub ratio: u32,
    /// The port is wider than the native width (down-conversion).
    pub wider: bool,
}

impl Port {
    /// Validates a port configuration against the native data width.
    pub fn new(index: usize, config: &PortConfig, native: u32) -> Result<Self, ConfigError> {
        let data_width = config.validate(native)?;
        let wider = data_width > native;
        let ratio = if wider {
            data_width / native
        } else {
            native / data_width
        };
        Ok(Self {
            index,
            data_width,
            clock_domain: config.clock_domain.clone(),
            ratio,
            wider,
        })
    }

    /// Returns `true` if the port needs a width converter.
    pub const fn needs_conversion(&self) -> bool {
        self.ratio != 1
    }

    /// Returns `true` if the port needs a clock-domain crossing.
    pub fn is_async(&self) -> bool {
        self.clock_domain != "sys"
    }
}

/// Per-master handshake state for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PortStatus {
    /// The offered command was accepted.
    pub cmd_ready: bool,
    /// Write data for an earlier WRITE is taken this cycle.
    pub wdata_ready: bool,
    /// Read data for an earlier READ is valid this cycle.
    pub rdata_valid: bool,
}
