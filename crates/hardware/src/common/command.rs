//! DRAM command representation.
//!
//! A [`Command`] is the tagged form used inside the scheduler. The annotation methods
//! (`is_cmd`, `is_read`, `is_write`) classify it for the choosers without re-deriving
//! anything from pin levels; [`CommandPins`] is the SDRAM-style pin encoding used when a
//! command is steered onto a PHY phase.

/// Address bit carrying the auto-precharge flag (column commands) and the
/// all-banks flag (precharge/refresh).
pub const A10: u32 = 1 << 10;

/// A DRAM command issued by a bank machine or the refresher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Command {
    /// No operation.
    #[default]
    Nop,
    /// Open `row` in `bank`.
    Activate {
        /// Global bank index (rank and bank).
        bank: usize,
        /// Row to open.
        row: u32,
    },
    /// Close the open row of `bank`, or of every bank when `all_banks` is set.
    Precharge {
        /// Global bank index; ignored when `all_banks` is set.
        bank: usize,
        /// Precharge every bank of every rank.
        all_banks: bool,
    },
    /// Column read burst.
    Read {
        /// Global bank index.
        bank: usize,
        /// Column address (burst aligned).
        col: u32,
        /// Close the row once the burst completes.
        auto_precharge: bool,
    },
    /// Column write burst.
    Write {
        /// Global bank index.
        bank: usize,
        /// Column address (burst aligned).
        col: u32,
        /// Close the row once the burst completes.
        auto_precharge: bool,
    },
    /// Auto refresh of one bank, or of all banks when `bank` is `None`.
    Refresh {
        /// Target bank for per-bank refresh.
        bank: Option<usize>,
    },
    /// ZQ short calibration.
    ZqCalibration,
}

impl Command {
    /// Returns `true` for row and maintenance commands (ACTIVATE, PRECHARGE, REFRESH, ZQCS).
    pub const fn is_cmd(&self) -> bool {
        matches!(
            self,
            Self::Activate { .. } | Self::Precharge { .. } | Self::Refresh { .. } | Self::ZqCalibration
        )
    }

    /// Returns `true` for a column read.
    pub const fn is_read(&self) -> bool {
        matches!(self, Self::Read { .. })
    }

    /// Returns `true` for a column write.
    pub const fn is_write(&self) -> bool {
        matches!(self, Self::Write { .. })
    }

    /// Returns `true` for a column read or write.
    pub const fn is_column(&self) -> bool {
        self.is_read() || self.is_write()
    }

    /// Returns `true` for ACTIVATE.
    pub const fn is_activate(&self) -> bool {
        matches!(self, Self::Activate { .. })
    }

    /// Returns `true` for a single-bank or all-bank PRECHARGE.
    pub const fn is_precharge(&self) -> bool {
        matches!(self, Self::Precharge { .. })
    }

    /// Returns `true` if the command closes its row after the burst.
    pub const fn auto_precharge(&self) -> bool {
        match self {
            Self::Read { auto_precharge, .. } | Self::Write { auto_precharge, .. } => {
                *auto_precharge
            }
            _ => false,
        }
    }

    /// Returns the bank a command targets.
    ///
    /// # Returns
    ///
    /// `None` for NOP, ZQCS, all-bank precharge, and all-bank refresh.
    pub const fn bank(&self) -> Option<usize> {
        match self {
            Self::Activate { bank, .. }
            | Self::Read { bank, .. }
            | Self::Write { bank, .. }
            | Self::Precharge {
                bank,
                all_banks: false,
            } => Some(*bank),
            Self::Refresh { bank } => *bank,
            _ => None,
        }
    }

    /// Returns `true` if the command must be presented to every rank at once.
    pub const fn selects_all_ranks(&self) -> bool {
        matches!(
            self,
            Self::Precharge {
                all_banks: true,
                ..
            } | Self::Refresh { bank: None }
                | Self::ZqCalibration
        )
    }

    /// Encodes the command onto SDRAM control pins (active high).
    ///
    /// # Returns
    ///
    /// The `ras`/`cas`/`we` levels and the address-bus value. Bank and chip select
    /// are produced by the steerer.
    pub const fn pins(&self) -> CommandPins {
        match *self {
            Self::Nop => CommandPins::new(false, false, false, 0),
            Self::Activate { row, .. } => CommandPins::new(true, false, false, row),
            Self::Precharge { all_banks, .. } => {
                CommandPins::new(true, false, true, if all_banks { A10 } else { 0 })
            }
            Self::Read {
                col,
                auto_precharge,
                ..
            } => CommandPins::new(false, true, false, col | if auto_precharge { A10 } else { 0 }),
            Self::Write {
                col,
                auto_precharge,
                ..
            } => CommandPins::new(false, true, true, col | if auto_precharge { A10 } else { 0 }),
            Self::Refresh { bank } => {
                CommandPins::new(true, true, false, if bank.is_none() { A10 } else { 0 })
            }
            Self::ZqCalibration => CommandPins::new(false, false, true, 0),
        }
    }
}

/// SDRAM control-pin levels of one command (active high; the PHY inverts them).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommandPins {
    /// Row address strobe.
    pub ras: bool,
    /// Column address strobe.
    pub cas: bool,
    /// Write enable.
    pub we: bool,
    /// Address bus value.
    pub address: u32,
}

impl CommandPins {
    const fn new(ras: bool, cas: bool, we: bool, address: u32) -> Self {
        Self {
            ras,
            cas,
            we,
            address,
        }
    }
}
