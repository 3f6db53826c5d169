//! DFI command phase.
//!
//! The PHY-facing command interface: one [`DfiPhase`] per PHY phase per controller cycle,
//! carrying active-low control pins, bank/address buses, and the data-enable strobes that
//! tell the PHY when write data must be driven or read data captured.

use super::command::{A10, Command};

/// Control, address, and data-enable signals of one PHY phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DfiPhase {
    /// Chip selects, one bit per rank, active low.
    pub cs_n: u32,
    /// Bank address within the selected rank.
    pub bank: u32,
    /// Address bus.
    pub address: u32,
    /// Row address strobe, active low.
    pub ras_n: bool,
    /// Column address strobe, active low.
    pub cas_n: bool,
    /// Write enable, active low.
    pub we_n: bool,
    /// Read data enable for this phase.
    pub rddata_en: bool,
    /// Write data enable for this phase.
    pub wrdata_en: bool,
}

impl DfiPhase {
    /// Returns a phase carrying no command, with every rank selected.
    pub const fn nop() -> Self {
        Self {
            cs_n: 0,
            bank: 0,
            address: 0,
            ras_n: true,
            cas_n: true,
            we_n: true,
            rddata_en: false,
            wrdata_en: false,
        }
    }

    /// Drives `command` onto a phase.
    ///
    /// # Arguments
    ///
    /// * `command` - Command to encode.
    /// * `bankbits` - Bank address bits per rank; the global bank index carries the rank above them.
    /// * `nranks` - Number of ranks (chip selects).
    ///
    /// # Returns
    ///
    /// The encoded phase; all-rank commands pull every chip select low.
    pub fn drive(command: &Command, bankbits: u32, nranks: u32) -> Self {
        let pins = command.pins();
        let index = command.bank().unwrap_or(0);
        let rank = (index >> bankbits) as u32;
        let rank_mask = if nranks >= 32 {
            u32::MAX
        } else {
            (1u32 << nranks) - 1
        };
        let cs_n = if command.selects_all_ranks() || nranks <= 1 {
            0
        } else {
            rank_mask & !(1 << rank)
        };
        Self {
            cs_n,
            bank: (index & ((1usize << bankbits) - 1)) as u32,
            address: pins.address,
            ras_n: !pins.ras,
            cas_n: !pins.cas,
            we_n: !pins.we,
            rddata_en: command.is_read(),
            wrdata_en: command.is_write(),
        }
    }

    /// Returns `true` if the phase carries no command.
    pub const fn is_nop(&self) -> bool {
        self.ras_n && self.cas_n && self.we_n
    }

    /// Recovers the command carried by this phase.
    ///
    /// # Arguments
    ///
    /// * `bankbits` - Bank address bits per rank, as used when driving.
    ///
    /// # Returns
    ///
    /// The decoded command; all-rank forms decode with bank 0.
    pub fn decode(&self, bankbits: u32) -> Command {
        let rank = if self.cs_n == 0 {
            0
        } else {
            (!self.cs_n).trailing_zeros() as usize
        };
        let bank = (rank << bankbits) | self.bank as usize;
        let a10 = self.address & A10 != 0;
        match (!self.cas_n, !self.ras_n, !self.we_n) {
            (false, true, false) => Command::Activate {
                bank,
                row: self.address,
            },
            (false, true, true) => Command::Precharge {
                bank: if a10 { 0 } else { bank },
                all_banks: a10,
            },
            (true, false, false) => Command::Read {
                bank,
                col: self.address & !A10,
                auto_precharge: a10,
            },
            (true, false, true) => Command::Write {
                bank,
                col: self.address & !A10,
                auto_precharge: a10,
            },
            (true, true, false) => Command::Refresh {
                bank: if a10 { None } else { Some(bank) },
            },
            (false, false, true) => Command::ZqCalibration,
            _ => Command::Nop,
        }
    }
}

impl Default for DfiPhase {
    fn default() -> Self {
        Self::nop()
    }
}
