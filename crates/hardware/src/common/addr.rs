//! Address decomposition.
//!
//! Master addresses are expressed in controller words and laid out row-bank-column
//! (`ROW_BANK_COL`): the bank field sits directly above the word-aligned column bits.
//! This module provides:
//! 1. **`BankDecoder`:** Extracts the bank field and the bank-local row/column address (crossbar side).
//! 2. **`AddressSlicer`:** Splits a bank-local address into row and burst-aligned column (bank-machine side).
//! 3. **`AddressMap`:** Both of the above for one configuration, plus the inverse used by traffic generators.

use crate::config::Config;

/// A request submitted by a master port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Request {
    /// Address in controller words.
    pub address: u64,
    /// `true` for a write, `false` for a read.
    pub is_write: bool,
}

impl Request {
    /// Creates a read request.
    pub const fn read(address: u64) -> Self {
        Self {
            address,
            is_write: false,
        }
    }

    /// Creates a write request.
    pub const fn write(address: u64) -> Self {
        Self {
            address,
            is_write: true,
        }
    }
}

/// Fully decoded DRAM location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DramAddress {
    /// Global bank index (rank in the upper bits).
    pub bank: usize,
    /// Row within the bank.
    pub row: u32,
    /// Burst-aligned column.
    pub col: u32,
}

/// Splits bank-local addresses into row and column.
///
/// The column occupies the low bits, without the burst-alignment bits which are
/// re-inserted as zeros; the row occupies the bits above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressSlicer {
    split: u32,
    address_align: u32,
    row_mask: u64,
}

impl AddressSlicer {
    /// Creates a slicer.
    ///
    /// # Arguments
    ///
    /// * `rowbits` - Row address width.
    /// * `colbits` - Column address width, including burst-alignment bits.
    /// * `address_align` - log2 of the burst length.
    pub const fn new(rowbits: u32, colbits: u32, address_align: u32) -> Self {
        Self {
            split: colbits.saturating_sub(address_align),
            address_align,
            row_mask: (1u64 << rowbits) - 1,
        }
    }

    /// Returns the row of a bank-local address.
    pub const fn row(&self, address: u64) -> u32 {
        ((address >> self.split) & self.row_mask) as u32
    }

    /// Returns the burst-aligned column of a bank-local address.
    pub const fn col(&self, address: u64) -> u32 {
        ((address & ((1u64 << self.split) - 1)) << self.address_align) as u32
    }

    /// Builds a bank-local address from a row and a burst-aligned column.
    pub const fn address(&self, row: u32, col: u32) -> u64 {
        ((row as u64 & self.row_mask) << self.split)
            | ((col as u64 >> self.address_align) & ((1u64 << self.split) - 1))
    }
}

/// Extracts the bank field of a `ROW_BANK_COL` master address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankDecoder {
    bank_bits: u32,
    shift: u32,
}

impl BankDecoder {
    /// Creates a decoder.
    ///
    /// # Arguments
    ///
    /// * `bank_bits` - Width of the global bank index (bank and rank bits).
    /// * `shift` - Bit position of the bank field (column word bits below it).
    pub const fn new(bank_bits: u32, shift: u32) -> Self {
        Self { bank_bits, shift }
    }

    /// Returns the global bank index of a master address.
    pub const fn bank(&self, address: u64) -> usize {
        ((address >> self.shift) & ((1u64 << self.bank_bits) - 1)) as usize
    }

    /// Returns the bank-local address with the bank field removed.
    pub const fn row_column(&self, address: u64) -> u64 {
        let low = address & ((1u64 << self.shift) - 1);
        let high = address >> (self.shift + self.bank_bits);
        (high << self.shift) | low
    }

    /// Inserts a bank index into a bank-local address.
    pub const fn compose(&self, bank: usize, row_column: u64) -> u64 {
        let low = row_column & ((1u64 << self.shift) - 1);
        let high = row_column >> self.shift;
        (high << (self.shift + self.bank_bits)) | ((bank as u64) << self.shift) | low
    }
}

/// Complete address map of one configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressMap {
    /// Bank field extraction (crossbar side).
    pub decoder: BankDecoder,
    /// Row/column split (bank-machine side).
    pub slicer: AddressSlicer,
}

impl AddressMap {
    /// Builds the `ROW_BANK_COL` map for a configuration.
    pub fn new(config: &Config) -> Self {
        let align = config.address_align();
        let geom = &config.geom;
        Self {
            decoder: BankDecoder::new(config.bank_index_bits(), config.column_word_bits()),
            slicer: AddressSlicer::new(geom.rowbits, geom.colbits, align),
        }
    }

    /// Decodes a master address.
    pub const fn decode(&self, address: u64) -> DramAddress {
        let local = self.decoder.row_column(address);
        DramAddress {
            bank: self.decoder.bank(address),
            row: self.slicer.row(local),
            col: self.slicer.col(local),
        }
    }

    /// Encodes a DRAM location as a master address.
    pub const fn encode(&self, bank: usize, row: u32, col: u32) -> u64 {
        self.decoder.compose(bank, self.slicer.address(row, col))
    }
}
