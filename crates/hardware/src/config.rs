//! Configuration system for the DRAM controller model.
//!
//! This module defines every structure used to parameterize a controller. It provides:
//! 1. **Defaults:** Baseline PHY, geometry, timing, and scheduler constants (a DDR2-class x16 device behind a 2-phase PHY).
//! 2. **Structures:** Hierarchical config for the PHY, the array geometry, the timing set, the scheduler, and the master ports.
//! 3. **Validation:** Elaboration-time checks that reject settings the scheduler could never honour.
//!
//! Configuration is supplied as JSON (`Config::from_json`, `Config::from_file`) or built with
//! `Config::default()`. Timing parameters are expressed in controller clock cycles.

use std::path::Path;

use serde::Deserialize;

use crate::common::error::ConfigError;

/// Default configuration constants for the controller.
///
/// These values define the baseline configuration when not explicitly
/// overridden in a JSON configuration document.
mod defaults {
    /// DRAM data bus width in bits.
    pub const DATABITS: u32 = 16;

    /// PHY phases per controller cycle.
    pub const NPHASES: u32 = 2;

    /// Number of ranks (chip selects).
    pub const NRANKS: u32 = 1;

    /// Phase carrying READ commands.
    pub const RDPHASE: u32 = 0;

    /// Phase carrying WRITE commands.
    pub const WRPHASE: u32 = 1;

    /// Phase carrying row commands while reading.
    pub const RDCMDPHASE: u32 = 1;

    /// Phase carrying row commands while writing.
    pub const WRCMDPHASE: u32 = 0;

    /// CAS latency in DRAM clocks.
    pub const CL: u32 = 3;

    /// CAS write latency in DRAM clocks.
    pub const CWL: u32 = 3;

    /// PHY read latency in controller cycles (READ issue to read data valid).
    pub const READ_LATENCY: u32 = 5;

    /// PHY write latency in controller cycles (WRITE issue to write data sampled).
    pub const WRITE_LATENCY: u32 = 2;

    /// Bank address bits per rank (8 banks).
    pub const BANKBITS: u32 = 3;

    /// Row address bits.
    pub const ROWBITS: u32 = 13;

    /// Column address bits.
    pub const COLBITS: u32 = 10;

    /// Precharge period.
    pub const T_RP: u32 = 2;

    /// ACTIVATE to column command delay.
    pub const T_RCD: u32 = 2;

    /// Write recovery time.
    pub const T_WR: u32 = 2;

    /// Write to read turnaround.
    pub const T_WTR: u32 = 2;

    /// Average refresh interval.
    pub const T_REFI: u32 = 780;

    /// Refresh cycle time.
    pub const T_RFC: u32 = 16;

    /// Column to column delay.
    pub const T_CCD: u32 = 1;

    /// Request buffer depth per bank machine.
    pub const CMD_BUFFER_DEPTH: usize = 8;

    /// Read budget before writes are forced (anti-starvation).
    pub const READ_TIME: u32 = 32;

    /// Write budget before reads are forced (anti-starvation).
    pub const WRITE_TIME: u32 = 16;

    /// Refreshes issued per refresh request.
    pub const REFRESH_POSTPONING: u32 = 1;

    /// log2 of the bandwidth measurement period in cycles.
    pub const BANDWIDTH_PERIOD_BITS: u32 = 24;

    /// Largest supported global bank count (rank and bank).
    pub const MAX_BANKS: usize = 64;

    /// Largest supported refresh postponing factor.
    pub const MAX_POSTPONING: u32 = 8;
}

/// DRAM protocol generation.
///
/// Determines the burst length and therefore the column alignment of every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MemoryType {
    /// Single data rate SDRAM (BL1).
    #[serde(alias = "Sdr")]
    Sdr,
    /// DDR SDRAM (BL4).
    #[serde(alias = "Ddr")]
    Ddr,
    /// Mobile DDR (BL4).
    #[serde(alias = "Lpddr")]
    Lpddr,
    /// DDR2 SDRAM (BL4).
    #[default]
    #[serde(alias = "Ddr2")]
    Ddr2,
    /// DDR3 SDRAM (BL8).
    #[serde(alias = "Ddr3")]
    Ddr3,
    /// DDR4 SDRAM (BL8).
    #[serde(alias = "Ddr4")]
    Ddr4,
    /// LPDDR4 SDRAM (BL16).
    #[serde(alias = "Lpddr4")]
    Lpddr4,
    /// DDR5 SDRAM (BL16).
    #[serde(alias = "Ddr5")]
    Ddr5,
    /// LPDDR5 SDRAM (BL16).
    #[serde(alias = "Lpddr5")]
    Lpddr5,
}

impl MemoryType {
    /// Returns the burst length in beats.
    pub const fn burst_length(self) -> u32 {
        match self {
            Self::Sdr => 1,
            Self::Ddr | Self::Lpddr | Self::Ddr2 => 4,
            Self::Ddr3 | Self::Ddr4 => 8,
            Self::Lpddr4 | Self::Ddr5 | Self::Lpddr5 => 16,
        }
    }

    /// Returns the number of beats per DRAM clock.
    pub const fn data_rate(self) -> u32 {
        match self {
            Self::Sdr => 1,
            _ => 2,
        }
    }
}

/// Mapping of master addresses onto row, bank, and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AddressMapping {
    /// Bank bits directly above the column bits.
    #[default]
    #[serde(alias = "RowBankCol")]
    RowBankCol,
    /// Bank bits in the least significant position. Not implemented.
    #[serde(alias = "RowColBank")]
    RowColBank,
}

/// Root configuration structure.
///
/// # Examples
///
/// Creating a default configuration:
///
/// ```
/// use dramctl_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.nbanks(), 8);
/// assert!(config.validate().is_ok());
/// ```
///
/// Deserializing from JSON; omitted fields take their defaults:
///
/// ```
/// use dramctl_core::config::{Config, MemoryType};
///
/// let json = r#"{
///     "phy": { "memtype": "DDR3", "nphases": 4, "nranks": 2, "rdphase": 2, "wrphase": 3,
///              "rdcmdphase": 0, "wrcmdphase": 1 },
///     "geom": { "bankbits": 3, "rowbits": 14, "colbits": 10 },
///     "timing": { "t_rp": 3, "t_rcd": 3, "t_faw": 8, "t_rrd": 2 },
///     "controller": { "with_auto_precharge": false }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.phy.memtype, MemoryType::Ddr3);
/// assert_eq!(config.nbanks(), 16);
/// assert_eq!(config.address_align(), 3);
/// assert!(!config.controller.with_auto_precharge);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// PHY capabilities and latencies
    #[serde(default)]
    pub phy: PhyConfig,
    /// DRAM array geometry
    #[serde(default)]
    pub geom: GeometryConfig,
    /// DRAM timing parameters
    #[serde(default)]
    pub timing: TimingConfig,
    /// Scheduler settings
    #[serde(default)]
    pub controller: ControllerSettings,
    /// Master ports attached to the crossbar
    #[serde(default = "Config::default_ports")]
    pub ports: Vec<PortConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            phy: PhyConfig::default(),
            geom: GeometryConfig::default(),
            timing: TimingConfig::default(),
            controller: ControllerSettings::default(),
            ports: Self::default_ports(),
        }
    }
}

impl Config {
    /// One native-width port in the system clock domain.
    fn default_ports() -> Vec<PortConfig> {
        vec![PortConfig::default()]
    }

    /// Parses and validates a JSON configuration document.
    ///
    /// # Arguments
    ///
    /// * `json` - Configuration document; missing sections and fields take defaults.
    ///
    /// # Returns
    ///
    /// The validated configuration, or the first parse or validation error.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Returns log2 of the burst length (zeroed column bits of every access).
    pub const fn address_align(&self) -> u32 {
        self.phy.memtype.burst_length().trailing_zeros()
    }

    /// Returns the number of rank-select bits.
    pub const fn rank_bits(&self) -> u32 {
        self.phy.nranks.trailing_zeros()
    }

    /// Returns the width of the global bank index (rank and bank).
    pub const fn bank_index_bits(&self) -> u32 {
        self.geom.bankbits.saturating_add(self.rank_bits())
    }

    /// Returns the number of bank machines (banks across all ranks).
    pub const fn nbanks(&self) -> usize {
        match 1usize.checked_shl(self.bank_index_bits()) {
            Some(n) => n,
            None => usize::MAX,
        }
    }

    /// Returns the width of the column word index (column bits above the burst alignment).
    pub const fn column_word_bits(&self) -> u32 {
        self.geom.colbits.saturating_sub(self.address_align())
    }

    /// Returns the width of a master address in controller words.
    pub const fn address_width(&self) -> u32 {
        self.geom
            .rowbits
            .saturating_add(self.column_word_bits())
            .saturating_add(self.bank_index_bits())
    }

    /// Returns the native data width in bits (one controller word).
    pub const fn native_data_width(&self) -> u32 {
        self.phy
            .databits
            .saturating_mul(self.phy.memtype.data_rate())
            .saturating_mul(self.phy.nphases)
    }

    /// Returns the CAS write latency in controller cycles.
    pub const fn cwl_cycles(&self) -> u32 {
        self.phy.cwl.div_ceil(self.phy.nphases)
    }

    /// Returns the write-to-precharge spacing (`cwl + tWR + tCCD`), saturating at `u32::MAX`.
    pub fn write_to_precharge(&self) -> u32 {
        self.write_recovery(self.timing.t_wr).unwrap_or(u32::MAX)
    }

    /// Returns the write-to-read turnaround (`tWTR + cwl + tCCD`), saturating at `u32::MAX`.
    pub fn write_to_read(&self) -> u32 {
        self.write_recovery(self.timing.t_wtr).unwrap_or(u32::MAX)
    }

    fn write_recovery(&self, t: u32) -> Option<u32> {
        t.checked_add(self.cwl_cycles())?
            .checked_add(self.timing.t_ccd.unwrap_or(0))
    }

    /// Returns the read-to-write turnaround (`tRTW`, or the PHY read latency when unset).
    pub fn read_to_write(&self) -> u32 {
        self.timing.t_rtw.unwrap_or(self.phy.read_latency)
    }

    /// Returns the cycles one refresh sequence occupies the command bus, saturating at
    /// `u32::MAX`.
    pub fn refresh_sequence_cycles(&self) -> u32 {
        let postponing = self.controller.refresh_postponing;
        let zq = if self.controller.zqcs_interval.is_some() {
            self.timing.t_zqcs.unwrap_or(0)
        } else {
            0
        };
        1u32.saturating_add(self.timing.t_rp)
            .saturating_add(postponing.saturating_mul(self.timing.t_rfc))
            .saturating_add(zq)
    }

    /// Checks every configuration-time constraint.
    ///
    /// # Returns
    ///
    /// `Ok(())` if a controller can be elaborated, otherwise the first violated rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.phy.validate()?;
        self.validate_geometry()?;
        self.timing.validate()?;
        self.validate_settings()?;
        for port in &self.ports {
            port.validate(self.native_data_width())?;
        }
        Ok(())
    }

    fn validate_geometry(&self) -> Result<(), ConfigError> {
        let geom = &self.geom;
        let align = self.address_align();
        if geom.rowbits == 0 || geom.rowbits > 32 {
            return Err(ConfigError::InvalidGeometry(format!(
                "rowbits must be in 1..=32, got {}",
                geom.rowbits
            )));
        }
        if geom.colbits <= align || geom.colbits > 32 {
            return Err(ConfigError::InvalidGeometry(format!(
                "colbits must exceed the burst alignment ({align}) and be at most 32, got {}",
                geom.colbits
            )));
        }
        if self.nbanks() > defaults::MAX_BANKS {
            return Err(ConfigError::InvalidGeometry(format!(
                "{} banks exceed the supported maximum of {}",
                self.nbanks(),
                defaults::MAX_BANKS
            )));
        }
        if self.address_width() > 63 {
            return Err(ConfigError::InvalidGeometry(format!(
                "address width of {} bits does not fit a 64-bit address",
                self.address_width()
            )));
        }
        Ok(())
    }

    fn validate_settings(&self) -> Result<(), ConfigError> {
        let settings = &self.controller;
        if settings.address_mapping != AddressMapping::RowBankCol {
            return Err(ConfigError::UnsupportedAddressMapping(
                settings.address_mapping,
            ));
        }
        if !(1..=defaults::MAX_POSTPONING).contains(&settings.refresh_postponing) {
            return Err(ConfigError::InvalidSettings(format!(
                "refresh_postponing must be in 1..={}, got {}",
                defaults::MAX_POSTPONING,
                settings.refresh_postponing
            )));
        }
        if settings.zqcs_interval == Some(0) {
            return Err(ConfigError::InvalidSettings(
                "zqcs_interval must be at least one refresh round".to_string(),
            ));
        }
        if settings.bandwidth_period_bits == 0 || settings.bandwidth_period_bits > 63 {
            return Err(ConfigError::InvalidSettings(format!(
                "bandwidth_period_bits must be in 1..=63, got {}",
                settings.bandwidth_period_bits
            )));
        }
        if self.write_recovery(self.timing.t_wr).is_none() {
            return Err(ConfigError::TimingOverflow("write-to-precharge"));
        }
        if self.write_recovery(self.timing.t_wtr).is_none() {
            return Err(ConfigError::TimingOverflow("write-to-read"));
        }
        if settings.with_refresh {
            let sequence = self.refresh_sequence_cycles();
            let window = self.timing.t_refi.saturating_mul(settings.refresh_postponing);
            if sequence >= window {
                return Err(ConfigError::RefreshSaturated { sequence, window });
            }
        }
        Ok(())
    }
}

/// PHY capabilities as published to the controller.
#[derive(Debug, Clone, Deserialize)]
pub struct PhyConfig {
    /// DRAM protocol generation
    #[serde(default)]
    pub memtype: MemoryType,

    /// DRAM data bus width in bits
    #[serde(default = "PhyConfig::default_databits")]
    pub databits: u32,

    /// Command phases per controller cycle
    #[serde(default = "PhyConfig::default_nphases")]
    pub nphases: u32,

    /// Number of ranks (power of two)
    #[serde(default = "PhyConfig::default_nranks")]
    pub nranks: u32,

    /// Phase carrying READ commands
    #[serde(default = "PhyConfig::default_rdphase")]
    pub rdphase: u32,

    /// Phase carrying WRITE commands
    #[serde(default = "PhyConfig::default_wrphase")]
    pub wrphase: u32,

    /// Phase carrying row commands in the read direction
    #[serde(default = "PhyConfig::default_rdcmdphase")]
    pub rdcmdphase: u32,

    /// Phase carrying row commands in the write direction
    #[serde(default = "PhyConfig::default_wrcmdphase")]
    pub wrcmdphase: u32,

    /// CAS latency in DRAM clocks
    #[serde(default = "PhyConfig::default_cl")]
    pub cl: u32,

    /// CAS write latency in DRAM clocks
    #[serde(default = "PhyConfig::default_cwl")]
    pub cwl: u32,

    /// Read command to read data valid, in controller cycles
    #[serde(default = "PhyConfig::default_read_latency")]
    pub read_latency: u32,

    /// Write command to write data sampled, in controller cycles
    #[serde(default = "PhyConfig::default_write_latency")]
    pub write_latency: u32,
}

impl PhyConfig {
    fn default_databits() -> u32 {
        defaults::DATABITS
    }

    fn default_nphases() -> u32 {
        defaults::NPHASES
    }

    fn default_nranks() -> u32 {
        defaults::NRANKS
    }

    fn default_rdphase() -> u32 {
        defaults::RDPHASE
    }

    fn default_wrphase() -> u32 {
        defaults::WRPHASE
    }

    fn default_rdcmdphase() -> u32 {
        defaults::RDCMDPHASE
    }

    fn default_wrcmdphase() -> u32 {
        defaults::WRCMDPHASE
    }

    fn default_cl() -> u32 {
        defaults::CL
    }

    fn default_cwl() -> u32 {
        defaults::CWL
    }

    fn default_read_latency() -> u32 {
        defaults::READ_LATENCY
    }

    fn default_write_latency() -> u32 {
        defaults::WRITE_LATENCY
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.nphases == 0 {
            return Err(ConfigError::InvalidPhy("nphases must be at least 1".to_string()));
        }
        let phases = [
            ("rdphase", self.rdphase),
            ("wrphase", self.wrphase),
            ("rdcmdphase", self.rdcmdphase),
            ("wrcmdphase", self.wrcmdphase),
        ];
        if let Some((name, phase)) = phases.iter().find(|(_, p)| *p >= self.nphases) {
            return Err(ConfigError::InvalidPhy(format!(
                "{name} = {phase} is not a phase of a {}-phase PHY",
                self.nphases
            )));
        }
        if self.nphases > 1 && (self.rdphase == self.rdcmdphase || self.wrphase == self.wrcmdphase)
        {
            return Err(ConfigError::InvalidPhy(format!(
                "column and row commands need distinct phases, got rd {}/{} and wr {}/{}",
                self.rdphase, self.rdcmdphase, self.wrphase, self.wrcmdphase
            )));
        }
        if !self.nranks.is_power_of_two() || self.nranks > 32 {
            return Err(ConfigError::InvalidPhy(format!(
                "nranks must be a power of two up to 32, got {}",
                self.nranks
            )));
        }
        if self.databits == 0 {
            return Err(ConfigError::InvalidPhy("databits must be non-zero".to_string()));
        }
        Ok(())
    }
}

impl Default for PhyConfig {
    fn default() -> Self {
        Self {
            memtype: MemoryType::default(),
            databits: defaults::DATABITS,
            nphases: defaults::NPHASES,
            nranks: defaults::NRANKS,
            rdphase: defaults::RDPHASE,
            wrphase: defaults::WRPHASE,
            rdcmdphase: defaults::RDCMDPHASE,
            wrcmdphase: defaults::WRCMDPHASE,
            cl: defaults::CL,
            cwl: defaults::CWL,
            read_latency: defaults::READ_LATENCY,
            write_latency: defaults::WRITE_LATENCY,
        }
    }
}

/// DRAM array geometry.
#[derive(Debug, Clone, Deserialize)]
pub struct GeometryConfig {
    /// Bank address bits per rank
    #[serde(default = "GeometryConfig::default_bankbits")]
    pub bankbits: u32,

    /// Row address bits
    #[serde(default = "GeometryConfig::default_rowbits")]
    pub rowbits: u32,

    /// Column address bits
    #[serde(default = "GeometryConfig::default_colbits")]
    pub colbits: u32,
}

impl GeometryConfig {
    fn default_bankbits() -> u32 {
        defaults::BANKBITS
    }

    fn default_rowbits() -> u32 {
        defaults::ROWBITS
    }

    fn default_colbits() -> u32 {
        defaults::COLBITS
    }
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            bankbits: defaults::BANKBITS,
            rowbits: defaults::ROWBITS,
            colbits: defaults::COLBITS,
        }
    }
}

/// DRAM timing parameters in controller cycles.
///
/// Optional parameters left as `None` disable their controller, which then
/// never delays a command.
#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    /// Precharge period (PRECHARGE to ACTIVATE, same bank)
    #[serde(default = "TimingConfig::default_t_rp")]
    pub t_rp: u32,

    /// ACTIVATE to READ/WRITE, same bank
    #[serde(default = "TimingConfig::default_t_rcd")]
    pub t_rcd: u32,

    /// Write recovery time
    #[serde(default = "TimingConfig::default_t_wr")]
    pub t_wr: u32,

    /// Internal write to read delay
    #[serde(default = "TimingConfig::default_t_wtr")]
    pub t_wtr: u32,

    /// Average refresh interval
    #[serde(default = "TimingConfig::default_t_refi")]
    pub t_refi: u32,

    /// Refresh cycle time
    #[serde(default = "TimingConfig::default_t_rfc")]
    pub t_rfc: u32,

    /// Four-activate window (any bank)
    #[serde(default)]
    pub t_faw: Option<u32>,

    /// Column to column delay
    #[serde(default = "TimingConfig::default_t_ccd")]
    pub t_ccd: Option<u32>,

    /// ACTIVATE to ACTIVATE, different banks
    #[serde(default)]
    pub t_rrd: Option<u32>,

    /// ACTIVATE to ACTIVATE, same bank
    #[serde(default)]
    pub t_rc: Option<u32>,

    /// ACTIVATE to PRECHARGE, same bank
    #[serde(default)]
    pub t_ras: Option<u32>,

    /// ZQ short calibration time
    #[serde(default)]
    pub t_zqcs: Option<u32>,

    /// Read to write turnaround; the PHY read latency when unset
    #[serde(default)]
    pub t_rtw: Option<u32>,
}

impl TimingConfig {
    fn default_t_rp() -> u32 {
        defaults::T_RP
    }

    fn default_t_rcd() -> u32 {
        defaults::T_RCD
    }

    fn default_t_wr() -> u32 {
        defaults::T_WR
    }

    fn default_t_wtr() -> u32 {
        defaults::T_WTR
    }

    fn default_t_refi() -> u32 {
        defaults::T_REFI
    }

    fn default_t_rfc() -> u32 {
        defaults::T_RFC
    }

    #[allow(clippy::unnecessary_wraps)]
    fn default_t_ccd() -> Option<u32> {
        Some(defaults::T_CCD)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let minimums = [
            ("tRP", self.t_rp, 1),
            ("tRCD", self.t_rcd, 1),
            ("tRFC", self.t_rfc, 1),
            ("tREFI", self.t_refi, 1),
        ];
        for (name, value, minimum) in minimums {
            if value < minimum {
                return Err(ConfigError::TimingTooTight {
                    name,
                    value,
                    minimum,
                });
            }
        }
        if let (Some(t_rc), Some(t_ras)) = (self.t_rc, self.t_ras) {
            if t_rc < t_ras {
                return Err(ConfigError::TimingTooTight {
                    name: "tRC",
                    value: t_rc,
                    minimum: t_ras,
                });
            }
        }
        Ok(())
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            t_rp: defaults::T_RP,
            t_rcd: defaults::T_RCD,
            t_wr: defaults::T_WR,
            t_wtr: defaults::T_WTR,
            t_refi: defaults::T_REFI,
            t_rfc: defaults::T_RFC,
            t_faw: None,
            t_ccd: Some(defaults::T_CCD),
            t_rrd: None,
            t_rc: None,
            t_ras: None,
            t_zqcs: None,
            t_rtw: None,
        }
    }
}

/// Scheduler settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ControllerSettings {
    /// Request buffer depth per bank machine (0 behaves as 1)
    #[serde(default = "ControllerSettings::default_cmd_buffer_depth")]
    pub cmd_buffer_depth: usize,

    /// Cycles the multiplexer may keep reading while writes are pending
    #[serde(default = "ControllerSettings::default_read_time")]
    pub read_time: u32,

    /// Cycles the multiplexer may keep writing while reads are pending
    #[serde(default = "ControllerSettings::default_write_time")]
    pub write_time: u32,

    /// Issue periodic refreshes
    #[serde(default = "ControllerSettings::default_true")]
    pub with_refresh: bool,

    /// Close rows with auto-precharge when the next request misses
    #[serde(default = "ControllerSettings::default_true")]
    pub with_auto_precharge: bool,

    /// Maintain the bandwidth counter
    #[serde(default)]
    pub with_bandwidth: bool,

    /// Address mapping (only `ROW_BANK_COL` is implemented)
    #[serde(default)]
    pub address_mapping: AddressMapping,

    /// Refreshes batched per refresh request (1..=8)
    #[serde(default = "ControllerSettings::default_refresh_postponing")]
    pub refresh_postponing: u32,

    /// Issue ZQ short calibration every N refresh rounds
    #[serde(default)]
    pub zqcs_interval: Option<u32>,

    /// log2 of the bandwidth measurement period in cycles
    #[serde(default = "ControllerSettings::default_bandwidth_period_bits")]
    pub bandwidth_period_bits: u32,
}

impl ControllerSettings {
    fn default_cmd_buffer_depth() -> usize {
        defaults::CMD_BUFFER_DEPTH
    }

    fn default_read_time() -> u32 {
        defaults::READ_TIME
    }

    fn default_write_time() -> u32 {
        defaults::WRITE_TIME
    }

    fn default_true() -> bool {
        true
    }

    fn default_refresh_postponing() -> u32 {
        defaults::REFRESH_POSTPONING
    }

    fn default_bandwidth_period_bits() -> u32 {
        defaults::BANDWIDTH_PERIOD_BITS
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            cmd_buffer_depth: defaults::CMD_BUFFER_DEPTH,
            read_time: defaults::READ_TIME,
            write_time: defaults::WRITE_TIME,
            with_refresh: true,
            with_auto_precharge: true,
            with_bandwidth: false,
            address_mapping: AddressMapping::default(),
            refresh_postponing: defaults::REFRESH_POSTPONING,
            zqcs_interval: None,
            bandwidth_period_bits: defaults::BANDWIDTH_PERIOD_BITS,
        }
    }
}

/// A master port attached to the crossbar.
///
/// Width and clock-domain conversion are performed outside the controller; the
/// crossbar only checks that a conversion exists.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PortConfig {
    /// Port data width in bits; the native width when unset
    #[serde(default)]
    pub data_width: Option<u32>,

    /// Clock domain the master runs in
    #[serde(default = "PortConfig::default_clock_domain")]
    pub clock_domain: String,
}

impl PortConfig {
    fn default_clock_domain() -> String {
        "sys".to_string()
    }

    /// Creates a native-width port in the system clock domain.
    pub fn native() -> Self {
        Self::default()
    }

    /// Creates a port of `data_width` bits in the system clock domain.
    pub fn with_width(data_width: u32) -> Self {
        Self {
            data_width: Some(data_width),
            ..Self::default()
        }
    }

    /// Checks that the port width converts to `native` bits by a power-of-two ratio.
    ///
    /// # Returns
    ///
    /// The effective port width in bits.
    pub fn validate(&self, native: u32) -> Result<u32, ConfigError> {
        let port = self.data_width.unwrap_or(native);
        let (wide, narrow) = if port >= native {
            (port, native)
        } else {
            (native, port)
        };
        if narrow == 0 || wide % narrow != 0 || !(wide / narrow).is_power_of_two() {
            return Err(ConfigError::NonIntegerWidthRatio { port, native });
        }
        Ok(port)
    }

    /// Returns `true` if the port runs outside the controller clock domain.
    pub fn is_async(&self) -> bool {
        self.clock_domain != "sys"
    }
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            data_width: None,
            clock_domain: Self::default_clock_domain(),
        }
    }
}
