//! Controller statistics collection and reporting.
//!
//! This module tracks what the scheduler put on the command bus. It provides:
//! 1. **Cycles:** Total cycles, cycles owned by the refresher, and direction switches.
//! 2. **Command mix:** Counts by command type, including auto-precharged accesses.
//! 3. **Derived metrics:** Data-bus utilisation and row-buffer hit rate.
//! 4. **Requests:** Requests accepted from and completed towards the master ports.

use std::fmt;

use crate::common::command::Command;

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"commands"`, `"requests"`.
/// Pass an empty slice to `format_sections` to format all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "commands", "requests"];

/// Scheduler statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControllerStats {
    /// Controller cycles elapsed.
    pub cycles: u64,
    /// Cycles the command bus was owned by the refresher.
    pub refresh_cycles: u64,
    /// Read/write direction switches of the multiplexer.
    pub direction_switches: u64,

    /// ACTIVATE commands issued.
    pub activates: u64,
    /// Single-bank PRECHARGE commands issued.
    pub precharges: u64,
    /// PRECHARGE ALL commands issued.
    pub precharge_alls: u64,
    /// READ commands issued.
    pub reads: u64,
    /// WRITE commands issued.
    pub writes: u64,
    /// READ/WRITE commands carrying auto-precharge.
    pub auto_precharges: u64,
    /// REFRESH commands issued.
    pub refreshes: u64,
    /// ZQ calibration commands issued.
    pub zq_calibrations: u64,

    /// Requests accepted by the bank machines.
    pub requests_accepted: u64,
    /// Write requests whose data was taken.
    pub writes_completed: u64,
    /// Read requests whose data was returned.
    pub reads_completed: u64,
}

impl ControllerStats {
    /// Counts one issued command.
    pub const fn record(&mut self, command: &Command) {
        match command {
            Command::Nop => {}
            Command::Activate { .. } => self.activates += 1,
            Command::Precharge { all_banks, .. } => {
                if *all_banks {
                    self.precharge_alls += 1;
                } else {
                    self.precharges += 1;
                }
            }
            Command::Read { auto_precharge, .. } => {
                self.reads += 1;
                if *auto_precharge {
                    self.auto_precharges += 1;
                }
            }
            Command::Write { auto_precharge, .. } => {
                self.writes += 1;
                if *auto_precharge {
                    self.auto_precharges += 1;
                }
            }
            Command::Refresh { .. } => self.refreshes += 1,
            Command::ZqCalibration => self.zq_calibrations += 1,
        }
    }

    /// Returns the fraction of cycles that carried a column command.
    pub fn bus_utilization(&self) -> f64 {
        if self.cycles == 0 {
            return 0.0;
        }
        (self.reads + self.writes) as f64 / self.cycles as f64
    }

    /// Returns the fraction of column commands that did not need an ACTIVATE.
    pub fn row_hit_rate(&self) -> f64 {
        let accesses = self.reads + self.writes;
        if accesses == 0 {
            return 0.0;
        }
        accesses.saturating_sub(self.activates) as f64 / accesses as f64
    }

    /// Formats only the requested statistics sections.
    ///
    /// # Arguments
    ///
    /// * `sections` - Section names from [`STATS_SECTIONS`], or empty for all.
    pub fn format_sections(&self, sections: &[String]) -> String {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let cyc = self.cycles.max(1) as f64;
        let mut out = String::new();
        let line = "==========================================================\n";
        let rule = "----------------------------------------------------------\n";

        out.push_str(line);
        out.push_str("DRAM CONTROLLER STATISTICS\n");
        out.push_str(line);
        if want("summary") {
            out.push_str(&format!("sim_cycles               {}\n", self.cycles));
            out.push_str(&format!(
                "bus_utilization          {:.2}%\n",
                self.bus_utilization() * 100.0
            ));
            out.push_str(&format!(
                "row_hit_rate             {:.2}%\n",
                self.row_hit_rate() * 100.0
            ));
            out.push_str(&format!(
                "refresh_cycles           {} ({:.2}%)\n",
                self.refresh_cycles,
                self.refresh_cycles as f64 / cyc * 100.0
            ));
            out.push_str(&format!(
                "direction_switches       {}\n",
                self.direction_switches
            ));
            out.push_str(rule);
        }
        if want("commands") {
            out.push_str("COMMAND MIX\n");
            let counts = [
                ("cmd.activate", self.activates),
                ("cmd.precharge", self.precharges),
                ("cmd.precharge_all", self.precharge_alls),
                ("cmd.read", self.reads),
                ("cmd.write", self.writes),
                ("cmd.auto_precharge", self.auto_precharges),
                ("cmd.refresh", self.refreshes),
                ("cmd.zqcs", self.zq_calibrations),
            ];
            for (name, count) in counts {
                out.push_str(&format!("  {name:<22} {count}\n"));
            }
            out.push_str(rule);
        }
        if want("requests") {
            out.push_str("REQUESTS\n");
            out.push_str(&format!(
                "  req.accepted           {}\n",
                self.requests_accepted
            ));
            out.push_str(&format!(
                "  req.reads_completed    {}\n",
                self.reads_completed
            ));
            out.push_str(&format!(
                "  req.writes_completed   {}\n",
                self.writes_completed
            ));
        }
        out.push_str(line);
        out
    }
}

impl fmt::Display for ControllerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_sections(&[]))
    }
}
