//! DRAM controller traffic driver.
//!
//! This binary drives the controller model with synthetic master traffic. It performs:
//! 1. **Run:** Offer a traffic pattern on every master port for a number of cycles and print statistics.
//! 2. **Check:** Validate a configuration file and print the parameters derived from it.

use clap::{Parser, Subcommand, ValueEnum};
use std::process;

use dramctl_core::System;
use dramctl_core::common::{AddressMap, Request};
use dramctl_core::config::{Config, PortConfig};
use dramctl_core::stats::ControllerStats;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "dramctl",
    author,
    version,
    about = "Cycle-accurate DRAM controller scheduler model",
    long_about = "Drive the controller model with synthetic traffic and report what it scheduled.\n\nConfiguration is a JSON document; missing fields take DDR2 defaults.\n\nExamples:\n  dramctl run --pattern random --ports 4 --cycles 100000\n  dramctl run --config ddr3.json --pattern row-conflict --stats summary\n  dramctl check ddr3.json"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Offer synthetic traffic and print statistics.
    Run {
        /// Configuration file (JSON). Defaults are used when omitted.
        #[arg(short, long)]
        config: Option<String>,

        /// Traffic pattern offered by every master.
        #[arg(short, long, value_enum, default_value_t = Pattern::Random)]
        pattern: Pattern,

        /// Number of native-width master ports (overrides the configuration).
        #[arg(long)]
        ports: Option<usize>,

        /// Cycles to simulate.
        #[arg(long, default_value_t = 100_000)]
        cycles: u64,

        /// Percentage of requests that are writes.
        #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u8).range(0..=100))]
        writes: u8,

        /// Seed of the random patterns.
        #[arg(long, default_value_t = 0x2545_F491_4F6C_DD1D)]
        seed: u64,

        /// Statistics sections to print (summary, commands, requests). All when omitted.
        #[arg(long, value_delimiter = ',')]
        stats: Vec<String>,

        /// Print statistics as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Validate a configuration file and print its derived parameters.
    Check {
        /// Configuration file (JSON).
        path: String,
    },
}

/// Synthetic traffic patterns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Pattern {
    /// Consecutive column words; each master walks its own row range.
    Sequential,
    /// Uniformly random addresses.
    Random,
    /// Alternates between two rows of the same bank.
    RowConflict,
}

/// Address generator of one master.
#[derive(Debug)]
struct Traffic {
    pattern: Pattern,
    master: usize,
    count: u64,
    state: u64,
    writes: u64,
}

impl Traffic {
    fn new(pattern: Pattern, master: usize, seed: u64, writes: u8) -> Self {
        Self {
            pattern,
            master,
            count: 0,
            state: (seed ^ (master as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)) | 1,
            writes: u64::from(writes),
        }
    }

    fn xorshift(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    fn next(&mut self, map: &AddressMap, config: &Config) -> Request {
        let nbanks = config.nbanks() as u64;
        let rows = 1u64 << config.geom.rowbits;
        let words = 1u64 << config.column_word_bits();
        let align = config.address_align();
        let n = self.count;
        self.count += 1;
        let address = match self.pattern {
            Pattern::Sequential => {
                let row = (self.master as u64 * 64 + n / (words * nbanks)) % rows;
                let bank = (n / words) % nbanks;
                map.encode(bank as usize, row as u32, ((n % words) << align) as u32)
            }
            Pattern::Random => {
                let bank = self.xorshift() % nbanks;
                let row = self.xorshift() % rows;
                let word = self.xorshift() % words;
                map.encode(bank as usize, row as u32, (word << align) as u32)
            }
            Pattern::RowConflict => {
                let row = (n % 2) + 2 * self.master as u64;
                map.encode(0, row as u32, ((n % words) << align) as u32)
            }
        };
        if self.xorshift() % 100 < self.writes {
            Request::write(address)
        } else {
            Request::read(address)
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            pattern,
            ports,
            cycles,
            writes,
            seed,
            stats,
            json,
        } => {
            let mut config = load_config(config.as_deref());
            if let Some(ports) = ports {
                config.ports = vec![PortConfig::native(); ports.max(1)];
            }
            let stats_out = cmd_run(&config, pattern, cycles, writes, seed);
            if json {
                println!("{}", stats_json(&stats_out));
            } else {
                print!("{}", stats_out.format_sections(&stats));
            }
        }
        Commands::Check { path } => cmd_check(&path),
    }
}

/// Loads and validates a configuration file, or returns the defaults. Exits on error.
fn load_config(path: Option<&str>) -> Config {
    let Some(path) = path else {
        return Config::default();
    };
    Config::from_file(path).unwrap_or_else(|e| {
        eprintln!("Error in configuration {path}: {e}");
        process::exit(1);
    })
}

/// Runs `cycles` cycles of `pattern` traffic on every configured port.
///
/// Each master keeps one request offered until the crossbar accepts it, then generates
/// the next one.
fn cmd_run(config: &Config, pattern: Pattern, cycles: u64, writes: u8, seed: u64) -> ControllerStats {
    let mut system = System::new(config).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });
    let map = AddressMap::new(config);
    let mut traffic: Vec<Traffic> = (0..config.ports.len())
        .map(|m| Traffic::new(pattern, m, seed, writes))
        .collect();
    let mut offered: Vec<Option<Request>> =
        traffic.iter_mut().map(|t| Some(t.next(&map, config))).collect();

    info!(?pattern, masters = traffic.len(), cycles, "starting traffic run");
    for _ in 0..cycles {
        let result = system.step(&offered);
        for (master, status) in result.ports.iter().enumerate() {
            if status.cmd_ready {
                offered[master] = Some(traffic[master].next(&map, config));
            }
        }
    }
    info!(
        accepted = system.stats().requests_accepted,
        refreshes = system.stats().refreshes,
        "traffic run finished"
    );
    system.stats().clone()
}

/// Validates a configuration file and prints its derived parameters.
fn cmd_check(path: &str) {
    let config = load_config(Some(path));
    println!("Configuration {path}: ok");
    println!(
        "  {:?} x{} phases  {} banks  native width {} bits",
        config.phy.memtype,
        config.phy.nphases,
        config.nbanks(),
        config.native_data_width()
    );
    println!(
        "  address width {} bits  ({} row, {} column word, {} bank)",
        config.address_width(),
        config.geom.rowbits,
        config.column_word_bits(),
        config.bank_index_bits()
    );
    println!(
        "  write-to-precharge {}  write-to-read {}  read-to-write {}  refresh sequence {} cycles",
        config.write_to_precharge(),
        config.write_to_read(),
        config.read_to_write(),
        config.refresh_sequence_cycles()
    );
    println!("  ports {}", config.ports.len());
}

fn stats_json(stats: &ControllerStats) -> serde_json::Value {
    serde_json::json!({
        "cycles": stats.cycles,
        "refresh_cycles": stats.refresh_cycles,
        "direction_switches": stats.direction_switches,
        "bus_utilization": stats.bus_utilization(),
        "row_hit_rate": stats.row_hit_rate(),
        "commands": {
            "activate": stats.activates,
            "precharge": stats.precharges,
            "precharge_all": stats.precharge_alls,
            "read": stats.reads,
            "write": stats.writes,
            "auto_precharge": stats.auto_precharges,
            "refresh": stats.refreshes,
            "zqcs": stats.zq_calibrations,
        },
        "requests": {
            "accepted": stats.requests_accepted,
            "reads_completed": stats.reads_completed,
            "writes_completed": stats.writes_completed,
        },
    })
}
