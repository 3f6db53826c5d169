//! Bandwidth counter.
//!
//! Counts column commands over fixed periods of `2^period_bits` cycles. At the end of each
//! period the counts are latched; `update` copies the latched counts into the readable
//! snapshot, so software sees one complete period at a time.

/// Read and write command counts of one completed period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BandwidthSample {
    /// READ commands issued during the period.
    pub reads: u64,
    /// WRITE commands issued during the period.
    pub writes: u64,
    /// Period length in cycles.
    pub period: u64,
    /// Bits transferred per command.
    pub data_width: u32,
}

impl BandwidthSample {
    /// Returns the fraction of cycles that carried a data burst.
    pub fn utilization(&self) -> f64 {
        if self.period == 0 {
            return 0.0;
        }
        (self.reads + self.writes) as f64 / self.period as f64
    }
}

/// Periodic read/write command counter.
#[derive(Debug, Clone)]
pub struct Bandwidth {
    period: u64,
    data_width: u32,
    cycle: u64,
    reads: u64,
    writes: u64,
    latched: (u64, u64),
    snapshot: BandwidthSample,
}

impl Bandwidth {
    /// Creates a counter.
    ///
    /// # Arguments
    ///
    /// * `period_bits` - log2 of the measurement period in cycles.
    /// * `data_width` - Native data width in bits.
    pub fn new(period_bits: u32, data_width: u32) -> Self {
        let period = 1u64 << period_bits.min(63);
        Self {
            period,
            data_width,
            cycle: 0,
            reads: 0,
            writes: 0,
            latched: (0, 0),
            snapshot: BandwidthSample {
                period,
                data_width,
                ..BandwidthSample::default()
            },
        }
    }

    /// Advances one cycle.
    ///
    /// # Arguments
    ///
    /// * `read` - A READ issued this cycle.
    /// * `write` - A WRITE issued this cycle.
    pub fn tick(&mut self, read: bool, write: bool) {
        self.reads += u64::from(read);
        self.writes += u64::from(write);
        self.cycle += 1;
        if self.cycle == self.period {
            self.latched = (self.reads, self.writes);
            self.cycle = 0;
            self.reads = 0;
            self.writes = 0;
        }
    }

    /// Publishes the counts of the last completed period.
    pub fn update(&mut self) -> BandwidthSample {
        self.snapshot = BandwidthSample {
            reads: self.latched.0,
            writes: self.latched.1,
            period: self.period,
            data_width: self.data_width,
        };
        self.snapshot
    }

    /// Returns the last published sample.
    pub const fn sample(&self) -> BandwidthSample {
        self.snapshot
    }
}
