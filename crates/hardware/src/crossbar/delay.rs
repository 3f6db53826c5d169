//! Fixed-latency shift register.

use std::collections::VecDeque;

/// Delays a one-bit signal by a fixed number of cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelayLine {
    stages: VecDeque<bool>,
}

impl DelayLine {
    /// Creates a delay line of `latency` cycles, initially all low.
    pub fn new(latency: u32) -> Self {
        Self {
            stages: std::iter::repeat_n(false, latency as usize).collect(),
        }
    }

    /// Returns the latency in cycles.
    pub fn latency(&self) -> usize {
        self.stages.len()
    }

    /// Returns `true` if any stage holds a pulse.
    pub fn is_busy(&self) -> bool {
        self.stages.iter().any(|&stage| stage)
    }

    /// Shifts `input` in and returns the value that entered `latency` cycles ago.
    pub fn shift(&mut self, input: bool) -> bool {
        self.stages.push_back(input);
        self.stages.pop_front().unwrap_or(input)
    }
}
