//! Round-robin arbiter with clock enable.
//!
//! The grant is a register. When the enable is high at a clock edge, the grant moves to
//! the first requester after the current holder, wrapping around; the current holder is
//! considered last, so it keeps the grant only when nobody else is requesting.

/// Rotating-priority arbiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundRobin {
    grant: usize,
    n: usize,
}

impl RoundRobin {
    /// Creates an arbiter over `n` requesters, granting requester 0.
    pub const fn new(n: usize) -> Self {
        Self { grant: 0, n }
    }

    /// Returns the current grant.
    pub const fn grant(&self) -> usize {
        self.grant
    }

    /// Returns the number of requesters.
    pub const fn len(&self) -> usize {
        self.n
    }

    /// Returns `true` if the arbiter has no requesters.
    pub const fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Returns the grant the next edge would produce with the enable high.
    ///
    /// # Arguments
    ///
    /// * `requests` - One flag per requester; missing entries count as idle.
    pub fn next_grant(&self, requests: &[bool]) -> usize {
        (1..self.n)
            .map(|offset| (self.grant + offset) % self.n)
            .find(|&i| requests.get(i).copied().unwrap_or(false))
            .unwrap_or(self.grant)
    }

    /// Applies one clock edge.
    ///
    /// # Arguments
    ///
    /// * `ce` - Clock enable; the grant only moves while it is high.
    /// * `requests` - Request flags sampled this cycle.
    pub fn commit(&mut self, ce: bool, requests: &[bool]) {
        if ce {
            self.grant = self.next_grant(requests);
        }
    }
}
