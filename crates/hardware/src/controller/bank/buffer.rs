//! Bank request buffer.
//!
//! Two-stage request path of a bank machine: a lookahead FIFO filled by the crossbar,
//! feeding a one-entry register holding the request currently being served. The lookahead
//! front is visible to the FSM so it can tag the current access with auto-precharge
//! when the next one targets a different row.

use std::collections::VecDeque;

/// A request accepted by a bank machine, with its bank field already removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankRequest {
    /// `true` for a write.
    pub is_write: bool,
    /// Bank-local address (row and column words).
    pub addr: u64,
}

/// Lookahead FIFO plus current-request register.
#[derive(Debug, Clone)]
pub struct CommandBuffer {
    lookahead: VecDeque<BankRequest>,
    current: Option<BankRequest>,
    depth: usize,
}

impl CommandBuffer {
    /// Creates an empty buffer.
    ///
    /// # Arguments
    ///
    /// * `depth` - Lookahead capacity; 0 behaves as 1.
    pub fn new(depth: usize) -> Self {
        let depth = depth.max(1);
        Self {
            lookahead: VecDeque::with_capacity(depth),
            current: None,
            depth,
        }
    }

    /// Returns `true` if a new request can be accepted this cycle.
    pub fn ready(&self) -> bool {
        self.lookahead.len() < self.depth
    }

    /// Returns `true` if any request is buffered.
    pub fn is_pending(&self) -> bool {
        self.current.is_some() || !self.lookahead.is_empty()
    }

    /// Returns the request being served.
    pub const fn current(&self) -> Option<&BankRequest> {
        self.current.as_ref()
    }

    /// Returns the request that follows the current one.
    pub fn next(&self) -> Option<&BankRequest> {
        self.lookahead.front()
    }

    /// Returns the number of buffered requests, including the current one.
    pub fn len(&self) -> usize {
        self.lookahead.len() + usize::from(self.current.is_some())
    }

    /// Returns `true` if nothing is buffered.
    pub fn is_empty(&self) -> bool {
        !self.is_pending()
    }

    /// Applies one clock edge.
    ///
    /// # Arguments
    ///
    /// * `consumed` - The current request was issued this cycle.
    /// * `push` - Request accepted from the crossbar this cycle (only if `ready` was high).
    pub fn commit(&mut self, consumed: bool, push: Option<BankRequest>) {
        if consumed {
            self.current = None;
        }
        if self.current.is_none() {
            self.current = self.lookahead.pop_front();
        }
        if let Some(request) = push {
            self.lookahead.push_back(request);
        }
    }
}
