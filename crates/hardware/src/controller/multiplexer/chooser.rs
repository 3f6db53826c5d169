//! Command chooser.
//!
//! Picks one bank machine's pending command per cycle. A command is a candidate only if
//! its class is currently wanted; among candidates the pick rotates round-robin. The
//! chooser presents the command of the bank its arbiter currently grants, so a grant
//! pointing at a bank with no candidate yields an empty cycle while the arbiter moves on.

use crate::common::arbiter::RoundRobin;
use crate::common::command::Command;

/// Command classes the scheduler wants this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Wants {
    /// Row and maintenance commands (ACTIVATE, PRECHARGE).
    pub cmds: bool,
    /// ACTIVATE specifically; only meaningful together with `cmds`.
    pub activates: bool,
    /// Column reads.
    pub reads: bool,
    /// Column writes.
    pub writes: bool,
}

impl Wants {
    /// Wants nothing.
    pub const NONE: Self = Self {
        cmds: false,
        activates: false,
        reads: false,
        writes: false,
    };

    /// Returns `true` if `command` belongs to a wanted class.
    pub const fn admits(&self, command: &Command) -> bool {
        if command.is_cmd() {
            self.cmds && (self.activates || !command.is_activate())
        } else {
            (self.reads && command.is_read()) || (self.writes && command.is_write())
        }
    }
}

/// A command selected by a chooser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    /// Bank machine offering the command.
    pub bank: usize,
    /// The command itself.
    pub command: Command,
}

/// Result of one chooser evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChooserOutput {
    /// Candidate flag per bank machine.
    pub candidates: Vec<bool>,
    /// Command presented to the steerer, if the granted bank is a candidate.
    pub choice: Option<Choice>,
}

/// Round-robin selector over bank machine commands.
#[derive(Debug, Clone)]
pub struct CommandChooser {
    arbiter: RoundRobin,
}

impl CommandChooser {
    /// Creates a chooser over `nbanks` bank machines.
    pub const fn new(nbanks: usize) -> Self {
        Self {
            arbiter: RoundRobin::new(nbanks),
        }
    }

    /// Returns the bank currently granted.
    pub const fn grant(&self) -> usize {
        self.arbiter.grant()
    }

    /// Selects this cycle's command.
    ///
    /// # Arguments
    ///
    /// * `commands` - Command offered by each bank machine.
    /// * `wants` - Classes admitted this cycle.
    pub fn evaluate(&self, commands: &[Option<Command>], wants: Wants) -> ChooserOutput {
        let candidates: Vec<bool> = commands
            .iter()
            .map(|command| command.as_ref().is_some_and(|c| wants.admits(c)))
            .collect();
        let grant = self.arbiter.grant();
        let choice = match (candidates.get(grant), commands.get(grant)) {
            (Some(true), Some(Some(command))) => Some(Choice {
                bank: grant,
                command: *command,
            }),
            _ => None,
        };
        ChooserOutput { candidates, choice }
    }

    /// Applies one clock edge.
    ///
    /// # Arguments
    ///
    /// * `output` - This cycle's evaluation.
    /// * `ready` - The multiplexer would accept the presented command.
    pub fn commit(&mut self, output: &ChooserOutput, ready: bool) {
        let ce = ready || output.choice.is_none();
        self.arbiter.commit(ce, &output.candidates);
    }
}
