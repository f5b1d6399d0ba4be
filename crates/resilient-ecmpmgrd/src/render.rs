//! Command rendering for resilient ECMP entries
//!
//! A [`Command`] keeps the fields it was rendered from next to its text, so
//! the reconciliation engine compares commands by field instead of by
//! string inspection.

use std::fmt;

use eos_cfgmgr_common::NEGATION_PREFIX;
use serde::{Serialize, Serializer};

use crate::keywords;
use crate::types::{AddressFamilyConfig, Afi};

/// One device command for a resilient ECMP route.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Command {
    afi: Afi,
    destination: String,
    capacity: u32,
    redundancy: u32,
    negated: bool,
}

impl Command {
    fn new(afi: Afi, destination: &str, capacity: u32, redundancy: u32) -> Self {
        Self {
            afi,
            destination: destination.to_string(),
            capacity,
            redundancy,
            negated: false,
        }
    }

    /// Returns the removal form of this command.
    pub fn negate(mut self) -> Self {
        self.negated = true;
        self
    }

    pub fn afi(&self) -> Afi {
        self.afi
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn redundancy(&self) -> u32 {
        self.redundancy
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// True when both commands configure the same route with the same values,
    /// regardless of polarity.
    pub fn same_route(&self, other: &Command) -> bool {
        self.afi == other.afi
            && self.destination == other.destination
            && self.capacity == other.capacity
            && self.redundancy == other.redundancy
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str(NEGATION_PREFIX)?;
        }
        write!(
            f,
            "{} {} {} {} {} {} {}",
            self.afi.cli_prefix(),
            keywords::RESILIENCE,
            self.destination,
            keywords::CAPACITY,
            self.capacity,
            keywords::REDUNDANCY,
            self.redundancy
        )
    }
}

impl Serialize for Command {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Renders the positive commands of one address family, in route order.
///
/// Routes without a destination, capacity or redundancy produce nothing.
pub fn render(entry: &AddressFamilyConfig) -> Vec<Command> {
    entry
        .routes
        .iter()
        .filter_map(|route| route.renderable())
        .map(|(dest, capacity, redundancy)| Command::new(entry.afi, dest, capacity, redundancy))
        .collect()
}

/// Renders every family of a set in order.
pub fn render_all(set: &[AddressFamilyConfig]) -> Vec<Command> {
    set.iter().flat_map(render).collect()
}

/// Converts commands to the CLI lines handed to a transport.
pub fn to_cli_lines(commands: &[Command]) -> Vec<String> {
    commands.iter().map(Command::to_string).collect()
}
