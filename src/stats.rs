//! # Command Statistics
//!
//! Accumulates per-command counts and distinct unknown sequences across all
//! packets of a run.
//!
//! Counts and set membership do not depend on the order packets are
//! recorded in, so per-thread aggregators can be [merged](Aggregator::merge)
//! freely.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::tokenizer::{DecodedCommand, ParsedPacket};

/// Run-wide command statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregator {
    frequency: BTreeMap<Vec<u8>, u64>,
    unknown_sequences: BTreeSet<Vec<u8>>,
}

/// Point-in-time view of an [`Aggregator`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Matched commands over all packets
    pub total_matched: u64,
    /// Distinct matched prefixes
    pub unique_commands: usize,
    /// Distinct unknown sequences
    pub unknown_count: usize,
    /// `(prefix, count)`, most frequent first, ties by prefix
    pub frequency_table: Vec<(Vec<u8>, u64)>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one buffer's decoded commands into the totals.
    pub fn record(&mut self, commands: &[DecodedCommand]) {
        for command in commands {
            if command.is_unknown() {
                self.unknown_sequences.insert(command.prefix.clone());
            } else {
                *self.frequency.entry(command.prefix.clone()).or_insert(0) += 1;
            }
        }
    }

    pub fn record_packet(&mut self, packet: &ParsedPacket) {
        self.record(&packet.commands);
    }

    /// Add another aggregator's totals into this one.
    pub fn merge(&mut self, other: Aggregator) {
        for (prefix, count) in other.frequency {
            *self.frequency.entry(prefix).or_insert(0) += count;
        }
        self.unknown_sequences.extend(other.unknown_sequences);
    }

    pub fn summary(&self) -> Summary {
        let mut frequency_table: Vec<(Vec<u8>, u64)> = self
            .frequency
            .iter()
            .map(|(prefix, count)| (prefix.clone(), *count))
            .collect();
        // BTreeMap order already sorts by prefix; stable sort keeps that for ties
        frequency_table.sort_by(|a, b| b.1.cmp(&a.1));

        Summary {
            total_matched: self.frequency.values().sum(),
            unique_commands: self.frequency.len(),
            unknown_count: self.unknown_sequences.len(),
            frequency_table,
        }
    }

    pub fn frequency(&self) -> &BTreeMap<Vec<u8>, u64> {
        &self.frequency
    }

    /// Unknown sequences in ascending byte order
    pub fn unknown_sequences(&self) -> &BTreeSet<Vec<u8>> {
        &self.unknown_sequences
    }
}
