#![forbid(unsafe_code)]

//! Sequenced audit trail for descriptor resolutions.
//!
//! Every resolution a caller records gets a run-wide sequence number that
//! survives eviction, so a JSON-lines dump of the ledger shows where older
//! entries were dropped.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// One ledger entry tagged with the order it was recorded in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequenced<T> {
    pub sequence: u64,
    #[serde(flatten)]
    pub entry: T,
}

/// Resolution evidence kept for the last `capacity` calls.
///
/// The ledger is owned by the caller; nothing in the workspace keeps one
/// in global state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceLedger<T> {
    capacity: usize,
    next_sequence: u64,
    entries: VecDeque<Sequenced<T>>,
}

impl<T> EvidenceLedger<T> {
    /// A ledger holding at least one entry.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            next_sequence: 0,
            entries: VecDeque::new(),
        }
    }

    /// Store `entry` under the next sequence number and return that number.
    pub fn record(&mut self, entry: T) -> u64 {
        if self.entries.len() == self.capacity {
            let _ = self.entries.pop_front();
        }
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.entries.push_back(Sequenced { sequence, entry });
        sequence
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Resolutions recorded since construction, retained or not.
    #[must_use]
    pub const fn recorded(&self) -> u64 {
        self.next_sequence
    }

    /// Resolutions no longer held, whether evicted or drained.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.next_sequence - self.entries.len() as u64
    }

    #[must_use]
    pub fn latest(&self) -> Option<&T> {
        self.entries.back().map(|sequenced| &sequenced.entry)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|sequenced| &sequenced.entry)
    }

    /// Retained entries with their sequence numbers, oldest first.
    pub fn sequenced(&self) -> impl Iterator<Item = &Sequenced<T>> {
        self.entries.iter()
    }

    /// Hand back the retained entries. Numbering continues afterwards.
    pub fn drain(&mut self) -> Vec<T> {
        self.entries
            .drain(..)
            .map(|sequenced| sequenced.entry)
            .collect()
    }
}
