//! Append-only record of our shots and their server-reported outcomes.

use std::collections::BTreeMap;

use log::debug;

use crate::common::{Coord, ShotResult};

/// What a merge actually changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Entries that were new to the ledger.
    pub added: usize,
    /// New entries that were a hit or a head.
    pub new_hits: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShotLedger {
    entries: BTreeMap<Coord, ShotResult>,
}

impl ShotLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, at: Coord) -> Option<ShotResult> {
        self.entries.get(&at).copied()
    }

    /// Result to display for a fired cell; unknown results read as a miss.
    pub fn result_or_miss(&self, at: Coord) -> ShotResult {
        self.get(at).unwrap_or(ShotResult::Miss)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coord, ShotResult)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, *v))
    }

    /// Add entries whose key is not present yet. Existing entries are never
    /// overwritten, so replaying a delta is a no-op.
    pub fn merge<I>(&mut self, delta: I) -> MergeReport
    where
        I: IntoIterator<Item = (Coord, ShotResult)>,
    {
        let mut report = MergeReport::default();
        for (at, result) in delta {
            match self.entries.get(&at) {
                Some(existing) if *existing != result => {
                    debug!("ledger keeps {} at {}, server now says {}", existing, at, result);
                }
                Some(_) => {}
                None => {
                    self.entries.insert(at, result);
                    report.added += 1;
                    if result.is_hit() {
                        report.new_hits += 1;
                    }
                }
            }
        }
        report
    }

    /// Number of entries that hit an airplane (body or head).
    pub fn hits(&self) -> usize {
        self.entries.values().filter(|r| r.is_hit()).count()
    }
}
