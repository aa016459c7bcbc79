use serde::Serialize;
use std::collections::HashSet;

use crate::transit::{Arrival, Stop};

/// Keeps the first arrival for each (route, destination) pair, in source
/// order, and stops looking once `limit` rows are collected.
pub fn dedupe_and_limit(arrivals: Vec<Arrival>, limit: usize) -> Vec<Arrival> {
    let mut seen: HashSet<(Option<String>, String)> = HashSet::new();
    let mut result = Vec::with_capacity(limit.min(arrivals.len()));

    for arrival in arrivals {
        if result.len() >= limit {
            break;
        }
        if seen.insert((arrival.route.clone(), arrival.destination.clone())) {
            result.push(arrival);
        }
    }

    result
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Fetched,
    /// The per-stop request failed this cycle; the stop is still listed.
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardEntry {
    pub stop: Stop,
    /// Deduplicated and capped at the board limit.
    pub arrivals: Vec<Arrival>,
    /// Deduplicated but uncapped, for hiding rows already shown at a nearer
    /// stop before the cap applies.
    #[serde(skip)]
    pub upcoming: Vec<Arrival>,
    pub status: EntryStatus,
}

/// Ranked stops with their deduplicated arrivals, rebuilt on every cycle.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArrivalBoard {
    entries: Vec<BoardEntry>,
}

impl ArrivalBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stop: Stop, arrivals: Vec<Arrival>, limit: usize) {
        let upcoming = dedupe_and_limit(arrivals, usize::MAX);
        self.entries.push(BoardEntry {
            stop,
            arrivals: upcoming.iter().take(limit).cloned().collect(),
            upcoming,
            status: EntryStatus::Fetched,
        });
    }

    pub fn push_failed(&mut self, stop: Stop) {
        self.entries.push(BoardEntry {
            stop,
            arrivals: Vec::new(),
            upcoming: Vec::new(),
            status: EntryStatus::Failed,
        });
    }

    #[cfg(test)]
    pub fn get(&self, stop_id: &str) -> Option<&BoardEntry> {
        self.entries.iter().find(|entry| entry.stop.id == stop_id)
    }

    pub fn entries(&self) -> &[BoardEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn failed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.status == EntryStatus::Failed)
            .count()
    }

    /// Rows for display, walking stops nearest first. A (route, destination)
    /// already shown at a nearer stop is hidden further down, and each stop
    /// then shows at most `limit` of what is left. Stops left without rows
    /// are omitted.
    pub fn display_rows(&self, limit: usize) -> Vec<(&Stop, Vec<&Arrival>)> {
        let mut shown: HashSet<(Option<&str>, &str)> = HashSet::new();
        let mut rows = Vec::new();

        for entry in &self.entries {
            let mut visible = Vec::new();
            for arrival in &entry.upcoming {
                if visible.len() >= limit {
                    break;
                }
                if shown.insert(arrival.key()) {
                    visible.push(arrival);
                }
            }
            if !visible.is_empty() {
                rows.push((&entry.stop, visible));
            }
        }

        rows
    }
}
