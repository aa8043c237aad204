//! Named video-source tracking.
//!
//! The tracked list only ever grows at the end, so a name keeps its
//! position (its scene index) for as long as it is tracked. Vanished names
//! are pruned only when pruning is enabled; pruning shifts the names after
//! the removed one down by one.

use std::collections::HashSet;

/// Names that appeared and disappeared between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceDiff {
    /// New names, in first-seen order.
    pub added: Vec<String>,
    /// Vanished names, in tracked order. Always empty when pruning is off.
    pub removed: Vec<String>,
}

impl SourceDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Compare a tracked list against a fresh snapshot.
///
/// `current` may contain duplicates; only the first occurrence counts.
pub fn diff(previous: &[String], current: &[String], prune: bool) -> SourceDiff {
    let known: HashSet<&str> = previous.iter().map(String::as_str).collect();
    let mut seen: HashSet<&str> = HashSet::new();

    let mut added = Vec::new();
    for name in current {
        if seen.insert(name.as_str()) && !known.contains(name.as_str()) {
            added.push(name.clone());
        }
    }

    let removed = if prune {
        previous
            .iter()
            .filter(|name| !seen.contains(name.as_str()))
            .cloned()
            .collect()
    } else {
        Vec::new()
    };

    SourceDiff { added, removed }
}

/// Ordered, insertion-stable list of tracked source names.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    names: Vec<String>,
    prune: bool,
}

impl SourceRegistry {
    pub fn new(prune: bool) -> Self {
        Self {
            names: Vec::new(),
            prune,
        }
    }

    /// Fold a snapshot into the tracked list and report what changed.
    pub fn refresh<I, S>(&mut self, snapshot: I) -> SourceDiff
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let current: Vec<String> = snapshot.into_iter().map(Into::into).collect();
        let changes = diff(&self.names, &current, self.prune);

        if !changes.removed.is_empty() {
            let removed: HashSet<&str> = changes.removed.iter().map(String::as_str).collect();
            self.names.retain(|name| !removed.contains(name.as_str()));
        }
        self.names.extend(changes.added.iter().cloned());

        changes
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
