//! Running state of a benchmark sweep.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use crate::case::{Fingerprint, UpdateMode};

/// Running geometric mean over positive samples.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GmeanAccumulator {
    log_sum: f64,
    count: usize,
}

impl GmeanAccumulator {
    /// Add a sample. Non-positive samples are ignored.
    pub fn add(&mut self, value: f64) {
        if value > 0.0 {
            self.log_sum += value.ln();
            self.count += 1;
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// `None` until at least one positive sample has been added.
    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some((self.log_sum / self.count as f64).exp())
        }
    }
}

/// Single-process MRPS keyed by every parameter except the process count.
///
/// The first value written for a fingerprint wins for the rest of the run.
#[derive(Debug, Clone, Default)]
pub struct ResultCache {
    entries: HashMap<Fingerprint, f64>,
}

impl ResultCache {
    /// Record a baseline. Returns false if one was already present.
    pub fn insert(&mut self, key: Fingerprint, mrps: f64) -> bool {
        match self.entries.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(mrps);
                true
            }
        }
    }

    pub fn get(&self, key: &Fingerprint) -> Option<f64> {
        self.entries.get(key).copied()
    }

    /// Speedup of `mrps` over the cached baseline for `key`, if any.
    pub fn speedup(&self, key: &Fingerprint, mrps: f64) -> Option<f64> {
        self.get(key).map(|base| mrps / base)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Table key: update mode and process count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModeKey {
    pub mode: UpdateMode,
    pub processes: u32,
}

impl ModeKey {
    pub const fn new(mode: UpdateMode, processes: u32) -> Self {
        Self { mode, processes }
    }
}

/// Geometric-mean MRPS per (mode, process count), fed to the grader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometricMeanTable {
    entries: BTreeMap<ModeKey, f64>,
}

impl GeometricMeanTable {
    pub fn insert(&mut self, key: ModeKey, gmean: f64) {
        self.entries.insert(key, gmean);
    }

    pub fn get(&self, key: &ModeKey) -> Option<f64> {
        self.entries.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ModeKey, &f64)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(ModeKey, f64)> for GeometricMeanTable {
    fn from_iter<I: IntoIterator<Item = (ModeKey, f64)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
