//! Scoring geometric-mean throughput against fixed targets.
//!
//! Each entry earns partial credit on a linear ramp from half the target
//! (nothing) to the target itself (full weight).

use std::collections::BTreeMap;
use std::fmt;

use crate::accumulator::{GeometricMeanTable, ModeKey};
use crate::case::UpdateMode;

/// Weight of each throughput entry.
pub const PERF_WEIGHT: f64 = 17.0;
/// Weight of each speedup entry.
pub const SPEEDUP_WEIGHT: f64 = 6.0;

const FULL_CREDIT_THRESHOLD: f64 = 1.0;
const PARTIAL_CREDIT_THRESHOLD: f64 = 2.0;

/// Credit for achieving `achieved` against `target`, out of `weight`.
pub fn score(achieved: f64, target: f64, weight: f64) -> f64 {
    let min_acceptable = target / PARTIAL_CREDIT_THRESHOLD;
    let max_credit = target / FULL_CREDIT_THRESHOLD;
    if achieved >= max_credit {
        weight
    } else if achieved < min_acceptable {
        0.0
    } else {
        weight * (achieved - min_acceptable) / (max_credit - min_acceptable)
    }
}

/// Speedup target key: mode, baseline process count, scaled process count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpeedupKey {
    pub mode: UpdateMode,
    pub low: u32,
    pub high: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradeTargets {
    pub throughput: BTreeMap<ModeKey, f64>,
    pub speedup: BTreeMap<SpeedupKey, f64>,
}

impl Default for GradeTargets {
    fn default() -> Self {
        use crate::case::UpdateMode::{Batch, Synchronous};

        let throughput = [
            (ModeKey::new(Batch, 1), 25.0),
            (ModeKey::new(Synchronous, 1), 35.0),
            (ModeKey::new(Batch, 12), 87.5),
            (ModeKey::new(Synchronous, 12), 112.0),
        ]
        .into_iter()
        .collect();
        let speedup = [
            (SpeedupKey { mode: Batch, low: 1, high: 12 }, 3.5),
            (SpeedupKey { mode: Synchronous, low: 1, high: 12 }, 3.2),
        ]
        .into_iter()
        .collect();
        Self { throughput, speedup }
    }
}

/// One scored line of the report.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreLine {
    pub mode: UpdateMode,
    pub achieved: f64,
    pub target: f64,
    pub score: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThroughputScore {
    pub processes: u32,
    pub line: ScoreLine,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpeedupScore {
    pub low: u32,
    pub high: u32,
    pub line: ScoreLine,
}

/// Full grading result, rendered with `Display`.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeReport {
    pub info: Option<String>,
    pub throughput: Vec<ThroughputScore>,
    pub speedup: Vec<SpeedupScore>,
    /// False if any benchmark case failed; voids every score.
    pub ok: bool,
    /// Sum of all entry scores, before rounding.
    pub raw_total: f64,
    pub possible: f64,
}

impl GradeReport {
    /// Whole-number score actually awarded.
    pub fn earned(&self) -> u32 {
        if self.ok {
            self.raw_total.ceil() as u32
        } else {
            0
        }
    }
}

impl GradeTargets {
    /// Score every table entry that has a target.
    ///
    /// Throughput lines come in process-count order, then mode order. A
    /// speedup entry is scored only when both endpoints are in the table; its
    /// baseline is capped at the baseline's own throughput target.
    pub fn grade(&self, gmeans: &GeometricMeanTable, ok: bool, info: Option<&str>) -> GradeReport {
        let mut raw_total = 0.0;
        let mut possible = 0.0;

        let mut keys: Vec<&ModeKey> = self.throughput.keys().collect();
        keys.sort_by_key(|k| (k.processes, k.mode));

        let mut throughput = Vec::new();
        for key in keys {
            let Some(achieved) = gmeans.get(key) else {
                continue;
            };
            let target = self.throughput[key];
            let value = score(achieved, target, PERF_WEIGHT);
            possible += PERF_WEIGHT;
            raw_total += value;
            throughput.push(ThroughputScore {
                processes: key.processes,
                line: ScoreLine {
                    mode: key.mode,
                    achieved,
                    target,
                    score: value,
                    weight: PERF_WEIGHT,
                },
            });
        }

        let mut speedup = Vec::new();
        for (key, &target) in &self.speedup {
            let low_key = ModeKey::new(key.mode, key.low);
            let high_key = ModeKey::new(key.mode, key.high);
            let (Some(low), Some(high)) = (gmeans.get(&low_key), gmeans.get(&high_key)) else {
                continue;
            };
            let baseline = match self.throughput.get(&low_key) {
                Some(&low_target) => low.min(low_target),
                None => low,
            };
            let achieved = high / baseline;
            let value = score(achieved, target, SPEEDUP_WEIGHT);
            possible += SPEEDUP_WEIGHT;
            raw_total += value;
            speedup.push(SpeedupScore {
                low: key.low,
                high: key.high,
                line: ScoreLine {
                    mode: key.mode,
                    achieved,
                    target,
                    score: value,
                    weight: SPEEDUP_WEIGHT,
                },
            });
        }

        GradeReport {
            info: info.map(str::to_string),
            throughput,
            speedup,
            ok,
            raw_total,
            possible,
        }
    }
}

impl fmt::Display for ScoreLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Mode = {}, Achieved = {:.2}, Target = {:.2}, Score = {:.2}/{:.2}",
            self.mode.label(),
            self.achieved,
            self.target,
            self.score,
            self.weight
        )
    }
}

impl fmt::Display for GradeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "---------".repeat(9);
        writeln!(f, "{}", rule)?;
        writeln!(f, "MRPS Scores")?;
        for entry in &self.throughput {
            write!(f, "   ")?;
            if let Some(info) = &self.info {
                write!(f, "{}, ", info)?;
            }
            writeln!(f, "Parallel = {}, {}", entry.processes, entry.line)?;
        }
        writeln!(f, "Speedup Scores")?;
        for entry in &self.speedup {
            writeln!(f, "  Ratio = {}:{}, {}", entry.high, entry.low, entry.line)?;
        }
        if !self.ok {
            writeln!(f, "ERROR: One or more tests failed.  No credit given")?;
        }
        writeln!(f, "TOTAL = {}/{:.0}", self.earned(), self.possible)?;
        writeln!(f, "{}", rule)
    }
}
