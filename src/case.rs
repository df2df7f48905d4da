//! Benchmark and regression case descriptions.
//!
//! A case is a plain parameter record. File names and command lines are
//! derived from it deterministically, so the same case always maps to the
//! same graph, rat, capture and reference files.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

/// How the simulator advances rats each step.
///
/// The harness only forwards the flag; the semantics live in the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
    /// Compute and move each rat in turn.
    RatOrder,
    /// Compute next states for a batch, then move the batch.
    Batch,
    /// Compute all next states, then move every rat.
    Synchronous,
}

impl UpdateMode {
    pub fn flag(self) -> char {
        match self {
            UpdateMode::RatOrder => 'r',
            UpdateMode::Batch => 'b',
            UpdateMode::Synchronous => 's',
        }
    }

    pub fn from_flag(c: char) -> Option<Self> {
        match c {
            'r' => Some(UpdateMode::RatOrder),
            'b' => Some(UpdateMode::Batch),
            's' => Some(UpdateMode::Synchronous),
            _ => None,
        }
    }

    /// Name used in the grading report.
    pub fn label(self) -> &'static str {
        match self {
            UpdateMode::RatOrder => "ratorder",
            UpdateMode::Batch => "batch",
            UpdateMode::Synchronous => "synch",
        }
    }
}

impl fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.flag())
    }
}

/// Colon-separated list of update modes, e.g. `b:s`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateList(pub Vec<UpdateMode>);

impl FromStr for UpdateList {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(':')
            .map(|field| {
                let mut chars = field.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => UpdateMode::from_flag(c),
                    _ => None,
                }
                .ok_or_else(|| {
                    HarnessError::InvalidArgument(format!("Invalid update mode '{}'", field))
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(UpdateList)
    }
}

impl Default for UpdateList {
    fn default() -> Self {
        UpdateList(vec![UpdateMode::Batch, UpdateMode::Synchronous])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphType {
    Uniform,
    Targeted,
}

impl GraphType {
    pub fn flag(self) -> char {
        match self {
            GraphType::Uniform => 'u',
            GraphType::Targeted => 't',
        }
    }
}

impl fmt::Display for GraphType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.flag())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatType {
    Uniform,
    Distributed,
}

impl RatType {
    pub fn flag(self) -> char {
        match self {
            RatType::Uniform => 'u',
            RatType::Distributed => 'd',
        }
    }
}

impl fmt::Display for RatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.flag())
    }
}

/// Graph file: `<data_dir>/g-<type><size>.gph`.
pub fn graph_file(data_dir: &Path, graph_type: GraphType, graph_size: u32) -> PathBuf {
    data_dir.join(format!("g-{}{}.gph", graph_type, graph_size))
}

/// Rat file: `<data_dir>/r-<size>-<ratType><loadFactor>.rats`.
pub fn rat_file(data_dir: &Path, graph_size: u32, rat_type: RatType, load_factor: u32) -> PathBuf {
    data_dir.join(format!("r-{}-{}{}.rats", graph_size, rat_type, load_factor))
}

/// Graph and rat combination swept by the benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Workload {
    pub graph_size: u32,
    pub graph_type: GraphType,
    pub rat_type: RatType,
    pub load_factor: u32,
}

impl Workload {
    pub const fn new(graph_size: u32, graph_type: GraphType, rat_type: RatType, load_factor: u32) -> Self {
        Self {
            graph_size,
            graph_type,
            rat_type,
            load_factor,
        }
    }
}

/// One simulator invocation in a benchmark sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkCase {
    pub graph_size: u32,
    pub graph_type: GraphType,
    pub rat_type: RatType,
    pub load_factor: u32,
    pub step_count: u32,
    pub update_mode: UpdateMode,
    pub process_count: u32,
}

impl BenchmarkCase {
    pub fn new(workload: Workload, step_count: u32, update_mode: UpdateMode, process_count: u32) -> Self {
        Self {
            graph_size: workload.graph_size,
            graph_type: workload.graph_type,
            rat_type: workload.rat_type,
            load_factor: workload.load_factor,
            step_count,
            update_mode,
            process_count,
        }
    }

    /// Every parameter except the process count.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint {
            graph_size: self.graph_size,
            graph_type: self.graph_type,
            load_factor: self.load_factor,
            rat_type: self.rat_type,
            step_count: self.step_count,
            update_mode: self.update_mode,
        }
    }

    /// Rat position updates performed by one run.
    pub fn rat_updates(&self) -> u64 {
        u64::from(self.graph_size) * u64::from(self.load_factor) * u64::from(self.step_count)
    }

    pub fn graph_file(&self, data_dir: &Path) -> PathBuf {
        graph_file(data_dir, self.graph_type, self.graph_size)
    }

    pub fn rat_file(&self, data_dir: &Path) -> PathBuf {
        rat_file(data_dir, self.graph_size, self.rat_type, self.load_factor)
    }

    /// Recorded output snapshot used by correctness-check mode.
    pub fn capture_name(&self) -> String {
        format!(
            "cap-{:05}-{}-{}-{:03}-{:04}-{}.txt",
            self.graph_size,
            self.graph_type,
            self.rat_type,
            self.load_factor,
            self.step_count,
            self.update_mode
        )
    }

    /// Short identifier used in JSON result records.
    pub fn name(&self) -> String {
        format!(
            "graphrats/{}/g{}{}-r{}{}/n{}/p{}",
            self.update_mode,
            self.graph_type,
            self.graph_size,
            self.rat_type,
            self.load_factor,
            self.step_count,
            self.process_count
        )
    }
}

/// Key of the single-process result cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub graph_size: u32,
    pub graph_type: GraphType,
    pub load_factor: u32,
    pub rat_type: RatType,
    pub step_count: u32,
    pub update_mode: UpdateMode,
}

/// Which simulator produced an output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Reference,
    Test,
}

impl Role {
    fn prefix(self) -> &'static str {
        match self {
            Role::Reference => "ref",
            Role::Test => "tst",
        }
    }
}

/// One entry of the regression list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegressionCase {
    pub graph_size: u32,
    pub graph_type: GraphType,
    pub rat_type: RatType,
    pub load_factor: u32,
    pub step_count: u32,
    pub update_mode: UpdateMode,
    pub seed: u32,
}

impl RegressionCase {
    pub const fn new(
        graph_size: u32,
        graph_type: GraphType,
        rat_type: RatType,
        load_factor: u32,
        step_count: u32,
        update_mode: UpdateMode,
        seed: u32,
    ) -> Self {
        Self {
            graph_size,
            graph_type,
            rat_type,
            load_factor,
            step_count,
            update_mode,
            seed,
        }
    }

    /// Output file name, e.g. `ref-400-u-d-010-011-b-19.txt`.
    pub fn file_name(&self, role: Role) -> String {
        format!(
            "{}-{:03}-{}-{}-{:03}-{:03}-{}-{:02}.txt",
            role.prefix(),
            self.graph_size,
            self.graph_type,
            self.rat_type,
            self.load_factor,
            self.step_count,
            self.update_mode,
            self.seed
        )
    }

    pub fn graph_file(&self, data_dir: &Path) -> PathBuf {
        graph_file(data_dir, self.graph_type, self.graph_size)
    }

    pub fn rat_file(&self, data_dir: &Path) -> PathBuf {
        rat_file(data_dir, self.graph_size, self.rat_type, self.load_factor)
    }
}
