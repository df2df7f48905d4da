//! JSON result records.
//!
//! A run of `benchmark --json` writes one [`BenchmarkReport`]; `bench-compare`
//! reads two of them back.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One `benchmark --json` run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// Bumped whenever a field changes meaning.
    pub schema_version: u32,
    pub metadata: RunMetadata,
    /// One entry per simulator run.
    pub results: Vec<BenchmarkResult>,
    /// Geometric means per update mode and process count.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gmeans: Vec<GmeanEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<GradeSummary>,
}

/// Where and when the sweep ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    /// UTC start time, `YYYY-MM-DDTHH:MM:SSZ`.
    pub timestamp: String,
    /// Commit of the harness checkout, absent outside a git tree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_commit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_dirty: Option<bool>,
    pub harness_version: String,
    /// Host name and its known speed class, e.g. `Host node-03(slow)`.
    pub host: String,
    pub hardware: HardwareInfo,
}

/// The machine the simulator ran on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardwareInfo {
    /// `model name` from `/proc/cpuinfo`.
    pub cpu: String,
    pub cores: usize,
    /// `MemTotal`, rounded down to whole GiB.
    pub ram_gb: u64,
    pub os: String,
    pub arch: String,
}

/// A single simulator run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Case name, e.g. `graphrats/b/gu32400-ru32/n500/p12`.
    pub benchmark: String,
    /// Update mode flag (`r`, `b` or `s`).
    pub update_mode: String,
    /// Case parameters.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    #[serde(default)]
    pub parameters: HashMap<String, serde_json::Value>,
    pub metrics: BenchmarkMetrics,
}

/// Metrics collected from a run. Fields that don't apply are omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchmarkMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mrps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speedup: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GmeanEntry {
    pub update_mode: String,
    pub processes: u32,
    pub mrps: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeSummary {
    pub earned: u32,
    pub possible: f64,
    /// False when a failed case voided the score.
    pub ok: bool,
}
