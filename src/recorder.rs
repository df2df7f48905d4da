//! Result recorder for saving benchmark results to JSON files.
//!
//! Creates JSON files in the configured results directory following the
//! types in [`crate::schema`].

use crate::accumulator::GeometricMeanTable;
use crate::grade::GradeReport;
use crate::host::HostInfo;
use crate::schema::*;
use crate::sweep::MeasurementResult;

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Accumulates benchmark results and writes them to a JSON file.
pub struct ResultRecorder {
    category: String,
    metadata: RunMetadata,
    results: Vec<BenchmarkResult>,
    gmeans: Vec<GmeanEntry>,
    grade: Option<GradeSummary>,
}

impl ResultRecorder {
    /// Create a new recorder for the given category.
    ///
    /// Captures metadata (hardware, git, timestamp) at construction time.
    pub fn new(category: &str, host: &HostInfo) -> Self {
        Self {
            category: category.to_string(),
            metadata: RunMetadata {
                timestamp: iso8601_now(),
                git_commit: git(&["rev-parse", "--short", "HEAD"]),
                git_branch: git(&["rev-parse", "--abbrev-ref", "HEAD"]),
                git_dirty: git(&["status", "--porcelain"]).map(|s| !s.is_empty()),
                harness_version: env!("CARGO_PKG_VERSION").to_string(),
                host: host.to_string(),
                hardware: capture_hardware(),
            },
            results: Vec::new(),
            gmeans: Vec::new(),
            grade: None,
        }
    }

    /// Record one simulator run.
    pub fn record_measurement(&mut self, m: &MeasurementResult) {
        let c = &m.case;
        let mut parameters = HashMap::new();
        parameters.insert("graph_size".into(), serde_json::json!(c.graph_size));
        parameters.insert("graph_type".into(), serde_json::json!(c.graph_type));
        parameters.insert("rat_type".into(), serde_json::json!(c.rat_type));
        parameters.insert("load_factor".into(), serde_json::json!(c.load_factor));
        parameters.insert("step_count".into(), serde_json::json!(c.step_count));

        self.results.push(BenchmarkResult {
            benchmark: c.name(),
            update_mode: c.update_mode.to_string(),
            parameters,
            metrics: BenchmarkMetrics {
                mrps: Some(m.mrps),
                elapsed_secs: Some(m.elapsed_secs),
                speedup: m.speedup,
                processes: Some(c.process_count),
                verification: serde_json::to_value(m.verification).ok(),
            },
        });
    }

    pub fn record_gmeans(&mut self, table: &GeometricMeanTable) {
        self.gmeans = table
            .iter()
            .map(|(key, &mrps)| GmeanEntry {
                update_mode: key.mode.to_string(),
                processes: key.processes,
                mrps,
            })
            .collect();
    }

    pub fn record_grade(&mut self, report: &GradeReport) {
        self.grade = Some(GradeSummary {
            earned: report.earned(),
            possible: report.possible,
            ok: report.ok,
        });
    }

    pub fn report(&self) -> BenchmarkReport {
        BenchmarkReport {
            schema_version: 1,
            metadata: self.metadata.clone(),
            results: self.results.clone(),
            gmeans: self.gmeans.clone(),
            grade: self.grade.clone(),
        }
    }

    /// Write all accumulated results to a JSON file in `results_dir`.
    ///
    /// File naming: `<category>-<timestamp>-<commit>.json`
    pub fn save(self, results_dir: &Path) -> io::Result<PathBuf> {
        let report = self.report();

        let commit = self
            .metadata
            .git_commit
            .as_deref()
            .unwrap_or("unknown");
        // Colons are not portable in file names.
        let ts = self.metadata.timestamp.replace(':', "-");
        let filename = format!("{}-{}-{}.json", self.category, ts, commit);

        std::fs::create_dir_all(results_dir)?;
        let path = results_dir.join(&filename);

        let json = serde_json::to_string_pretty(&report).map_err(io::Error::other)?;
        std::fs::write(&path, json)?;

        log::info!("Results saved to {}", path.display());
        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// Metadata capture helpers
// ---------------------------------------------------------------------------

fn iso8601_now() -> String {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    format_utc(now.as_secs())
}

fn format_utc(secs: u64) -> String {
    let days = secs / 86400;
    let time_of_day = secs % 86400;
    let hours = time_of_day / 3600;
    let minutes = (time_of_day % 3600) / 60;
    let seconds = time_of_day % 60;

    let (year, month, day) = days_to_ymd(days);

    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        year, month, day, hours, minutes, seconds
    )
}

fn days_to_ymd(mut days: u64) -> (u64, u64, u64) {
    // Howard Hinnant's civil_from_days
    days += 719468;
    let era = days / 146097;
    let doe = days - era * 146097;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y, m, d)
}

/// Trimmed stdout of a successful `git` invocation.
fn git(args: &[&str]) -> Option<String> {
    let out = std::process::Command::new("git").args(args).output().ok()?;
    out.status
        .success()
        .then(|| String::from_utf8_lossy(&out.stdout).trim().to_string())
}

/// Value of the first `key: value` line for `key` in a `/proc` text file.
fn proc_field(path: &str, key: &str) -> Option<String> {
    let text = std::fs::read_to_string(path).ok()?;
    text.lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(k, _)| k.trim() == key)
        .map(|(_, v)| v.trim().to_string())
}

fn capture_hardware() -> HardwareInfo {
    HardwareInfo {
        cpu: proc_field("/proc/cpuinfo", "model name").unwrap_or_else(|| "unknown".to_string()),
        cores: std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(0),
        ram_gb: proc_field("/proc/meminfo", "MemTotal")
            .and_then(|v| v.split_whitespace().next()?.parse::<u64>().ok())
            .map(|kb| kb / (1024 * 1024))
            .unwrap_or(0),
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulator::ModeKey;
    use crate::case::{BenchmarkCase, UpdateMode};
    use crate::host::HostClass;
    use crate::sweep::{Verification, BENCHMARK_LIST};

    fn host() -> HostInfo {
        HostInfo {
            name: "node".to_string(),
            class: HostClass::Normal,
        }
    }

    #[test]
    fn utc_formatting() {
        assert_eq!(format_utc(0), "1970-01-01T00:00:00Z");
        assert_eq!(format_utc(951_782_400), "2000-02-29T00:00:00Z");
        assert_eq!(format_utc(1_700_000_000), "2023-11-14T22:13:20Z");
    }

    #[test]
    fn save_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = ResultRecorder::new("graphrats", &host());
        recorder.record_measurement(&MeasurementResult {
            case: BenchmarkCase::new(BENCHMARK_LIST[0], 500, UpdateMode::Batch, 1),
            elapsed_secs: 2.0,
            mrps: 259.2,
            speedup: None,
            verification: Verification::Matched,
        });
        let table: GeometricMeanTable = [(ModeKey::new(UpdateMode::Batch, 1), 259.2)].into_iter().collect();
        recorder.record_gmeans(&table);

        let path = recorder.save(dir.path()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let report: BenchmarkReport = serde_json::from_str(&text).unwrap();

        assert_eq!(report.schema_version, 1);
        assert_eq!(report.metadata.host, "Host node(normal)");
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].benchmark, "graphrats/b/gu32400-ru32/n500/p1");
        assert_eq!(report.results[0].metrics.mrps, Some(259.2));
        assert_eq!(
            report.results[0].metrics.verification,
            Some(serde_json::json!({ "status": "matched" }))
        );
        assert_eq!(report.gmeans[0].update_mode, "b");
        assert!(report.grade.is_none());
    }
}
