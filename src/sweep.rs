//! Benchmark sweep: every workload, for every run configuration of every
//! requested update mode.
//!
//! Results are written as tab-separated lines prefixed with [`MARKER`] so
//! they can be filtered out of the rest of the output with `grep`.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

use log::{info, warn};
use serde::Serialize;

use crate::accumulator::{GeometricMeanTable, GmeanAccumulator, ModeKey, ResultCache};
use crate::case::{BenchmarkCase, GraphType, RatType, UpdateList, UpdateMode, Workload};
use crate::command::{benchmark_command, Affinity, RunFlags};
use crate::compare::{Labeled, OutputComparator};
use crate::config::HarnessConfig;
use crate::error::{HarnessError, Result};
use crate::exec::{run_checked, run_timed, OutputSink};

pub const MARKER: &str = "+++\t";
const NO_MARKER: &str = "\t";

/// Graph/rat combinations measured by every run configuration.
pub const BENCHMARK_LIST: [Workload; 4] = [
    Workload::new(32400, GraphType::Uniform, RatType::Uniform, 32),
    Workload::new(32400, GraphType::Targeted, RatType::Uniform, 32),
    Workload::new(32400, GraphType::Uniform, RatType::Distributed, 32),
    Workload::new(32400, GraphType::Targeted, RatType::Distributed, 32),
];

/// Process count and step count of one pass over [`BENCHMARK_LIST`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    pub processes: u32,
    pub steps: u32,
}

const SYNCH_RUN_LIST: [RunConfig; 2] = [
    RunConfig { processes: 1, steps: 1000 },
    RunConfig { processes: 12, steps: 1000 },
];

const OTHER_RUN_LIST: [RunConfig; 2] = [
    RunConfig { processes: 1, steps: 500 },
    RunConfig { processes: 12, steps: 500 },
];

pub fn run_list(mode: UpdateMode) -> &'static [RunConfig] {
    match mode {
        UpdateMode::Synchronous => &SYNCH_RUN_LIST,
        UpdateMode::Batch | UpdateMode::RatOrder => &OTHER_RUN_LIST,
    }
}

/// Apply the process ceiling and step scale to a run configuration.
///
/// Returns `None` for a multi-process run when only one process is allowed:
/// running it single-process would measure something else entirely.
pub fn plan_run(run: RunConfig, process_limit: u32, scale: u32) -> Option<RunConfig> {
    if run.processes > 1 && process_limit == 1 {
        return None;
    }
    Some(RunConfig {
        processes: run.processes.min(process_limit),
        steps: (run.steps / scale.max(1)).max(1),
    })
}

#[derive(Debug, Clone)]
pub struct SweepOptions {
    pub modes: Vec<UpdateMode>,
    pub process_limit: u32,
    pub scale: u32,
    pub affinity: Affinity,
    /// Compare simulator output against capture files while timing.
    pub check: bool,
    /// Appended to every simulator command line.
    pub extra_args: Vec<String>,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            modes: UpdateList::default().0,
            process_limit: 100,
            scale: 1,
            affinity: Affinity::None,
            check: false,
            extra_args: Vec::new(),
        }
    }
}

/// Result of checking a run against its capture file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "mismatches")]
pub enum Verification {
    Unchecked,
    /// Check mode was on but no capture file exists for this case.
    NoCapture,
    Matched,
    Mismatched(usize),
}

/// One successful simulator run.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementResult {
    pub case: BenchmarkCase,
    pub elapsed_secs: f64,
    pub mrps: f64,
    /// Ratio to the single-process run of the same fingerprint, if one ran.
    pub speedup: Option<f64>,
    pub verification: Verification,
}

impl MeasurementResult {
    /// Tab-separated report line, without the marker.
    pub fn line(&self) -> String {
        let c = &self.case;
        let mut line = format!(
            "{:5}\t{}\t{:4}\t{}\t{}\t{}\t{}\t{:.2}\t{:7.2}",
            c.graph_size,
            c.graph_type,
            c.load_factor,
            c.rat_type,
            c.step_count,
            c.update_mode,
            c.process_count,
            self.elapsed_secs,
            self.mrps
        );
        if let Some(speedup) = self.speedup {
            line.push_str(&format!("\t({:5.2}X)", speedup));
        }
        line
    }
}

/// Millions of rat position updates per second.
pub fn mrps(rat_updates: u64, elapsed_secs: f64) -> f64 {
    if elapsed_secs > 0.0 {
        1e-6 * rat_updates as f64 / elapsed_secs
    } else {
        0.0
    }
}

/// Everything a sweep accumulates, passed explicitly through each call.
#[derive(Debug, Default)]
pub struct SweepState {
    pub cache: ResultCache,
    pub gmeans: GeometricMeanTable,
    pub measurements: Vec<MeasurementResult>,
    pub failures: usize,
}

impl SweepState {
    pub fn ok(&self) -> bool {
        self.failures == 0
    }
}

pub struct Benchmark<'a> {
    config: &'a HarnessConfig,
    options: &'a SweepOptions,
    comparator: OutputComparator,
}

impl<'a> Benchmark<'a> {
    pub fn new(config: &'a HarnessConfig, options: &'a SweepOptions) -> Self {
        Self {
            config,
            options,
            comparator: OutputComparator::default(),
        }
    }

    /// Sweep every requested update mode, in order.
    pub fn run(&self, out: &mut dyn Write) -> io::Result<SweepState> {
        let mut state = SweepState::default();
        for &mode in &self.options.modes {
            self.sweep(mode, &mut state, out)?;
        }
        Ok(state)
    }

    /// Run every configuration of `mode` over the benchmark list.
    ///
    /// A failing case is reported and skipped; the remaining cases still run.
    pub fn sweep(&self, mode: UpdateMode, state: &mut SweepState, out: &mut dyn Write) -> io::Result<()> {
        for &run in run_list(mode) {
            let Some(run) = plan_run(run, self.options.process_limit, self.options.scale) else {
                info!(
                    "Skipping {}-process {} runs with process limit 1",
                    run.processes,
                    mode.label()
                );
                continue;
            };
            let mut gmean = GmeanAccumulator::default();

            writeln!(out, "\tNodes\tgtype\tlf\trtype\tsteps\tupdate\tprocs\tsecs\tMRPS")?;
            writeln!(out, "{}{}", NO_MARKER, "---------".repeat(8))?;
            for &workload in &BENCHMARK_LIST {
                let case = BenchmarkCase::new(workload, run.steps, mode, run.processes);
                match self.execute_case(&case, &mut gmean, &mut state.cache) {
                    Ok(measurement) => {
                        writeln!(out, "{}{}", MARKER, measurement.line())?;
                        if let Verification::Mismatched(n) = measurement.verification {
                            writeln!(
                                out,
                                "Output of {} differs from capture {} in {} lines",
                                case.name(),
                                case.capture_name(),
                                n
                            )?;
                            state.failures += 1;
                        }
                        state.measurements.push(measurement);
                    }
                    Err(e) => {
                        writeln!(out, "{}", e)?;
                        state.failures += 1;
                    }
                }
                out.flush()?;
            }

            if let Some(mean) = gmean.mean() {
                state.gmeans.insert(ModeKey::new(mode, run.processes), mean);
                writeln!(
                    out,
                    "{}Gmean\t\t\t\t\t{}\t{}\t\t{:7.2}",
                    MARKER, mode, run.processes, mean
                )?;
                writeln!(out, "{}{}", MARKER, "---------".repeat(8))?;
            }
        }
        Ok(())
    }

    fn capture_path(&self, case: &BenchmarkCase) -> PathBuf {
        self.config.capture_dir.join(case.capture_name())
    }

    /// Run one case and fold its throughput into `gmean` and `cache`.
    pub fn execute_case(
        &self,
        case: &BenchmarkCase,
        gmean: &mut GmeanAccumulator,
        cache: &mut ResultCache,
    ) -> Result<MeasurementResult> {
        let capture = if self.options.check {
            let path = self.capture_path(case);
            match File::open(&path) {
                Ok(file) => Some((path, file)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    warn!("No capture file {}; running {} unchecked", path.display(), case.name());
                    None
                }
                Err(e) => return Err(HarnessError::file(path, e)),
            }
        } else {
            None
        };

        let flags = RunFlags {
            affinity: self.options.affinity,
            capture: capture.is_some(),
            extra_args: &self.options.extra_args,
        };
        let cmd = benchmark_command(self.config, case, &flags);

        let (elapsed, verification) = match capture {
            Some((path, file)) => {
                let name = path.display().to_string();
                let (elapsed, comparison) = run_checked(
                    &cmd,
                    Labeled::new(&name, BufReader::new(file)),
                    &self.comparator,
                )?;
                let verification = if comparison.is_match() {
                    Verification::Matched
                } else {
                    Verification::Mismatched(comparison.mismatches)
                };
                (elapsed, verification)
            }
            None => {
                let verification = if self.options.check {
                    Verification::NoCapture
                } else {
                    Verification::Unchecked
                };
                (run_timed(&cmd, OutputSink::Inherit)?, verification)
            }
        };

        let elapsed_secs = elapsed.as_secs_f64();
        let mrps = mrps(case.rat_updates(), elapsed_secs);
        let fingerprint = case.fingerprint();
        let speedup = cache.speedup(&fingerprint, mrps);
        if mrps > 0.0 {
            gmean.add(mrps);
            if case.process_count == 1 {
                cache.insert(fingerprint, mrps);
            }
        }

        Ok(MeasurementResult {
            case: *case,
            elapsed_secs,
            mrps,
            speedup,
            verification,
        })
    }
}
