//! Regression runs: test simulator output against the reference simulator.
//!
//! Reference outputs are expensive to produce and deterministic for a given
//! case (the seed is part of it), so they are cached on disk and generated
//! only when missing. Test outputs are regenerated on every run.

use std::fs::{self, File};
use std::io;
use std::path::PathBuf;

use log::{error, info};

use crate::case::{RegressionCase, Role};
use crate::command::regression_command;
use crate::compare::{Comparison, OutputComparator};
use crate::config::HarnessConfig;
use crate::error::{HarnessError, Result};
use crate::exec::{run_timed, OutputSink};

use crate::case::GraphType::{Targeted as T, Uniform as GU};
use crate::case::RatType::{Distributed as D, Uniform as RU};
use crate::case::UpdateMode::{Batch as B, RatOrder as R, Synchronous as S};

/// Cases run on every invocation.
pub const REGRESSION_LIST: [RegressionCase; 12] = [
    RegressionCase::new(4, GU, RU, 1, 10, R, 15),
    RegressionCase::new(4, GU, RU, 1, 11, B, 16),
    RegressionCase::new(4, GU, RU, 1, 12, S, 17),
    RegressionCase::new(400, GU, RU, 10, 10, R, 18),
    RegressionCase::new(400, GU, D, 10, 11, B, 19),
    RegressionCase::new(400, T, RU, 10, 10, R, 21),
    RegressionCase::new(400, T, D, 10, 11, B, 22),
    RegressionCase::new(3600, GU, RU, 10, 3, R, 24),
    RegressionCase::new(3600, GU, RU, 10, 6, S, 25),
    RegressionCase::new(3600, GU, D, 10, 4, B, 26),
    RegressionCase::new(3600, T, RU, 10, 4, B, 27),
    RegressionCase::new(3600, T, D, 10, 6, S, 28),
];

/// Large-graph cases, run only on request.
pub const EXTRA_REGRESSION_LIST: [RegressionCase; 2] = [
    RegressionCase::new(32400, GU, RU, 32, 2, B, 29),
    RegressionCase::new(32400, T, D, 32, 2, S, 30),
];

pub fn regression_list(include_extra: bool) -> Vec<RegressionCase> {
    let mut list = REGRESSION_LIST.to_vec();
    if include_extra {
        list.extend_from_slice(&EXTRA_REGRESSION_LIST);
    }
    list
}

#[derive(Debug, Clone)]
pub struct RegressionOptions {
    /// Processes for the test simulator; more than one runs it under MPI.
    pub processes: u32,
    /// Discard every cached reference output before running.
    pub clear_cache: bool,
    pub include_extra: bool,
    pub extra_args: Vec<String>,
}

impl Default for RegressionOptions {
    fn default() -> Self {
        Self {
            processes: 1,
            clear_cache: false,
            include_extra: false,
            extra_args: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct CaseOutcome {
    pub case: RegressionCase,
    pub result: Result<Comparison>,
}

impl CaseOutcome {
    pub fn passed(&self) -> bool {
        matches!(&self.result, Ok(c) if c.is_match())
    }
}

#[derive(Debug, Default)]
pub struct RegressionSummary {
    pub outcomes: Vec<CaseOutcome>,
}

impl RegressionSummary {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    pub fn success(&self) -> bool {
        self.passed() == self.total()
    }

    pub fn verdict(&self) -> String {
        format!(
            "Regression set size {}.  {}/{} tests successful. {}",
            self.total(),
            self.passed(),
            self.total(),
            if self.success() { "SUCCESS" } else { "FAILED" }
        )
    }
}

pub struct Regression<'a> {
    config: &'a HarnessConfig,
    options: &'a RegressionOptions,
    comparator: OutputComparator,
}

impl<'a> Regression<'a> {
    pub fn new(config: &'a HarnessConfig, options: &'a RegressionOptions) -> Self {
        Self {
            config,
            options,
            comparator: OutputComparator::default(),
        }
    }

    pub fn output_path(&self, case: &RegressionCase, role: Role) -> PathBuf {
        self.config.cache_dir.join(case.file_name(role))
    }

    /// Create the cache directory, emptying it first if asked to.
    pub fn prepare_cache(&self) -> Result<()> {
        let dir = &self.config.cache_dir;
        if self.options.clear_cache {
            match fs::remove_dir_all(dir) {
                Ok(()) => info!("Flushed result cache {}", dir.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => error!("Could not flush old result cache: {}", e),
            }
        }
        fs::create_dir_all(dir).map_err(|e| HarnessError::file(dir, e))
    }

    /// Path of the reference output, generating it if it is not cached.
    ///
    /// The output goes to a temporary file that only replaces the cache entry
    /// once the reference simulator has succeeded.
    pub fn ensure_reference(&self, case: &RegressionCase) -> Result<PathBuf> {
        let path = self.output_path(case, Role::Reference);
        if path.exists() {
            return Ok(path);
        }
        let cmd = regression_command(self.config, case, Role::Reference, 1, &[]);
        info!("Executing {} > {}", cmd, case.file_name(Role::Reference));

        let tmp = tempfile::Builder::new()
            .prefix(".ref-")
            .tempfile_in(&self.config.cache_dir)
            .map_err(|e| HarnessError::file(&self.config.cache_dir, e))?;
        let stdout = tmp.as_file().try_clone()?;
        run_timed(&cmd, OutputSink::File(stdout))?;
        tmp.persist(&path)
            .map_err(|e| HarnessError::file(&path, e.error))?;
        Ok(path)
    }

    /// Run the simulator under test, overwriting any earlier test output.
    pub fn run_test(&self, case: &RegressionCase) -> Result<PathBuf> {
        let path = self.output_path(case, Role::Test);
        let cmd = regression_command(
            self.config,
            case,
            Role::Test,
            self.options.processes,
            &self.options.extra_args,
        );
        info!("Executing {} > {}", cmd, case.file_name(Role::Test));
        let file = File::create(&path).map_err(|e| HarnessError::file(&path, e))?;
        run_timed(&cmd, OutputSink::File(file))?;
        Ok(path)
    }

    /// Produce both outputs for `case` and compare them.
    pub fn check(&self, case: &RegressionCase) -> Result<Comparison> {
        let reference = self.ensure_reference(case)?;
        let test = self.run_test(case)?;
        self.comparator.compare_files(&reference, &test)
    }

    /// Check every case in order; a failing case never stops the list.
    pub fn run(&self, cases: &[RegressionCase]) -> Result<RegressionSummary> {
        self.prepare_cache()?;
        let mut summary = RegressionSummary::default();
        for case in cases {
            let result = self.check(case);
            match &result {
                Ok(c) if c.is_match() => {
                    info!("Regression {} passed", case.file_name(Role::Test))
                }
                Ok(c) => match c.reported.first() {
                    Some(first) => error!(
                        "Regression {} failed with {} mismatches, first at {}",
                        case.file_name(Role::Test),
                        c.mismatches,
                        first
                    ),
                    None => error!(
                        "Regression {} failed with {} mismatches",
                        case.file_name(Role::Test),
                        c.mismatches
                    ),
                },
                Err(e) => error!("Regression {} failed: {}", case.file_name(Role::Test), e),
            }
            summary.outcomes.push(CaseOutcome { case: *case, result });
        }
        Ok(summary)
    }
}
