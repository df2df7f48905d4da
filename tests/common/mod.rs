//! Shared test utilities: stand-in simulator programs.
//!
//! Each fixture writes small shell scripts into a temporary directory and
//! points a [`HarnessConfig`] at them. Every script appends its name and
//! arguments to a log file, so tests can see exactly what was launched.
//!
//! Unless told otherwise, the simulators print each argument on its own
//! line and stay silent when the first argument is `-q`. They print with
//! `printf` because a shell `echo` may swallow `-n`. The reference simulator
//! stops printing at `-m`, so with no extra flags its output matches the
//! simulator under test.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use graphrats_harness::config::HarnessConfig;
use tempfile::TempDir;

pub const ECHO_ARGS: &str = r#"[ "$1" = "-q" ] && exit 0
for a in "$@"; do printf '%s\n' "$a"; done"#;

pub const REFERENCE_ECHO: &str = r#"for a in "$@"; do
  [ "$a" = "-m" ] && break
  printf '%s\n' "$a"
done"#;

/// Skip launcher flags up to `-np N`, then run the rest.
pub const LAUNCHER: &str = r#"while [ "$#" -gt 0 ] && [ "$1" != "-np" ]; do shift; done
shift 2
exec "$@""#;

pub struct FakeSimulators {
    pub dir: TempDir,
    pub config: HarnessConfig,
    log: PathBuf,
}

impl FakeSimulators {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = dir.path().to_path_buf();
        let log = root.join("invocations.log");

        let config = HarnessConfig {
            simulator: root.join("crun"),
            mpi_simulator: root.join("crun-mpi"),
            reference_simulator: root.join("grun.py"),
            mpi_launcher: vec![root.join("mpirun").display().to_string()],
            data_dir: root.join("data"),
            cache_dir: root.join("cache"),
            capture_dir: root.join("capture"),
            results_dir: root.join("results"),
            ..HarnessConfig::default()
        };

        let sims = Self { dir, config, log };
        sims.set_simulator(ECHO_ARGS);
        sims.set_mpi_simulator(ECHO_ARGS);
        sims.set_reference(REFERENCE_ECHO);
        sims.write_script("mpirun", LAUNCHER);
        sims
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn set_simulator(&self, body: &str) {
        self.write_script("crun", body);
    }

    pub fn set_mpi_simulator(&self, body: &str) {
        self.write_script("crun-mpi", body);
    }

    pub fn set_reference(&self, body: &str) {
        self.write_script("grun.py", body);
    }

    /// Write an executable script that logs its invocation before `body`.
    pub fn write_script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.root().join(name);
        let script = format!(
            "#!/bin/sh\necho \"{} $*\" >> '{}'\n{}\n",
            name,
            self.log.display(),
            body
        );
        fs::write(&path, script).expect("failed to write script");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .expect("failed to chmod script");
        path
    }

    /// Logged invocations, oldest first, as `<script> <args...>`.
    pub fn invocations(&self) -> Vec<String> {
        match fs::read_to_string(&self.log) {
            Ok(text) => text.lines().map(str::to_string).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Number of logged invocations of `script`.
    pub fn count(&self, script: &str) -> usize {
        let prefix = format!("{} ", script);
        self.invocations()
            .iter()
            .filter(|line| line.starts_with(&prefix))
            .count()
    }

    /// Save the config as TOML for the command-line binaries.
    pub fn write_config(&self) -> PathBuf {
        let path = self.root().join("graphrats.toml");
        let text = toml::to_string(&self.config).expect("failed to serialize config");
        fs::write(&path, text).expect("failed to write config");
        path
    }
}
