//! Locations of the external simulator programs and data directories.
//!
//! Defaults match a checkout where the harness runs from the simulator's
//! build directory. Any field can be overridden from a TOML file:
//!
//! ```toml
//! simulator = "./crun"
//! mpi_launcher = ["mpirun", "--oversubscribe"]
//! data_dir = "/scratch/graphrats/data"
//!
//! [hosts]
//! "node-03" = "slow"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};
use crate::host::HostClass;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Single-process simulator under test.
    pub simulator: PathBuf,
    /// MPI build of the simulator, started through `mpi_launcher`.
    pub mpi_simulator: PathBuf,
    /// Gold-standard simulator used to produce regression references.
    pub reference_simulator: PathBuf,
    /// Launcher command prepended to multi-process runs.
    pub mpi_launcher: Vec<String>,
    /// Graph and rat input files.
    pub data_dir: PathBuf,
    /// Cached reference outputs and fresh test outputs for `regress`.
    pub cache_dir: PathBuf,
    /// Recorded simulator output used by benchmark correctness checks.
    pub capture_dir: PathBuf,
    /// Destination of JSON result records.
    pub results_dir: PathBuf,
    /// Known hosts and how fast they are, keyed by hostname.
    pub hosts: BTreeMap<String, HostClass>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            simulator: PathBuf::from("./crun"),
            mpi_simulator: PathBuf::from("./crun-mpi"),
            reference_simulator: PathBuf::from("./grun.py"),
            mpi_launcher: vec!["mpirun".to_string()],
            data_dir: PathBuf::from("./data"),
            cache_dir: PathBuf::from("./regression-cache"),
            capture_dir: PathBuf::from("./capture"),
            results_dir: PathBuf::from("results"),
            hosts: BTreeMap::new(),
        }
    }
}

impl HarnessConfig {
    /// Load a config file, or the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| HarnessError::file(path, e))?;
                Self::from_toml(&text).map_err(|source| HarnessError::Config {
                    path: path.to_path_buf(),
                    source,
                })
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}
