//! Benchmark and regression harness for the GraphRats simulator.
//!
//! The simulator itself (`crun`, `crun-mpi`, the `grun.py` reference) is an
//! external program. This crate builds its command lines, times it, checks its
//! output against recorded snapshots and grades the measured throughput.

pub mod accumulator;
pub mod case;
pub mod command;
pub mod compare;
pub mod config;
pub mod error;
pub mod exec;
pub mod grade;
pub mod host;
pub mod output;
pub mod recorder;
pub mod regress;
pub mod schema;
pub mod sweep;

pub use error::{HarnessError, Result};
