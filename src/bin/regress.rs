//! GraphRats simulator regression test.
//!
//! Compares the output of the simulator under test with cached output of the
//! reference simulator for a fixed list of cases.
//!
//! Usage: `regress [-c] [-p PROCESSES] [-a] [-- SIMFLAGS...]`

use std::path::PathBuf;

use clap::Parser;
use log::error;

use graphrats_harness::config::HarnessConfig;
use graphrats_harness::regress::{regression_list, Regression, RegressionOptions};
use graphrats_harness::Result;

/// Command-line arguments.
#[derive(Parser)]
#[command(name = "regress")]
#[command(about = "Check GraphRats simulator output against the reference simulator")]
struct Cli {
    /// Clear the expected-result cache before running
    #[arg(short, long)]
    clear: bool,

    /// Number of MPI processes. If > 1, runs crun-mpi, else crun
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    processes: u32,

    /// Run all tests, including those on big graphs
    #[arg(short, long)]
    all: bool,

    /// TOML file overriding simulator and data locations
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extra arguments passed to the simulator under test
    #[arg(last = true)]
    sim_args: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    let config = HarnessConfig::load(cli.config.as_deref())?;
    let options = RegressionOptions {
        processes: cli.processes,
        clear_cache: cli.clear,
        include_extra: cli.all,
        extra_args: cli.sim_args,
    };

    let cases = regression_list(options.include_extra);
    let summary = Regression::new(&config, &options).run(&cases)?;
    eprintln!("{}", summary.verdict());
    Ok(summary.success())
}
