//! GraphRats benchmark runner.
//!
//! Sweeps the simulator over the fixed benchmark list, reports MRPS for every
//! run and grades the geometric means against the performance targets.
//!
//! Usage: `benchmark [-a x|o|n] [-s SCALE] [-u UPDATELIST] [-f OUTFILE] [-p PROCESSLIMIT] [-c] [-- SIMFLAGS...]`

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;
use log::{error, warn};

use graphrats_harness::case::UpdateList;
use graphrats_harness::command::Affinity;
use graphrats_harness::config::HarnessConfig;
use graphrats_harness::grade::GradeTargets;
use graphrats_harness::host::HostInfo;
use graphrats_harness::output::{generate_file_name, Tee};
use graphrats_harness::recorder::ResultRecorder;
use graphrats_harness::sweep::{Benchmark, SweepOptions};
use graphrats_harness::Result;

/// Command-line arguments.
#[derive(Parser)]
#[command(name = "benchmark")]
#[command(about = "Measure and grade GraphRats simulator throughput")]
struct Cli {
    /// Processor affinity for MPI runs: x=none, o=old flags, n=new flags
    #[arg(short, long, default_value = "x")]
    affinity: Affinity,

    /// Reduce the number of steps in each benchmark by this factor
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    scale: u32,

    /// Update modes, colon-separated: r=rat order, s=synchronous, b=batch
    #[arg(short, long, default_value = "b:s")]
    update: UpdateList,

    /// Also write the report to this file; each X becomes a random digit.
    /// If it cannot be created the report goes to stdout only
    #[arg(short = 'f', long)]
    outfile: Option<String>,

    /// Upper limit on MPI processes. With 1, only crun is run
    #[arg(short, long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(1..))]
    process_limit: u32,

    /// Check simulator output against recorded capture files
    #[arg(short, long)]
    check: bool,

    /// Save a JSON result record to the results directory
    #[arg(long)]
    json: bool,

    /// TOML file overriding simulator and data locations
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extra arguments passed to every simulator run
    #[arg(last = true)]
    sim_args: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run(cli) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = HarnessConfig::load(cli.config.as_deref())?;

    let mut out = match &cli.outfile {
        Some(template) => {
            let name = generate_file_name(template, &mut rand::thread_rng());
            match Tee::with_mirror(Path::new(&name)) {
                Ok(mut tee) => {
                    writeln!(tee, "Writing to file '{}'", name)?;
                    tee
                }
                Err(e) => {
                    warn!("{e}");
                    let mut tee = Tee::stdout();
                    writeln!(tee, "Couldn't open file '{}'", name)?;
                    tee
                }
            }
        }
        None => Tee::stdout(),
    };

    let host = HostInfo::detect(&config.hosts);
    writeln!(out, "{}", host.status_line())?;
    let options = SweepOptions {
        modes: cli.update.0,
        process_limit: cli.process_limit,
        scale: cli.scale,
        affinity: cli.affinity,
        check: cli.check,
        extra_args: cli.sim_args,
    };

    let start = Instant::now();
    let state = Benchmark::new(&config, &options).run(&mut out)?;
    writeln!(out, "Total test time = {:.2} secs.", start.elapsed().as_secs_f64())?;

    let host_info = host.to_string();
    let report = GradeTargets::default().grade(&state.gmeans, state.ok(), Some(&host_info));
    write!(out, "{}", report)?;
    out.flush()?;

    if cli.json {
        let mut recorder = ResultRecorder::new("graphrats", &host);
        for m in &state.measurements {
            recorder.record_measurement(m);
        }
        recorder.record_gmeans(&state.gmeans);
        recorder.record_grade(&report);
        recorder.save(&config.results_dir)?;
    }

    Ok(())
}
