//! Benchmark comparison tool.
//!
//! Compares two JSON result records written by `benchmark --json` and prints a
//! table of MRPS deltas per case, followed by the geometric means.
//!
//! Usage: `bench-compare <baseline.json> <candidate.json>`

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use clap::Parser;
use log::error;

use graphrats_harness::schema::{BenchmarkReport, BenchmarkResult};
use graphrats_harness::{HarnessError, Result};

/// Command-line arguments.
#[derive(Parser)]
#[command(name = "bench-compare")]
#[command(about = "Compare MRPS between two GraphRats result records")]
struct Cli {
    baseline: PathBuf,
    candidate: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run(&cli) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let baseline = load_report(&cli.baseline)?;
    let candidate = load_report(&cli.candidate)?;

    let base_map: HashMap<&str, &BenchmarkResult> = baseline
        .results
        .iter()
        .map(|r| (r.benchmark.as_str(), r))
        .collect();

    let cand_map: HashMap<&str, &BenchmarkResult> = candidate
        .results
        .iter()
        .map(|r| (r.benchmark.as_str(), r))
        .collect();

    eprintln!("Baseline: {} ({})", cli.baseline.display(), baseline.metadata.timestamp);
    eprintln!("Candidate: {} ({})", cli.candidate.display(), candidate.metadata.timestamp);
    eprintln!();

    println!(
        "{:<40} | {:>10} | {:>10} | {:>12}",
        "Benchmark", "Base MRPS", "New MRPS", "Delta"
    );
    println!("{}", "-".repeat(80));

    let mut matched = 0u32;
    let mut only_cand = 0u32;

    for cand in &candidate.results {
        match base_map.get(cand.benchmark.as_str()) {
            Some(base) => {
                matched += 1;
                if let (Some(b), Some(c)) = (base.metrics.mrps, cand.metrics.mrps) {
                    println!("{}", comparison_row(&cand.benchmark, b, c));
                }
            }
            None => only_cand += 1,
        }
    }

    let only_base = baseline
        .results
        .iter()
        .filter(|base| !cand_map.contains_key(base.benchmark.as_str()))
        .count();

    for gmean in &candidate.gmeans {
        let base = baseline
            .gmeans
            .iter()
            .find(|g| g.update_mode == gmean.update_mode && g.processes == gmean.processes);
        if let Some(base) = base {
            let name = format!("gmean/{}/p{}", gmean.update_mode, gmean.processes);
            println!("{}", comparison_row(&name, base.mrps, gmean.mrps));
        }
    }

    println!("{}", "-".repeat(80));
    println!(
        "Compared: {} | Baseline only: {} | Candidate only: {}",
        matched, only_base, only_cand
    );
    Ok(())
}

fn load_report(path: &Path) -> Result<BenchmarkReport> {
    let contents = std::fs::read_to_string(path).map_err(|e| HarnessError::File {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(serde_json::from_str(&contents)?)
}

/// One table row. Higher MRPS is better.
fn comparison_row(name: &str, base: f64, cand: f64) -> String {
    let delta_pct = if base > 0.0 {
        ((cand - base) / base) * 100.0
    } else {
        0.0
    };

    let hint = if delta_pct > 1.0 {
        "faster"
    } else if delta_pct < -1.0 {
        "slower"
    } else {
        "~same"
    };

    format!(
        "{:<40} | {:>10.2} | {:>10.2} | {:>+.1}% ({})",
        name, base, cand, delta_pct, hint
    )
}
