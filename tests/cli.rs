//! End-to-end runs of the command-line tools.

mod common;

use std::fs;
use std::process::Command;

use serial_test::serial;

use common::FakeSimulators;

fn benchmark() -> Command {
    Command::new(env!("CARGO_BIN_EXE_benchmark"))
}

fn regress() -> Command {
    Command::new(env!("CARGO_BIN_EXE_regress"))
}

#[test]
#[serial]
fn benchmark_help_exits_cleanly() {
    let output = benchmark().arg("-h").output().unwrap();
    assert!(output.status.success());
    let help = String::from_utf8_lossy(&output.stdout);
    assert!(help.contains("--process-limit"));
    assert!(help.contains("--update"));
}

#[test]
#[serial]
fn benchmark_rejects_bad_affinity() {
    let output = benchmark().args(["-a", "q"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid MPI flag specifier"));
}

#[test]
#[serial]
fn benchmark_rejects_bad_update_mode() {
    let output = benchmark().args(["-u", "b:z"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid update mode 'z'"));
}

#[test]
#[serial]
fn benchmark_grades_single_process_batch_run() {
    let sims = FakeSimulators::new();
    let config = sims.write_config();
    let output = benchmark()
        .args(["-p", "1", "-u", "b", "--json", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("+++\tGmean"));
    assert!(stdout.contains("Total test time = "));
    assert!(stdout.contains("MRPS Scores"));
    assert!(stdout.contains("Parallel = 1, Mode = batch"));
    // Stand-in simulators finish instantly, so throughput is far above target.
    assert!(stdout.contains("TOTAL = 17/17"), "{}", stdout);

    let records: Vec<_> = fs::read_dir(&sims.config.results_dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(records.len(), 1);
    let name = records[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("graphrats-") && name.ends_with(".json"), "{}", name);

    let compared = Command::new(env!("CARGO_BIN_EXE_bench-compare"))
        .arg(&records[0])
        .arg(&records[0])
        .output()
        .unwrap();
    assert!(compared.status.success());
    let table = String::from_utf8_lossy(&compared.stdout);
    assert!(table.contains("graphrats/b/gu32400-ru32/n500/p1"));
    assert!(table.contains("(~same)"));
    assert!(table.contains("Compared: 4 | Baseline only: 0 | Candidate only: 0"));
}

#[test]
#[serial]
fn benchmark_mirrors_report_to_outfile() {
    let sims = FakeSimulators::new();
    let config = sims.write_config();
    // Relative template: every X in the path is replaced, directories included.
    let output = benchmark()
        .current_dir(sims.root())
        .args(["-p", "1", "-u", "s", "-s", "1000", "-f", "bench-XXX.txt", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success());

    let mirrors: Vec<_> = fs::read_dir(sims.root())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with("bench-") && n.ends_with(".txt"))
        .collect();
    assert_eq!(mirrors.len(), 1);
    assert!(!mirrors[0].contains('X'));

    let mirrored = fs::read_to_string(sims.root().join(&mirrors[0])).unwrap();
    assert!(mirrored.starts_with(&format!("Writing to file '{}'\n", mirrors[0])));
    assert!(mirrored.contains("Running on "));
    assert!(mirrored.contains("TOTAL = "));
    assert!(String::from_utf8_lossy(&output.stdout).contains(&mirrored));
}

#[test]
#[serial]
fn unwritable_outfile_falls_back_to_stdout() {
    let sims = FakeSimulators::new();
    let config = sims.write_config();
    let output = benchmark()
        .current_dir(sims.root())
        .args(["-p", "1", "-u", "s", "-s", "1000", "-f", "missing/bench.txt", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Couldn't open file 'missing/bench.txt'\n"), "{}", stdout);
    assert!(stdout.contains("TOTAL = "));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Couldn't open file"));
    assert!(!sims.root().join("missing").exists());
}

#[test]
#[serial]
fn failing_benchmark_case_voids_score() {
    let sims = FakeSimulators::new();
    sims.set_simulator("exit 1");
    let config = sims.write_config();
    let output = benchmark()
        .args(["-p", "1", "-u", "b", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    // A failing case is reported, not fatal.
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ERROR: One or more tests failed.  No credit given"));
    assert!(stdout.contains("TOTAL = 0/0"));
}

#[test]
#[serial]
fn regress_reports_success() {
    let sims = FakeSimulators::new();
    let config = sims.write_config();
    let output = regress().arg("--config").arg(&config).output().unwrap();

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Regression set size 12.  12/12 tests successful. SUCCESS"));
}

#[test]
#[serial]
fn regress_exits_nonzero_on_failure() {
    let sims = FakeSimulators::new();
    let config = sims.write_config();
    let output = regress()
        .arg("--config")
        .arg(&config)
        .args(["--", "-x"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("0/12 tests successful. FAILED"));
}
