//! Harness overhead: output comparison and grading.
//!
//! Check mode compares simulator output while the run is being timed, so the
//! comparator has to keep up with the simulator's print rate.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use graphrats_harness::accumulator::{GeometricMeanTable, ModeKey};
use graphrats_harness::case::UpdateMode;
use graphrats_harness::compare::{Labeled, OutputComparator};
use graphrats_harness::grade::GradeTargets;

/// Simulator-style state dump: one header line per step, then one count per node.
fn state_dump(nodes: usize, steps: usize) -> String {
    let mut out = String::new();
    for step in 0..steps {
        out.push_str(&format!("STEP {} {}\n", nodes, step));
        for node in 0..nodes {
            out.push_str(&format!("{}\n", (node * 31 + step) % 97));
        }
        out.push_str("END\n");
    }
    out
}

fn compare_identical(c: &mut Criterion) {
    let text = state_dump(3600, 10);
    let comparator = OutputComparator::default();

    let mut group = c.benchmark_group("compare");
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("identical", |b| {
        b.iter(|| {
            let result = comparator
                .compare(
                    Labeled::new("ref", text.as_bytes()),
                    Labeled::new("tst", black_box(text.as_bytes())),
                )
                .unwrap();
            assert!(result.is_match());
        });
    });

    let altered = text.replacen("\n5\n", "\n6\n", 50);
    group.bench_function("scattered_mismatches", |b| {
        b.iter(|| {
            comparator
                .compare(
                    Labeled::new("ref", text.as_bytes()),
                    Labeled::new("tst", black_box(altered.as_bytes())),
                )
                .unwrap()
        });
    });
    group.finish();
}

fn grade_report(c: &mut Criterion) {
    let targets = GradeTargets::default();
    let gmeans: GeometricMeanTable = [
        (ModeKey::new(UpdateMode::Batch, 1), 24.0),
        (ModeKey::new(UpdateMode::Batch, 12), 80.0),
        (ModeKey::new(UpdateMode::Synchronous, 1), 33.0),
        (ModeKey::new(UpdateMode::Synchronous, 12), 100.0),
    ]
    .into_iter()
    .collect();

    c.bench_function("grade_and_render", |b| {
        b.iter(|| {
            let report = targets.grade(black_box(&gmeans), true, Some("Host bench(normal)"));
            report.to_string()
        });
    });
}

criterion_group!(benches, compare_identical, grade_report);
criterion_main!(benches);
