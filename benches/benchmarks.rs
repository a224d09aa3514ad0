//! Performance benchmarks for Taskboard.
//!
//! This module contains benchmarks for:
//! - Review patch scanning
//! - Diff summary parsing
//! - Threshold computation and reconciliation over large task sets
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use taskboard::complexity::{ComplexityThresholds, DiffSummary};
use taskboard::review::ReviewLedger;
use taskboard::sync::{Plan, Reconciler};
use taskboard::{Conclusions, InMemoryBoard, Task, TaskState};

// ============================================================================
// Mock Data Fixtures
// ============================================================================

mod fixtures {
    use super::*;

    const CONCLUSIONS: [&str; 3] = ["Accepted", "Rework", "accepted/rework"];

    /// A multi-file commit patch with `num_reviews` review files.
    pub fn generate_patch(num_reviews: usize) -> String {
        let mut patch = String::from("commit 0123456789abcdef\nAuthor: Test <test@example.com>\n\n    Reviews\n\n");
        for i in 0..num_reviews {
            let reviewer = format!("reviewer{}", i % 7);
            patch.push_str(&format!(
                "diff --git a/pm/reviews/task/review-{i}.md b/pm/reviews/task/review-{i}.md\n\
                 new file mode 100644\n\
                 --- /dev/null\n\
                 +++ b/pm/reviews/task/review-{i}.md\n\
                 @@ -0,0 +1,8 @@\n\
                 +RTOS Task Review\n\
                 +=======================\n\
                 +\n\
                 +Task name: task\n\
                 +Version reviewed: 0123456789abcdef\n\
                 +Reviewer: {reviewer} ({reviewer}@example.com)\n\
                 +Date: 2016-01-01\n\
                 +Conclusion: {}\n",
                CONCLUSIONS[i % CONCLUSIONS.len()]
            ));
        }
        patch
    }

    /// Tasks with a spread of complexities.
    pub fn generate_tasks(num_tasks: usize) -> Vec<Task> {
        (0..num_tasks)
            .map(|i| Task {
                name: format!("task-{i}"),
                on_review: i % 2 == 0,
                conclusions: Conclusions::new(),
                complexity: ((i * 37) % 500) as u64,
                state: TaskState::ALL[i % TaskState::ALL.len()],
                description: format!("# Task Name\n\ntask-{i}"),
                warnings: Vec::new(),
            })
            .collect()
    }

    /// An empty board with the standard lists and labels.
    pub fn board() -> InMemoryBoard {
        let lists: Vec<&str> = TaskState::ALL.iter().map(TaskState::list_name).collect();
        InMemoryBoard::with_layout(&lists, &["green", "yellow", "red"])
    }
}

// ============================================================================
// Review Scanning
// ============================================================================

fn bench_scan_patch(c: &mut Criterion) {
    let mut group = c.benchmark_group("review/scan_patch");

    for num_reviews in [1, 10, 100, 1000].iter() {
        let patch = fixtures::generate_patch(*num_reviews);

        group.throughput(Throughput::Bytes(patch.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(num_reviews), &patch, |b, patch| {
            b.iter(|| {
                let mut ledger = ReviewLedger::new();
                ledger.scan_patch(black_box(patch));
                black_box(ledger.finish())
            });
        });
    }

    group.finish();
}

// ============================================================================
// Diff Summaries
// ============================================================================

fn bench_parse_summary(c: &mut Criterion) {
    let mut group = c.benchmark_group("complexity/parse_stat");

    let summaries = [
        ("full", " 3 files changed, 10 insertions(+), 2 deletions(-)\n"),
        ("insertions", " 1 file changed, 1 insertion(+)\n"),
        ("deletions", " 12 files changed, 480 deletions(-)\n"),
        ("malformed", "not a summary\n"),
    ];

    for (name, summary) in summaries {
        group.bench_function(name, |b| b.iter(|| black_box(DiffSummary::parse_stat(black_box(summary)))));
    }

    let mut stat = String::new();
    for i in 0..500 {
        stat.push_str(&format!(" packages/file{i}.c | {} ++++--\n", i % 40));
    }
    stat.push_str(" 500 files changed, 6000 insertions(+), 2000 deletions(-)\n");
    group.bench_function("long_stat", |b| b.iter(|| black_box(DiffSummary::parse_stat(black_box(&stat)))));

    group.finish();
}

// ============================================================================
// Planning & Reconciliation
// ============================================================================

fn bench_thresholds(c: &mut Criterion) {
    let mut group = c.benchmark_group("complexity/thresholds");

    for num_tasks in [10, 100, 1000].iter() {
        let complexities: Vec<u64> = (0..*num_tasks).map(|i| ((i * 37) % 500) as u64).collect();

        group.throughput(Throughput::Elements(*num_tasks as u64));
        group.bench_with_input(BenchmarkId::from_parameter(num_tasks), &complexities, |b, values| {
            b.iter(|| black_box(ComplexityThresholds::compute(black_box(values))));
        });
    }

    group.finish();
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync/reconcile");

    for num_tasks in [10, 100, 500].iter() {
        let plan = Plan::from_tasks(fixtures::generate_tasks(*num_tasks));

        let mut populated = fixtures::board();
        Reconciler::new(&mut populated).unwrap().reconcile(&plan.cards).unwrap();

        group.throughput(Throughput::Elements(*num_tasks as u64));
        group.bench_with_input(BenchmarkId::new("empty_board", num_tasks), &plan, |b, plan| {
            b.iter(|| {
                let mut board = fixtures::board();
                black_box(Reconciler::new(&mut board).unwrap().reconcile(&plan.cards).unwrap())
            });
        });
        group.bench_with_input(BenchmarkId::new("up_to_date", num_tasks), &plan, |b, plan| {
            b.iter(|| {
                let mut board = populated.clone();
                black_box(Reconciler::new(&mut board).unwrap().reconcile(&plan.cards).unwrap())
            });
        });
    }

    group.finish();
}

criterion_group!(review_benches, bench_scan_patch,);

criterion_group!(complexity_benches, bench_parse_summary, bench_thresholds,);

criterion_group!(sync_benches, bench_reconcile,);

criterion_main!(review_benches, complexity_benches, sync_benches);
