//! One synchronization pass from repository history to the board.
//!
//! A pass fetches the remote, derives every live task, buckets the tasks by
//! relative complexity and reconciles the board. A failing fetch turns the
//! pass into a successful no-op. Every successful fetch is followed by a full
//! reconciliation, so a pass that was cut short is completed by the next one.

pub mod reconcile;

use std::fmt;

use serde::Serialize;

pub use reconcile::{BoardLayout, Mutation, Reconciler};

use crate::board::{Board, BoardError};
use crate::complexity::{Bucket, ComplexityThresholds};
use crate::core::RepositoryConfig;
use crate::git::{GitError, HistoryReader};
use crate::task::{DescriptionTemplate, Task, TaskDeriver};

/// Error type for a synchronization pass.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A git query failed
    #[error(transparent)]
    Git(#[from] GitError),

    /// A board call failed
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Result type for synchronization.
pub type SyncResult<T> = Result<T, SyncError>;

/// A task together with its complexity bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedCard {
    /// Derived task
    #[serde(flatten)]
    pub task: Task,
    /// Label bucket, unset when the task has no measurable diff
    pub bucket: Option<Bucket>,
}

/// Every live task of one run and the thresholds that bucketed them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Plan {
    /// Planned cards, in branch order
    pub cards: Vec<PlannedCard>,
    /// Thresholds of this run
    pub thresholds: Option<ComplexityThresholds>,
}

impl Plan {
    /// Bucket a set of derived tasks against each other.
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let complexities: Vec<u64> = tasks.iter().map(|t| t.complexity).collect();
        let thresholds = ComplexityThresholds::compute(&complexities);
        let cards = tasks
            .into_iter()
            .map(|task| {
                let bucket = thresholds.and_then(|t| t.bucket(task.complexity));
                PlannedCard { task, bucket }
            })
            .collect();
        Self { cards, thresholds }
    }

    /// Parse warnings, one line per warning prefixed with the branch.
    pub fn warnings(&self) -> Vec<String> {
        self.cards
            .iter()
            .flat_map(|c| c.task.warnings.iter().map(move |w| format!("{}: {w}", c.task.name)))
            .collect()
    }
}

/// Derive the plan for every live task branch.
pub fn plan<R: HistoryReader + ?Sized>(
    reader: &R,
    repo: &RepositoryConfig,
    template: DescriptionTemplate,
) -> SyncResult<Plan> {
    let tasks = TaskDeriver::new(reader, repo, template)?.derive_all()?;
    Ok(Plan::from_tasks(tasks))
}

/// How a pass ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// The fetch failed; nothing was touched
    FetchFailed(String),
    /// The remote had no updates; the board was still reconciled
    Unchanged,
    /// The remote had updates and the board was reconciled
    Reconciled,
}

/// Everything a pass reports.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    /// How the pass ended
    pub outcome: SyncOutcome,
    /// Recovered parse problems, prefixed with the branch
    pub warnings: Vec<String>,
    /// Board mutations in the order they were applied
    pub mutations: Vec<Mutation>,
}

impl SyncReport {
    fn ended(outcome: SyncOutcome) -> Self {
        Self { outcome, warnings: Vec::new(), mutations: Vec::new() }
    }

    /// Whether the board was left untouched.
    pub fn is_noop(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Human-readable report lines.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        match &self.outcome {
            SyncOutcome::FetchFailed(err) => lines.push(format!("Fetching remote failed: {err}")),
            SyncOutcome::Unchanged => lines.push("No updates in remote repository".to_string()),
            SyncOutcome::Reconciled => {}
        }
        lines.extend(self.warnings.iter().cloned());
        lines.extend(self.mutations.iter().map(ToString::to_string));
        lines
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Run one pass: fetch, derive and reconcile.
pub fn sync<R, B>(
    reader: &R,
    board: &mut B,
    repo: &RepositoryConfig,
    template: DescriptionTemplate,
) -> SyncResult<SyncReport>
where
    R: HistoryReader + ?Sized,
    B: Board + ?Sized,
{
    let outcome = match reader.fetch() {
        Err(err) => {
            tracing::warn!(error = %err, "fetch failed, leaving the board untouched");
            return Ok(SyncReport::ended(SyncOutcome::FetchFailed(err.to_string())));
        }
        Ok(false) => {
            tracing::info!("no updates in remote repository");
            SyncOutcome::Unchanged
        }
        Ok(true) => SyncOutcome::Reconciled,
    };

    let plan = plan(reader, repo, template)?;
    let warnings = plan.warnings();
    for warning in &warnings {
        tracing::warn!("{warning}");
    }

    let mutations = Reconciler::new(board)?.reconcile(&plan.cards)?;
    tracing::info!(tasks = plan.cards.len(), mutations = mutations.len(), "board reconciled");

    Ok(SyncReport { outcome, warnings, mutations })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::InMemoryBoard;
    use crate::git::{BranchHistory, InMemoryHistory};
    use crate::task::TaskState;

    fn board() -> InMemoryBoard {
        let lists: Vec<&str> = TaskState::ALL.iter().map(TaskState::list_name).collect();
        InMemoryBoard::with_layout(&lists, &["green", "yellow", "red"])
    }

    fn stat(files: u64, insertions: u64) -> String {
        format!(" {files} files changed, {insertions} insertions(+)\n")
    }

    fn history() -> InMemoryHistory {
        InMemoryHistory::new("origin")
            .with_branch("small", BranchHistory::new("base").with_diff_summary(stat(1, 8)))
            .with_branch("mid", BranchHistory::new("base").with_diff_summary(stat(2, 16)))
            .with_branch("large", BranchHistory::new("base").with_diff_summary(stat(10, 180)))
            .with_branch("empty", BranchHistory::new("base"))
    }

    fn run(history: &InMemoryHistory, board: &mut InMemoryBoard) -> SyncResult<SyncReport> {
        sync(
            history,
            board,
            &RepositoryConfig::default(),
            DescriptionTemplate::default(),
        )
    }

    fn task(name: &str, complexity: u64) -> Task {
        Task {
            name: name.to_string(),
            on_review: false,
            conclusions: crate::review::Conclusions::new(),
            complexity,
            state: TaskState::InProgress,
            description: String::new(),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_plan_buckets_relative_to_population() {
        let plan = Plan::from_tasks(vec![task("a", 10), task("b", 20), task("c", 90), task("d", 0)]);
        let buckets: Vec<_> = plan.cards.iter().map(|c| c.bucket).collect();
        assert_eq!(buckets, vec![Some(Bucket::Green), Some(Bucket::Yellow), Some(Bucket::Red), None]);
    }

    #[test]
    fn test_plan_without_measurable_tasks() {
        let plan = Plan::from_tasks(vec![task("a", 0)]);
        assert!(plan.thresholds.is_none());
        assert_eq!(plan.cards[0].bucket, None);
    }

    #[test]
    fn test_fetch_failure_is_noop() {
        let history = history().with_fetch_error("could not resolve host");
        let mut board = board();

        let report = run(&history, &mut board).unwrap();

        assert!(matches!(report.outcome, SyncOutcome::FetchFailed(_)));
        assert!(report.is_noop());
        assert!(board.cards().is_empty());
    }

    #[test]
    fn test_unchanged_remote_still_reconciles() {
        let history = history().with_fetch_changed(false);
        let mut board = board();

        let report = run(&history, &mut board).unwrap();

        assert_eq!(report.outcome, SyncOutcome::Unchanged);
        assert_eq!(report.lines()[0], "No updates in remote repository");
        assert_eq!(board.cards().len(), 4);
    }

    #[test]
    fn test_unchanged_remote_on_current_board_is_noop() {
        let history = history().with_fetch_changed(false);
        let mut board = board();
        run(&history, &mut board).unwrap();
        board.clear_journal();

        let report = run(&history, &mut board).unwrap();

        assert!(report.is_noop());
        assert_eq!(report.lines(), vec!["No updates in remote repository"]);
        assert!(board.journal().is_empty());
    }

    #[test]
    fn test_retry_after_failed_pass_completes_board() {
        let history = history();
        let mut board = board();
        board.set_read_only(true);

        assert!(run(&history, &mut board).is_err());
        assert!(board.cards().is_empty());

        // the remote was already fetched by the failed pass
        let history = history.with_fetch_changed(false);
        board.set_read_only(false);
        let report = run(&history, &mut board).unwrap();

        assert_eq!(report.outcome, SyncOutcome::Unchanged);
        assert_eq!(board.cards().len(), 4);
    }

    #[test]
    fn test_dry_run_leaves_work_for_real_pass() {
        let history = history();
        let mut board = board();

        let mut snapshot = InMemoryBoard::snapshot_of(&board).unwrap();
        let dry = run(&history, &mut snapshot).unwrap();
        assert_eq!(dry.mutations.len(), 7);
        assert!(board.cards().is_empty());

        let history = history.with_fetch_changed(false);
        let report = run(&history, &mut board).unwrap();

        assert_eq!(report.mutations, dry.mutations);
        assert_eq!(board.cards().len(), 4);
    }

    #[test]
    fn test_sync_labels_by_complexity() {
        let history = history();
        let mut board = board();

        run(&history, &mut board).unwrap();

        let color = |name: &str| {
            board.card_named(name).unwrap().labels.first().and_then(|l| l.color.clone())
        };
        assert_eq!(color("small").as_deref(), Some("green"));
        assert_eq!(color("mid").as_deref(), Some("yellow"));
        assert_eq!(color("large").as_deref(), Some("red"));
        assert_eq!(color("empty"), None);
    }

    #[test]
    fn test_sync_reports_warnings_with_branch() {
        let history = InMemoryHistory::new("origin")
            .with_branch("broken", BranchHistory::new("base").with_diff_summary("nonsense\n"));
        let mut board = board();

        let report = run(&history, &mut board).unwrap();

        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].starts_with("broken: "));
        assert!(report.lines()[0].starts_with("broken: "));
    }
}
