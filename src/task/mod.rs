//! Task branches and their derived workflow state.
//!
//! A task is derived eagerly and in full from version-control content: the
//! review record decides the state, the diff against the merge base decides
//! the complexity, and both feed the card description.

pub mod description;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use description::DescriptionTemplate;

use crate::complexity::{self, ComplexityScore};
use crate::core::RepositoryConfig;
use crate::git::{GitResult, HistoryReader};
use crate::review::{self, Conclusion, Conclusions, ReviewLedger};

/// Workflow state of a task; each state maps to one board list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskState {
    /// No review record yet
    InProgress,
    /// At least one reviewer asked for rework
    NeedsRework,
    /// On review without enough acceptances
    NeedsMoreReviews,
    /// Accepted by enough reviewers
    ReadyForIntegration,
}

impl TaskState {
    /// All states in workflow order.
    pub const ALL: [Self; 4] =
        [Self::InProgress, Self::NeedsRework, Self::NeedsMoreReviews, Self::ReadyForIntegration];

    /// Classify a task from its review status.
    pub fn classify(on_review: bool, conclusions: &Conclusions, required_accepts: usize) -> Self {
        if !on_review {
            return Self::InProgress;
        }
        if conclusions.values().any(|c| *c == Conclusion::Rework) {
            return Self::NeedsRework;
        }
        let accepts = conclusions.values().filter(|c| **c == Conclusion::Accepted).count();
        if accepts < required_accepts {
            Self::NeedsMoreReviews
        } else {
            Self::ReadyForIntegration
        }
    }

    /// Name of the board list holding tasks in this state.
    pub const fn list_name(&self) -> &'static str {
        match self {
            Self::InProgress => "In Progress",
            Self::NeedsRework => "Needs Rework",
            Self::NeedsMoreReviews => "Needs More Reviews",
            Self::ReadyForIntegration => "Ready for Integration",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.list_name())
    }
}

/// Everything derived about one task branch in one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    /// Branch name
    pub name: String,
    /// Whether the branch carries a review record
    pub on_review: bool,
    /// Latest conclusion per reviewer
    pub conclusions: Conclusions,
    /// Review effort score
    pub complexity: u64,
    /// Workflow state
    pub state: TaskState,
    /// Card description
    pub description: String,
    /// Recovered parse problems
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Derives [`Task`]s from the history of a repository.
pub struct TaskDeriver<'a, R: HistoryReader + ?Sized> {
    reader: &'a R,
    repo: &'a RepositoryConfig,
    template: DescriptionTemplate,
    complexity_paths: Vec<String>,
}

impl<'a, R: HistoryReader + ?Sized> TaskDeriver<'a, R> {
    /// Create a deriver; the complexity path set is read once here.
    pub fn new(
        reader: &'a R,
        repo: &'a RepositoryConfig,
        template: DescriptionTemplate,
    ) -> GitResult<Self> {
        let complexity_paths = reader
            .top_level_paths()?
            .into_iter()
            .filter(|path| repo.counts_toward_complexity(path))
            .collect();
        Ok(Self { reader, repo, template, complexity_paths })
    }

    /// Names of the live task branches.
    pub fn task_names(&self) -> GitResult<Vec<String>> {
        let branches = self.reader.remote_branches(&self.repo.integration_ref())?;
        Ok(branches.into_iter().filter(|name| self.repo.is_task_branch(name)).collect())
    }

    /// Derive every live task branch.
    pub fn derive_all(&self) -> GitResult<Vec<Task>> {
        self.task_names()?.iter().map(|name| self.derive(name)).collect()
    }

    /// Derive a single task branch.
    pub fn derive(&self, name: &str) -> GitResult<Task> {
        let tip = self.repo.remote_ref(name);
        let review_path = self.repo.review_path(name);

        let on_review = self.reader.show_path(&tip, &review_path)?.is_some();
        let base = self.reader.merge_base(&tip, &self.repo.integration_ref())?;
        let range = format!("{base}..{tip}");

        let ledger = if on_review {
            review::conclusions_from_history(self.reader, &range, &review_path)?
        } else {
            ReviewLedger::new()
        };
        let (conclusions, mut warnings) = ledger.finish();

        let ComplexityScore { value: complexity, warning } =
            complexity::score_range(self.reader, &range, &self.complexity_paths)?;
        warnings.extend(warning);

        let task_record = self.reader.show_path(&tip, &self.repo.task_path(name))?;
        let state = TaskState::classify(on_review, &conclusions, self.repo.required_accepts);
        let description =
            self.template.render(name, on_review, &conclusions, task_record.as_deref());

        tracing::debug!(task = %name, state = %state, complexity, "derived task");

        Ok(Task {
            name: name.to_string(),
            on_review,
            conclusions,
            complexity,
            state,
            description,
            warnings,
        })
    }
}
