//! In-memory [`HistoryReader`] for tests and benchmarks.

use std::collections::BTreeMap;

use super::history::{GitError, GitResult, HistoryReader};

/// Scripted history of one remote branch.
#[derive(Debug, Clone, Default)]
pub struct BranchHistory {
    /// Merge base with the integration branch
    pub merge_base: String,
    /// Commits since the merge base as `(touched path, patch)`, oldest first
    pub commits: Vec<(String, String)>,
    /// Files at the branch tip
    pub files: BTreeMap<String, String>,
    /// `--stat` output against the merge base
    pub diff_summary: String,
}

impl BranchHistory {
    /// Create a branch forked at `merge_base`.
    pub fn new(merge_base: impl Into<String>) -> Self {
        Self { merge_base: merge_base.into(), ..Self::default() }
    }

    /// Add a file at the branch tip.
    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    /// Add a commit touching `path`.
    pub fn with_commit(mut self, path: impl Into<String>, patch: impl Into<String>) -> Self {
        self.commits.push((path.into(), patch.into()));
        self
    }

    /// Set the `--stat` output.
    pub fn with_diff_summary(mut self, summary: impl Into<String>) -> Self {
        self.diff_summary = summary.into();
        self
    }
}

/// [`HistoryReader`] over scripted branches of a single remote.
#[derive(Debug, Clone)]
pub struct InMemoryHistory {
    remote: String,
    fetch: Result<bool, String>,
    branches: BTreeMap<String, BranchHistory>,
    top_level: Vec<String>,
}

impl InMemoryHistory {
    /// Create an empty history whose fetch reports changes.
    pub fn new(remote: impl Into<String>) -> Self {
        Self {
            remote: remote.into(),
            fetch: Ok(true),
            branches: BTreeMap::new(),
            top_level: vec!["packages".to_string(), "pm".to_string(), "tools".to_string()],
        }
    }

    /// Add or replace a branch.
    pub fn with_branch(mut self, name: impl Into<String>, branch: BranchHistory) -> Self {
        self.branches.insert(name.into(), branch);
        self
    }

    /// Set whether fetching reports changes.
    pub fn with_fetch_changed(mut self, changed: bool) -> Self {
        self.fetch = Ok(changed);
        self
    }

    /// Make fetching fail with `message`.
    pub fn with_fetch_error(mut self, message: impl Into<String>) -> Self {
        self.fetch = Err(message.into());
        self
    }

    /// Remove a branch, as if it was deleted on the remote.
    pub fn remove_branch(&mut self, name: &str) -> Option<BranchHistory> {
        self.branches.remove(name)
    }

    /// Mutable access to a branch.
    pub fn branch_mut(&mut self, name: &str) -> Option<&mut BranchHistory> {
        self.branches.get_mut(name)
    }

    fn branch_of_ref(&self, rev: &str) -> GitResult<(&str, &BranchHistory)> {
        rev.strip_prefix(&format!("{}/", self.remote))
            .and_then(|name| self.branches.get_key_value(name))
            .map(|(name, branch)| (name.as_str(), branch))
            .ok_or_else(|| unknown_revision(rev))
    }

    fn branch_of_range(&self, range: &str) -> GitResult<(&str, &BranchHistory)> {
        let (_, tip) = range.split_once("..").ok_or_else(|| unknown_revision(range))?;
        self.branch_of_ref(tip)
    }
}

fn unknown_revision(rev: &str) -> GitError {
    GitError::Command {
        args: format!("rev-parse {rev}"),
        code: Some(128),
        stderr: format!("fatal: ambiguous argument '{rev}': unknown revision"),
    }
}

impl HistoryReader for InMemoryHistory {
    fn fetch(&self) -> GitResult<bool> {
        self.fetch.clone().map_err(|stderr| GitError::Command {
            args: format!("fetch --prune {}", self.remote),
            code: Some(128),
            stderr,
        })
    }

    fn remote_branches(&self, _merged_into: &str) -> GitResult<Vec<String>> {
        Ok(self.branches.keys().cloned().collect())
    }

    fn merge_base(&self, a: &str, _b: &str) -> GitResult<String> {
        let (_, branch) = self.branch_of_ref(a)?;
        Ok(branch.merge_base.clone())
    }

    fn log_commits(&self, range: &str, path: &str) -> GitResult<Vec<String>> {
        let (name, branch) = self.branch_of_range(range)?;
        Ok(branch
            .commits
            .iter()
            .enumerate()
            .filter(|(_, (touched, _))| touched == path)
            .map(|(index, _)| format!("{name}@{index}"))
            .collect())
    }

    fn show_patch(&self, rev: &str) -> GitResult<String> {
        let (name, index) = rev.split_once('@').ok_or_else(|| unknown_revision(rev))?;
        let index: usize = index.parse().map_err(|_| unknown_revision(rev))?;
        self.branches
            .get(name)
            .and_then(|branch| branch.commits.get(index))
            .map(|(_, patch)| patch.clone())
            .ok_or_else(|| unknown_revision(rev))
    }

    fn show_path(&self, rev: &str, path: &str) -> GitResult<Option<String>> {
        let (_, branch) = self.branch_of_ref(rev)?;
        Ok(branch.files.get(path).cloned())
    }

    fn diff_summary(&self, range: &str, _paths: &[String]) -> GitResult<String> {
        let (_, branch) = self.branch_of_range(range)?;
        Ok(branch.diff_summary.clone())
    }

    fn top_level_paths(&self) -> GitResult<Vec<String>> {
        Ok(self.top_level.clone())
    }
}
