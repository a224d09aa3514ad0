//! Read-only history queries against the source repository.
//!
//! All queries go through the `git` executable so that the exact output
//! formats (patch text, `--stat` summaries) match what reviewers see.

use std::path::{Path, PathBuf};
use std::process::Command as ProcessCommand;

/// Error types for history queries.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("Failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("git {args} failed (exit code {code:?}): {stderr}")]
    Command { args: String, code: Option<i32>, stderr: String },

    #[error("Unexpected git output: {0}")]
    UnexpectedOutput(String),
}

/// Result type for history queries.
pub type GitResult<T> = Result<T, GitError>;

/// Version-control queries the derivation engine depends on.
pub trait HistoryReader {
    /// Fetch the remote, pruning deleted branches.
    ///
    /// Returns whether any remote-tracking ref changed.
    fn fetch(&self) -> GitResult<bool>;

    /// Remote branch names (without the remote prefix) not yet merged into
    /// `merged_into`.
    fn remote_branches(&self, merged_into: &str) -> GitResult<Vec<String>>;

    /// Common ancestor of two revisions.
    fn merge_base(&self, a: &str, b: &str) -> GitResult<String>;

    /// Commits in `range` that touched `path`, oldest first.
    fn log_commits(&self, range: &str, path: &str) -> GitResult<Vec<String>>;

    /// Full patch text of a commit.
    fn show_patch(&self, rev: &str) -> GitResult<String>;

    /// Contents of `path` at `rev`, or `None` when it does not exist there.
    fn show_path(&self, rev: &str, path: &str) -> GitResult<Option<String>>;

    /// `--stat` summary of added or modified files in `range`, restricted to
    /// `paths`. Empty when nothing changed.
    fn diff_summary(&self, range: &str, paths: &[String]) -> GitResult<String>;

    /// Names of the top-level entries of the working tree.
    fn top_level_paths(&self) -> GitResult<Vec<String>>;
}

/// [`HistoryReader`] backed by the `git` command line.
#[derive(Debug, Clone)]
pub struct GitCli {
    /// Working tree the commands run in
    workdir: PathBuf,

    /// Remote to fetch from and list branches of
    remote: String,
}

impl GitCli {
    /// Create a reader for the repository at `workdir`.
    pub fn new(workdir: impl Into<PathBuf>, remote: impl Into<String>) -> Self {
        Self { workdir: workdir.into(), remote: remote.into() }
    }

    /// Working tree the commands run in.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Run git and capture its output, failing on a non-zero exit.
    fn run(&self, args: &[&str]) -> GitResult<std::process::Output> {
        tracing::debug!(args = ?args, "running git");

        let output = ProcessCommand::new("git").args(args).current_dir(&self.workdir).output()?;

        if output.status.success() {
            Ok(output)
        } else {
            Err(GitError::Command {
                args: args.join(" "),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    /// Run git and return its stdout as text.
    fn stdout(&self, args: &[&str]) -> GitResult<String> {
        let output = self.run(args)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl HistoryReader for GitCli {
    fn fetch(&self) -> GitResult<bool> {
        let output = self.run(&["fetch", "--prune", &self.remote])?;
        // git reports updated refs on stderr and stays silent otherwise
        Ok(!output.stdout.is_empty() || !output.stderr.is_empty())
    }

    fn remote_branches(&self, merged_into: &str) -> GitResult<Vec<String>> {
        let stdout = self.stdout(&["branch", "-r", "--no-merged", merged_into])?;
        Ok(parse_remote_branches(&stdout, &self.remote))
    }

    fn merge_base(&self, a: &str, b: &str) -> GitResult<String> {
        let base = self.stdout(&["merge-base", a, b])?.trim().to_string();
        if base.is_empty() {
            return Err(GitError::UnexpectedOutput(format!("empty merge base of {a} and {b}")));
        }
        Ok(base)
    }

    fn log_commits(&self, range: &str, path: &str) -> GitResult<Vec<String>> {
        let stdout =
            self.stdout(&["log", "--reverse", "--pretty=format:%H", range, "--", path])?;
        Ok(stdout.lines().map(str::trim).filter(|l| !l.is_empty()).map(String::from).collect())
    }

    fn show_patch(&self, rev: &str) -> GitResult<String> {
        self.stdout(&["show", rev])
    }

    fn show_path(&self, rev: &str, path: &str) -> GitResult<Option<String>> {
        match self.stdout(&["show", &format!("{rev}:{path}")]) {
            Ok(content) => Ok(Some(content)),
            // git exits with 128 when the path is absent at that revision
            Err(GitError::Command { code: Some(128), .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn diff_summary(&self, range: &str, paths: &[String]) -> GitResult<String> {
        let mut args = vec!["diff", "--stat", "--diff-filter=MA", "-M", range, "--"];
        args.extend(paths.iter().map(String::as_str));
        self.stdout(&args)
    }

    fn top_level_paths(&self) -> GitResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.workdir)? {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }
}

/// Parse `git branch -r` output into branch names of `remote`.
///
/// Symbolic refs (`origin/HEAD -> origin/master`) keep their arrow and are
/// rejected later by the task branch filter.
pub fn parse_remote_branches(output: &str, remote: &str) -> Vec<String> {
    let prefix = format!("{remote}/");
    output
        .lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix(&prefix))
        .map(String::from)
        .collect()
}
