//! Git integration module.
//!
//! Provides repository discovery and the read-only history queries that
//! task derivation is built on.

pub mod history;
pub mod memory;

use std::path::{Path, PathBuf};

use git2::Repository;

pub use history::{parse_remote_branches, GitCli, GitError, GitResult, HistoryReader};
pub use memory::{BranchHistory, InMemoryHistory};

/// Web URL used for source links when the remote is not hosted on GitHub.
pub const DEFAULT_WEB_URL: &str = "https://github.com/echronos/echronos";

/// Git repository wrapper used to locate the working tree.
pub struct GitRepository {
    repo: Repository,
}

impl GitRepository {
    /// Open a Git repository from the given path.
    ///
    /// This will search up the directory tree to find a Git repository.
    #[must_use]
    pub fn discover(path: impl AsRef<Path>) -> Option<Self> {
        Repository::discover(path.as_ref()).ok().map(|repo| Self { repo })
    }

    /// Get the repository root path (None for bare repositories).
    #[must_use]
    pub fn root(&self) -> Option<PathBuf> {
        self.repo.workdir().map(Path::to_path_buf)
    }

    /// Get the remote URL for the given remote name.
    #[must_use]
    pub fn remote_url(&self, name: &str) -> Option<String> {
        self.repo.find_remote(name).ok().and_then(|r| r.url().map(String::from))
    }

    /// Web URL of the repository behind `remote`, when it is hosted on GitHub.
    #[must_use]
    pub fn web_url(&self, remote: &str) -> Option<String> {
        let url = self.remote_url(remote)?;
        let (owner, repo) = parse_github_remote(&url)?;
        Some(format!("https://github.com/{owner}/{repo}"))
    }
}

/// Discover Git repository from the current directory.
#[must_use]
pub fn discover_repo() -> Option<GitRepository> {
    std::env::current_dir().ok().and_then(GitRepository::discover)
}

/// Extract `(owner, repo)` from a GitHub remote URL.
///
/// Accepts the forms:
/// - https://github.com/owner/repo.git
/// - git@github.com:owner/repo.git
/// - https://github.com/owner/repo
/// - git@github.com:owner/repo
pub fn parse_github_remote(url: &str) -> Option<(String, String)> {
    let url = url.trim();
    let repo_part = if url.starts_with("git@") {
        url.strip_prefix("git@github.com:")
    } else {
        url.strip_prefix("https://github.com/").or_else(|| url.strip_prefix("http://github.com/"))
    }?;

    let repo_part = repo_part.strip_suffix(".git").unwrap_or(repo_part);
    let (owner, repo) = repo_part.split_once('/')?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}
