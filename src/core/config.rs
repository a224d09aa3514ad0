//! Configuration management for Taskboard.
//!
//! Handles loading configuration from TOML files.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source repository settings
    pub repository: RepositoryConfig,

    /// Board connection settings
    pub board: BoardConfig,

    /// Card description templates
    pub description: DescriptionConfig,
}

/// Source repository settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Remote whose branches are published
    pub remote: String,

    /// Branch that task branches are integrated into
    pub integration_branch: String,

    /// Branch names that are never treated as tasks
    pub excluded_branches: Vec<String>,

    /// Directory holding one review record per task branch
    pub review_dir: String,

    /// Directory holding one task record per task branch
    pub task_dir: String,

    /// Top-level path prefixes left out of the complexity diff
    pub complexity_excluded_prefixes: Vec<String>,

    /// Number of accepting reviews a task needs before integration
    pub required_accepts: usize,
}

/// Board connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Board name (first open board when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// REST API base URL
    pub api_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Card description templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DescriptionConfig {
    /// Web URL of the hosted repository (detected from the remote when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,

    /// Testing badge lines; `{branch}` is replaced by the branch name
    pub badges: Vec<String>,
}

impl RepositoryConfig {
    /// Remote-tracking ref of a branch, e.g. `origin/feature-x`.
    pub fn remote_ref(&self, branch: &str) -> String {
        format!("{}/{}", self.remote, branch)
    }

    /// Remote-tracking ref of the integration branch.
    pub fn integration_ref(&self) -> String {
        self.remote_ref(&self.integration_branch)
    }

    /// Path of the review record of a branch.
    pub fn review_path(&self, branch: &str) -> String {
        format!("{}/{}", self.review_dir.trim_end_matches('/'), branch)
    }

    /// Path of the task record of a branch.
    pub fn task_path(&self, branch: &str) -> String {
        format!("{}/{}", self.task_dir.trim_end_matches('/'), branch)
    }

    /// Check whether a remote branch name denotes a task branch.
    pub fn is_task_branch(&self, name: &str) -> bool {
        !name.contains('/') && !self.excluded_branches.iter().any(|b| b == name)
    }

    /// Check whether a top-level path takes part in the complexity diff.
    pub fn counts_toward_complexity(&self, path: &str) -> bool {
        path != ".git"
            && !self.complexity_excluded_prefixes.iter().any(|prefix| path.starts_with(prefix))
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Looks for config in:
    /// 1. `.taskboard.toml` in current directory
    /// 2. `~/.config/taskboard/config.toml`
    /// 3. Falls back to defaults
    pub fn load() -> anyhow::Result<Self> {
        match Self::find_file() {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Locate the config file that [`Config::load`] would read.
    pub fn find_file() -> Option<PathBuf> {
        let local_config = PathBuf::from(".taskboard.toml");
        if local_config.exists() {
            return Some(local_config);
        }

        let global_config = Self::config_dir()?.join("config.toml");
        global_config.exists().then_some(global_config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("taskboard"))
    }
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            integration_branch: "master".to_string(),
            excluded_branches: vec!["master".to_string(), "lca2016".to_string()],
            review_dir: "pm/reviews".to_string(),
            task_dir: "pm/tasks".to_string(),
            complexity_excluded_prefixes: vec!["external_tools".to_string(), "tools".to_string()],
            required_accepts: 2,
        }
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self { name: None, api_url: "https://api.trello.com/1".to_string(), timeout_secs: 30 }
    }
}

impl Default for DescriptionConfig {
    fn default() -> Self {
        Self {
            web_url: None,
            badges: vec![
                "core repository: ![](https://travis-ci.org/echronos/echronos.svg?branch={branch}) \
                 [![](https://ci.appveyor.com/api/projects/status/u0l9tcx3r8x9fwj0/branch/{branch}?svg=true)]\
                 (https://ci.appveyor.com/project/stefangotz/echronos/branch/{branch})"
                    .to_string(),
                "client repository: ![](https://travis-ci.org/echronos/test-client-repo.svg?branch={branch}) \
                 [![](https://ci.appveyor.com/api/projects/status/wbyntsf0a5crcl62/branch/{branch}?svg=true)]\
                 (https://ci.appveyor.com/project/stefangotz/test-client-repo/branch/{branch})"
                    .to_string(),
            ],
        }
    }
}
