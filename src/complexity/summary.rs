//! Parser for the trailing summary line of `git diff --stat`.
//!
//! git words the line in the plain English of its `--stat` output, dropping
//! clauses whose count is zero:
//!
//! ```text
//!  3 files changed, 10 insertions(+), 2 deletions(-)
//!  1 file changed, 4 deletions(-)
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

static FILES: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+) file").expect("valid regex"));
static INSERTIONS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+) insertion").expect("valid regex"));
static DELETIONS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+) deletion").expect("valid regex"));

/// Error types for summary parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffSummaryError {
    #[error("no file, insertion or deletion count in '{0}'")]
    Unrecognized(String),

    #[error("count out of range in '{0}'")]
    Overflow(String),
}

/// Counts from a diff summary line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffSummary {
    /// Number of files changed
    pub files: u64,
    /// Number of inserted lines
    pub insertions: u64,
    /// Number of deleted lines
    pub deletions: u64,
}

impl DiffSummary {
    /// Parse a single summary line.
    pub fn parse_line(line: &str) -> Result<Self, DiffSummaryError> {
        let line = line.trim();
        let files = count(&FILES, line)?;
        let insertions = count(&INSERTIONS, line)?;
        let deletions = count(&DELETIONS, line)?;

        if files.is_none() && insertions.is_none() && deletions.is_none() {
            return Err(DiffSummaryError::Unrecognized(line.to_string()));
        }

        Ok(Self {
            files: files.unwrap_or(0),
            insertions: insertions.unwrap_or(0),
            deletions: deletions.unwrap_or(0),
        })
    }

    /// Parse full `--stat` output, using its last non-empty line.
    ///
    /// Returns `None` for empty output.
    pub fn parse_stat(output: &str) -> Option<Result<Self, DiffSummaryError>> {
        output.lines().rev().find(|l| !l.trim().is_empty()).map(Self::parse_line)
    }

    /// Review effort score: each file weighs two changed lines.
    pub fn score(&self) -> u64 {
        self.files.saturating_mul(2).saturating_add(self.insertions).saturating_add(self.deletions)
    }
}

fn count(pattern: &Regex, line: &str) -> Result<Option<u64>, DiffSummaryError> {
    pattern
        .captures(line)
        .map(|caps| caps[1].parse().map_err(|_| DiffSummaryError::Overflow(line.to_string())))
        .transpose()
}
