//! Complexity scoring of task branches.
//!
//! The score is a proxy for review effort taken from the `--stat` summary of
//! the added and modified files between a branch and its merge base.

pub mod summary;
pub mod thresholds;

pub use summary::{DiffSummary, DiffSummaryError};
pub use thresholds::{Bucket, ComplexityThresholds};

use crate::git::{GitResult, HistoryReader};

/// Outcome of scoring one branch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplexityScore {
    /// Score, `0` for no measurable diff or an unparseable summary
    pub value: u64,
    /// Set when the summary could not be parsed
    pub warning: Option<String>,
}

/// Score the diff `range`, restricted to `paths`.
///
/// Summary parse failures degrade to `0`; only failing git queries are
/// errors.
pub fn score_range<R: HistoryReader + ?Sized>(
    reader: &R,
    range: &str,
    paths: &[String],
) -> GitResult<ComplexityScore> {
    let output = reader.diff_summary(range, paths)?;

    match DiffSummary::parse_stat(&output) {
        None => Ok(ComplexityScore::default()),
        Some(Ok(summary)) => Ok(ComplexityScore { value: summary.score(), warning: None }),
        Some(Err(err)) => {
            tracing::warn!(range = %range, error = %err, "unparseable diff summary");
            Ok(ComplexityScore {
                value: 0,
                warning: Some(format!("could not parse diff summary: {err}")),
            })
        }
    }
}
