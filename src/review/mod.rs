//! Review conclusions mined from the history of a review record.
//!
//! Reviewers sign off on a task branch by committing entries of the form
//!
//! ```text
//! Reviewer: alice (alice@example.com)
//! Conclusion: Accepted
//! ```
//!
//! to the branch's review record. Each commit touching the record is scanned
//! oldest first; the last conclusion of an author wins, except that a pending
//! conclusion never downgrades an earlier acceptance.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::git::{GitResult, HistoryReader};

/// Marker introducing the reviewer identity.
const REVIEWER_MARKER: &str = "Reviewer: ";

/// Marker of an added conclusion line, compared case-insensitively.
const CONCLUSION_MARKER: &str = "+conclusion:";

/// A reviewer's verdict on a task branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Conclusion {
    /// The reviewer accepts the change
    Accepted,
    /// The reviewer requests changes
    Rework,
    /// The review is pending or ambiguous (`accepted/rework`)
    Open,
}

impl Conclusion {
    /// Parse the value of a conclusion line, ignoring case.
    pub fn from_marker(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "accepted" => Some(Self::Accepted),
            "rework" => Some(Self::Rework),
            "accepted/rework" => Some(Self::Open),
            _ => None,
        }
    }
}

impl fmt::Display for Conclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Accepted => "Accepted",
            Self::Rework => "Rework",
            Self::Open => "Open",
        };
        write!(f, "{s}")
    }
}

/// Latest conclusion per author.
pub type Conclusions = BTreeMap<String, Conclusion>;

/// Accumulates conclusions across the commits of one branch.
#[derive(Debug, Clone, Default)]
pub struct ReviewLedger {
    conclusions: Conclusions,
    warnings: Vec<String>,
}

impl ReviewLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an author's conclusion.
    ///
    /// An `Open` conclusion does not replace an earlier `Accepted`.
    pub fn record(&mut self, author: String, conclusion: Conclusion) {
        if conclusion == Conclusion::Open
            && self.conclusions.get(&author) == Some(&Conclusion::Accepted)
        {
            return;
        }
        self.conclusions.insert(author, conclusion);
    }

    /// Scan the patch text of one commit.
    pub fn scan_patch(&mut self, patch: &str) {
        let mut state = ScanState::Empty;
        for line in patch.lines() {
            state = match LineEvent::classify(line) {
                Some(LineEvent::UnknownConclusion(line)) => {
                    tracing::warn!(line = %line, "unrecognized review conclusion");
                    self.warnings.push(format!("cannot handle conclusion '{line}'"));
                    state
                }
                Some(event) => state.step(event, self),
                None => state,
            };
        }
    }

    /// Conclusions recorded so far.
    pub fn conclusions(&self) -> &Conclusions {
        &self.conclusions
    }

    /// Warnings about lines that could not be interpreted.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Consume the ledger.
    pub fn finish(self) -> (Conclusions, Vec<String>) {
        (self.conclusions, self.warnings)
    }
}

/// Scan every commit in `range` that touched `review_path`, oldest first.
pub fn conclusions_from_history<R: HistoryReader + ?Sized>(
    reader: &R,
    range: &str,
    review_path: &str,
) -> GitResult<ReviewLedger> {
    let mut ledger = ReviewLedger::new();
    for rev in reader.log_commits(range, review_path)? {
        let patch = reader.show_patch(&rev)?;
        ledger.scan_patch(&patch);
    }
    Ok(ledger)
}

/// Interesting lines of a commit patch.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LineEvent {
    /// `diff ...` header of the next file
    FileBoundary,
    /// Reviewer identity, empty when the marker carries no name
    Reviewer(String),
    /// Added conclusion line
    Conclusion(Conclusion),
    /// Added conclusion line with a value we do not know
    UnknownConclusion(String),
}

impl LineEvent {
    fn classify(raw: &str) -> Option<Self> {
        let line = raw.trim();
        if line.starts_with("diff ") {
            return Some(Self::FileBoundary);
        }
        if let Some((_, identity)) = line.split_once(REVIEWER_MARKER) {
            let author = identity.split('(').next().unwrap_or_default().trim();
            return Some(Self::Reviewer(author.to_string()));
        }
        let lower = line.to_lowercase();
        if let Some(value) = lower.strip_prefix(CONCLUSION_MARKER) {
            return Some(match Conclusion::from_marker(value) {
                Some(conclusion) => Self::Conclusion(conclusion),
                None => Self::UnknownConclusion(line.to_string()),
            });
        }
        None
    }
}

/// Scanner state within one file diff.
///
/// A pair is committed on the transition that completes it, after which the
/// scanner starts over.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ScanState {
    Empty,
    Author(String),
    Conclusion(Conclusion),
}

impl ScanState {
    fn step(self, event: LineEvent, ledger: &mut ReviewLedger) -> Self {
        match (self, event) {
            (_, LineEvent::FileBoundary) => Self::Empty,
            (Self::Conclusion(c), LineEvent::Reviewer(author)) if author.is_empty() => {
                Self::Conclusion(c)
            }
            (_, LineEvent::Reviewer(author)) if author.is_empty() => Self::Empty,
            (Self::Conclusion(conclusion), LineEvent::Reviewer(author))
            | (Self::Author(author), LineEvent::Conclusion(conclusion)) => {
                ledger.record(author, conclusion);
                Self::Empty
            }
            (_, LineEvent::Reviewer(author)) => Self::Author(author),
            (_, LineEvent::Conclusion(conclusion)) => Self::Conclusion(conclusion),
            (state, LineEvent::UnknownConclusion(_)) => state,
        }
    }
}
