#![allow(clippy::cast_precision_loss)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::trivially_copy_pass_by_ref)]
#![allow(clippy::format_push_string)]

//! # Taskboard
//!
//! Mirror the workflow state of task branches onto a kanban board.
//!
//! Every remote branch that is not yet merged into the integration branch is
//! a task. Taskboard reads each task's review record and diff from git
//! history, derives its workflow state and relative complexity, and
//! reconciles the board so there is exactly one card per task.
//!
//! ## Features
//!
//! - **Review tracking**: latest conclusion per reviewer, mined from the
//!   commits that touched the review record
//! - **Complexity buckets**: green/yellow/red labels relative to the current
//!   workload
//! - **Idempotent sync**: a second pass with no history changes is a no-op
//! - **Trello**: REST client behind the `trello` feature
//!
//! ## Quick Start
//!
//! ```bash
//! # Show what every task branch derives to
//! taskboard status
//!
//! # Reconcile the board
//! taskboard sync ~/.config/taskboard/trello.json
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::map_unwrap_or)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod board;
pub mod complexity;
pub mod core;
pub mod git;
pub mod review;
pub mod sync;
pub mod task;

pub use board::{Board, BoardCard, BoardError, BoardLabel, BoardList, BoardResult, InMemoryBoard};
#[cfg(feature = "trello")]
pub use board::{CredentialsError, TrelloBoard, TrelloCredentials};
pub use complexity::{Bucket, ComplexityThresholds, DiffSummary};
pub use crate::core::Config;
pub use git::{GitCli, GitError, GitRepository, HistoryReader};
pub use review::{Conclusion, Conclusions};
pub use sync::{sync, Mutation, Plan, PlannedCard, SyncError, SyncOutcome, SyncReport};
pub use task::{DescriptionTemplate, Task, TaskDeriver, TaskState};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "taskboard";
