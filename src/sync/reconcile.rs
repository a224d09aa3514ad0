//! Board reconciliation.
//!
//! Brings the board in line with the planned cards using the fewest
//! mutations, and reports each one.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use super::PlannedCard;
use crate::board::{Board, BoardCard, BoardError, BoardLabel, BoardList, BoardResult};
use crate::complexity::Bucket;
use crate::task::TaskState;

/// One change applied to the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Mutation {
    /// A card was created for a new task
    Created { task: String },
    /// A card moved to the list of its state
    Moved { task: String, list: String },
    /// A card's description was replaced
    Described { task: String, old: String, new: String },
    /// A label was detached
    LabelRemoved { task: String, color: String },
    /// A label was attached
    LabelAdded { task: String, color: String },
    /// A card without a live task was deleted
    Deleted { task: String },
}

impl Mutation {
    /// Name of the affected task or card.
    pub fn task(&self) -> &str {
        match self {
            Self::Created { task }
            | Self::Moved { task, .. }
            | Self::Described { task, .. }
            | Self::LabelRemoved { task, .. }
            | Self::LabelAdded { task, .. }
            | Self::Deleted { task } => task,
        }
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created { task } => write!(f, "{task}: created card"),
            Self::Moved { task, list } => write!(f, "{task}: moved to list '{list}'"),
            Self::Described { task, old, new } => {
                write!(f, "{task}: updated description from '{old}' to '{new}'")
            }
            Self::LabelRemoved { task, color } => write!(f, "{task}: removed {color} label"),
            Self::LabelAdded { task, color } => write!(f, "{task}: added {color} label"),
            Self::Deleted { task } => write!(f, "{task}: deleted"),
        }
    }
}

/// The lists and labels a board must provide.
#[derive(Debug, Clone)]
pub struct BoardLayout {
    lists: HashMap<TaskState, BoardList>,
    labels: HashMap<Bucket, BoardLabel>,
}

impl BoardLayout {
    /// Look up one list per state and one label per bucket color.
    pub fn resolve<B: Board + ?Sized>(board: &B) -> BoardResult<Self> {
        let open_lists = board.open_lists()?;
        let mut lists = HashMap::new();
        for state in TaskState::ALL {
            let list = open_lists
                .iter()
                .find(|l| l.name == state.list_name())
                .ok_or_else(|| BoardError::MissingList(state.list_name().to_string()))?;
            lists.insert(state, list.clone());
        }

        let board_labels = board.labels()?;
        let mut labels = HashMap::new();
        for bucket in Bucket::ALL {
            let label = board_labels
                .iter()
                .find(|l| l.color.as_deref() == Some(bucket.color()))
                .ok_or_else(|| BoardError::MissingLabel(bucket.color().to_string()))?;
            labels.insert(bucket, label.clone());
        }

        Ok(Self { lists, labels })
    }

    /// List holding tasks in `state`.
    pub fn list(&self, state: TaskState) -> &BoardList {
        &self.lists[&state]
    }

    /// Label for `bucket`.
    pub fn label(&self, bucket: Bucket) -> &BoardLabel {
        &self.labels[&bucket]
    }
}

/// Applies planned cards to a board.
pub struct Reconciler<'a, B: Board + ?Sized> {
    board: &'a mut B,
    layout: BoardLayout,
    mutations: Vec<Mutation>,
}

impl<'a, B: Board + ?Sized> Reconciler<'a, B> {
    /// Create a reconciler, checking the board layout first.
    pub fn new(board: &'a mut B) -> BoardResult<Self> {
        let layout = BoardLayout::resolve(&*board)?;
        Ok(Self { board, layout, mutations: Vec::new() })
    }

    /// Reconcile every planned card, then delete cards without a task.
    ///
    /// When several cards share a task name the first one in board order is
    /// kept and the rest are deleted.
    pub fn reconcile(mut self, planned: &[PlannedCard]) -> BoardResult<Vec<Mutation>> {
        let cards = self.board.open_cards()?;
        let wanted: HashSet<&str> = planned.iter().map(|p| p.task.name.as_str()).collect();

        let mut kept: HashMap<&str, &BoardCard> = HashMap::new();
        let mut stale = Vec::new();
        for card in &cards {
            if wanted.contains(card.name.as_str()) && !kept.contains_key(card.name.as_str()) {
                kept.insert(card.name.as_str(), card);
            } else {
                stale.push(card);
            }
        }

        for plan in planned {
            let existing = kept.get(plan.task.name.as_str()).copied();
            self.reconcile_card(plan, existing)?;
        }

        for card in stale {
            self.board.delete_card(&card.id)?;
            self.record(Mutation::Deleted { task: card.name.clone() });
        }

        Ok(self.mutations)
    }

    fn reconcile_card(&mut self, plan: &PlannedCard, existing: Option<&BoardCard>) -> BoardResult<()> {
        let task = &plan.task;
        let list = self.layout.list(task.state);

        let card = match existing {
            None => {
                let card = self.board.create_card(&list.id, &task.name, &task.description)?;
                self.record(Mutation::Created { task: task.name.clone() });
                card
            }
            Some(card) => {
                if card.list_id != list.id {
                    let list_name = list.name.clone();
                    self.board.change_list(&card.id, &list.id)?;
                    self.record(Mutation::Moved { task: task.name.clone(), list: list_name });
                }
                if card.description != task.description {
                    self.board.set_description(&card.id, &task.description)?;
                    self.record(Mutation::Described {
                        task: task.name.clone(),
                        old: card.description.clone(),
                        new: task.description.clone(),
                    });
                }
                card.clone()
            }
        };

        self.reconcile_labels(&task.name, card, plan.bucket)
    }

    fn reconcile_labels(&mut self, task: &str, card: BoardCard, bucket: Option<Bucket>) -> BoardResult<()> {
        if let Some(bucket) = bucket {
            if let [only] = card.labels.as_slice() {
                if only.color.as_deref() == Some(bucket.color()) {
                    return Ok(());
                }
            }
        }

        self.remove_labels(task, &card)?;

        if let Some(bucket) = bucket {
            if !card.labels.is_empty() {
                // labels the board still reports after removal
                let refreshed = self.board.refresh_card(&card.id)?;
                self.remove_labels(task, &refreshed)?;
            }
            let label_id = self.layout.label(bucket).id.clone();
            self.board.add_label(&card.id, &label_id)?;
            self.record(Mutation::LabelAdded { task: task.to_string(), color: bucket.color().to_string() });
        }
        Ok(())
    }

    fn remove_labels(&mut self, task: &str, card: &BoardCard) -> BoardResult<()> {
        for label in &card.labels {
            self.board.remove_label(&card.id, &label.id)?;
            self.record(Mutation::LabelRemoved {
                task: task.to_string(),
                color: label.color.clone().unwrap_or_else(|| "colorless".to_string()),
            });
        }
        Ok(())
    }

    fn record(&mut self, mutation: Mutation) {
        tracing::info!("{mutation}");
        self.mutations.push(mutation);
    }
}
