//! Kanban board boundary.
//!
//! The board is an external system of lists, cards and colored labels. The
//! reconciliation engine only talks to it through [`Board`].

pub mod memory;
#[cfg(feature = "trello")]
pub mod trello;

use serde::{Deserialize, Serialize};

pub use memory::InMemoryBoard;
#[cfg(feature = "trello")]
pub use trello::{CredentialsError, TrelloBoard, TrelloCredentials};

/// A board list (column).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardList {
    /// List ID
    pub id: String,
    /// List name
    pub name: String,
}

/// A colored board label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardLabel {
    /// Label ID
    pub id: String,
    /// Label name (often empty)
    #[serde(default)]
    pub name: String,
    /// Label color, unset for colorless labels
    pub color: Option<String>,
}

/// A card on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardCard {
    /// Card ID
    pub id: String,
    /// Card name
    pub name: String,
    /// ID of the list holding the card
    #[serde(rename = "idList")]
    pub list_id: String,
    /// Markdown description
    #[serde(rename = "desc", default)]
    pub description: String,
    /// Labels attached to the card
    #[serde(default)]
    pub labels: Vec<BoardLabel>,
}

/// Error types for board operations.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[cfg(feature = "trello")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Board API error: {message} (status: {status})")]
    Api { status: u16, message: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No open board named '{0}'")]
    NoBoard(String),

    #[error("Board has no list named '{0}'")]
    MissingList(String),

    #[error("Board has no {0} label")]
    MissingLabel(String),
}

/// Result type for board operations.
pub type BoardResult<T> = Result<T, BoardError>;

/// Operations the reconciliation engine issues against a board.
pub trait Board {
    /// All open cards of the board, in board order.
    fn open_cards(&self) -> BoardResult<Vec<BoardCard>>;

    /// All open lists of the board.
    fn open_lists(&self) -> BoardResult<Vec<BoardList>>;

    /// All labels defined on the board.
    fn labels(&self) -> BoardResult<Vec<BoardLabel>>;

    /// Create a card at the bottom of a list.
    fn create_card(
        &mut self,
        list_id: &str,
        name: &str,
        description: &str,
    ) -> BoardResult<BoardCard>;

    /// Move a card to another list.
    fn change_list(&mut self, card_id: &str, list_id: &str) -> BoardResult<()>;

    /// Replace a card's description.
    fn set_description(&mut self, card_id: &str, description: &str) -> BoardResult<()>;

    /// Attach a label to a card.
    fn add_label(&mut self, card_id: &str, label_id: &str) -> BoardResult<()>;

    /// Detach a label from a card.
    fn remove_label(&mut self, card_id: &str, label_id: &str) -> BoardResult<()>;

    /// Delete a card.
    fn delete_card(&mut self, card_id: &str) -> BoardResult<()>;

    /// Re-read a card from the board.
    fn refresh_card(&self, card_id: &str) -> BoardResult<BoardCard>;
}
