//! In-memory [`Board`] that journals every mutation.

use super::{Board, BoardCard, BoardError, BoardLabel, BoardList, BoardResult};

/// Board held in memory, for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBoard {
    lists: Vec<BoardList>,
    labels: Vec<BoardLabel>,
    cards: Vec<BoardCard>,
    journal: Vec<String>,
    next_id: usize,
    read_only: bool,
}

impl InMemoryBoard {
    /// Create an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a board with the given lists and colored labels.
    pub fn with_layout(list_names: &[&str], colors: &[&str]) -> Self {
        let mut board = Self::new();
        for name in list_names {
            let id = board.fresh_id("list");
            board.lists.push(BoardList { id, name: (*name).to_string() });
        }
        for color in colors {
            let id = board.fresh_id("label");
            board.labels.push(BoardLabel {
                id,
                name: String::new(),
                color: Some((*color).to_string()),
            });
        }
        board
    }

    /// Copy an existing board's state into memory.
    pub fn snapshot_of(board: &impl Board) -> BoardResult<Self> {
        Ok(Self {
            lists: board.open_lists()?,
            labels: board.labels()?,
            cards: board.open_cards()?,
            journal: Vec::new(),
            next_id: 0,
            read_only: false,
        })
    }

    /// Reject mutations with an API error.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Place a card directly, bypassing the journal, and return its ID.
    pub fn seed_card(
        &mut self,
        name: &str,
        list_name: &str,
        description: &str,
        colors: &[&str],
    ) -> BoardResult<String> {
        let list_id =
            self.list_id(list_name).ok_or_else(|| BoardError::MissingList(list_name.to_string()))?;
        let labels = colors
            .iter()
            .map(|color| {
                self.label(color).cloned().ok_or_else(|| BoardError::MissingLabel((*color).to_string()))
            })
            .collect::<BoardResult<Vec<_>>>()?;
        let id = self.fresh_id("card");
        self.cards.push(BoardCard {
            id: id.clone(),
            name: name.to_string(),
            list_id,
            description: description.to_string(),
            labels,
        });
        Ok(id)
    }

    /// Mutations applied so far, one line each.
    pub fn journal(&self) -> &[String] {
        &self.journal
    }

    /// Forget the journal.
    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    /// Cards currently on the board.
    pub fn cards(&self) -> &[BoardCard] {
        &self.cards
    }

    /// Card with the given name.
    pub fn card_named(&self, name: &str) -> Option<&BoardCard> {
        self.cards.iter().find(|c| c.name == name)
    }

    /// Name of the list with the given ID.
    pub fn list_name(&self, list_id: &str) -> Option<&str> {
        self.lists.iter().find(|l| l.id == list_id).map(|l| l.name.as_str())
    }

    fn list_id(&self, name: &str) -> Option<String> {
        self.lists.iter().find(|l| l.name == name).map(|l| l.id.clone())
    }

    fn label(&self, color: &str) -> Option<&BoardLabel> {
        self.labels.iter().find(|l| l.color.as_deref() == Some(color))
    }

    fn fresh_id(&mut self, kind: &str) -> String {
        self.next_id += 1;
        format!("{kind}-{}", self.next_id)
    }

    fn check_writable(&self) -> BoardResult<()> {
        if self.read_only {
            return Err(BoardError::Api { status: 403, message: "board is read-only".to_string() });
        }
        Ok(())
    }

    fn card_mut(&mut self, card_id: &str) -> BoardResult<&mut BoardCard> {
        self.cards
            .iter_mut()
            .find(|c| c.id == card_id)
            .ok_or_else(|| BoardError::NotFound(format!("card {card_id}")))
    }
}

impl Board for InMemoryBoard {
    fn open_cards(&self) -> BoardResult<Vec<BoardCard>> {
        Ok(self.cards.clone())
    }

    fn open_lists(&self) -> BoardResult<Vec<BoardList>> {
        Ok(self.lists.clone())
    }

    fn labels(&self) -> BoardResult<Vec<BoardLabel>> {
        Ok(self.labels.clone())
    }

    fn create_card(
        &mut self,
        list_id: &str,
        name: &str,
        description: &str,
    ) -> BoardResult<BoardCard> {
        self.check_writable()?;
        if !self.lists.iter().any(|l| l.id == list_id) {
            return Err(BoardError::NotFound(format!("list {list_id}")));
        }
        let card = BoardCard {
            id: self.fresh_id("card"),
            name: name.to_string(),
            list_id: list_id.to_string(),
            description: description.to_string(),
            labels: Vec::new(),
        };
        self.cards.push(card.clone());
        self.journal.push(format!("create {name}"));
        Ok(card)
    }

    fn change_list(&mut self, card_id: &str, list_id: &str) -> BoardResult<()> {
        self.check_writable()?;
        self.card_mut(card_id)?.list_id = list_id.to_string();
        self.journal.push(format!("move {card_id} {list_id}"));
        Ok(())
    }

    fn set_description(&mut self, card_id: &str, description: &str) -> BoardResult<()> {
        self.check_writable()?;
        self.card_mut(card_id)?.description = description.to_string();
        self.journal.push(format!("describe {card_id}"));
        Ok(())
    }

    fn add_label(&mut self, card_id: &str, label_id: &str) -> BoardResult<()> {
        self.check_writable()?;
        let label = self
            .labels
            .iter()
            .find(|l| l.id == label_id)
            .cloned()
            .ok_or_else(|| BoardError::NotFound(format!("label {label_id}")))?;
        let card = self.card_mut(card_id)?;
        if !card.labels.iter().any(|l| l.id == label_id) {
            card.labels.push(label);
        }
        self.journal.push(format!("label {card_id} {label_id}"));
        Ok(())
    }

    fn remove_label(&mut self, card_id: &str, label_id: &str) -> BoardResult<()> {
        self.check_writable()?;
        self.card_mut(card_id)?.labels.retain(|l| l.id != label_id);
        self.journal.push(format!("unlabel {card_id} {label_id}"));
        Ok(())
    }

    fn delete_card(&mut self, card_id: &str) -> BoardResult<()> {
        self.check_writable()?;
        let before = self.cards.len();
        self.cards.retain(|c| c.id != card_id);
        if self.cards.len() == before {
            return Err(BoardError::NotFound(format!("card {card_id}")));
        }
        self.journal.push(format!("delete {card_id}"));
        Ok(())
    }

    fn refresh_card(&self, card_id: &str) -> BoardResult<BoardCard> {
        self.cards
            .iter()
            .find(|c| c.id == card_id)
            .cloned()
            .ok_or_else(|| BoardError::NotFound(format!("card {card_id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> InMemoryBoard {
        InMemoryBoard::with_layout(&["Todo", "Done"], &["green", "red"])
    }

    #[test]
    fn test_create_and_move() {
        let mut board = board();
        let done = board.list_id("Done").unwrap();
        let todo = board.list_id("Todo").unwrap();

        let card = board.create_card(&todo, "feature-x", "desc").unwrap();
        board.change_list(&card.id, &done).unwrap();

        assert_eq!(board.list_name(&board.card_named("feature-x").unwrap().list_id), Some("Done"));
        assert_eq!(board.journal().len(), 2);
    }

    #[test]
    fn test_labels() {
        let mut board = board();
        let id = board.seed_card("feature-x", "Todo", "", &["green"]).unwrap();
        let red = board.label("red").unwrap().id.clone();
        let green = board.label("green").unwrap().id.clone();

        board.remove_label(&id, &green).unwrap();
        board.add_label(&id, &red).unwrap();

        let card = board.refresh_card(&id).unwrap();
        assert_eq!(card.labels.len(), 1);
        assert_eq!(card.labels[0].color.as_deref(), Some("red"));
    }

    #[test]
    fn test_seed_card_rejects_unknown_list_and_label() {
        let mut board = board();

        let list = board.seed_card("feature-x", "Backlog", "", &[]);
        let label = board.seed_card("feature-x", "Todo", "", &["purple"]);

        assert!(matches!(list, Err(BoardError::MissingList(name)) if name == "Backlog"));
        assert!(matches!(label, Err(BoardError::MissingLabel(color)) if color == "purple"));
        assert!(board.cards().is_empty());
    }

    #[test]
    fn test_delete_unknown_card() {
        let mut board = board();
        assert!(matches!(board.delete_card("card-99"), Err(BoardError::NotFound(_))));
    }

    #[test]
    fn test_read_only_board_rejects_mutations() {
        let mut source = board();
        source.seed_card("feature-x", "Todo", "", &[]).unwrap();

        let mut snapshot = InMemoryBoard::snapshot_of(&source).unwrap();
        snapshot.set_read_only(true);
        let card_id = snapshot.cards()[0].id.clone();

        assert!(snapshot.delete_card(&card_id).is_err());
        assert!(snapshot.journal().is_empty());
        assert_eq!(snapshot.cards().len(), 1);
    }
}
