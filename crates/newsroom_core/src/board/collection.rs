//! Ordered card collection.
//!
//! # Responsibility
//! - Own the global card order that encodes each card's rank in its column.
//! - Provide the in-memory move/reorder primitives used while dragging.
//! - Capture and restore whole-board snapshots.
//!
//! # Invariants
//! - Card ids are unique.
//! - `move_card` and `reorder` keep exactly the same set of ids.
//! - `reorder` never changes any status.

use crate::board::BoardSurface;
use crate::model::card::{Card, CardId, CardStatus, CardValidationError};
use std::collections::HashSet;

/// Deep copy of the whole board taken at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    cards: Vec<Card>,
}

impl BoardSnapshot {
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn into_cards(self) -> Vec<Card> {
        self.cards
    }
}

/// Result of appending generated cards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppendReport {
    /// Ids appended, in order.
    pub appended: Vec<CardId>,
    /// Ids dropped because the board already holds them.
    pub skipped: Vec<CardId>,
    /// Ids whose incoming status was not `proposed` and was normalized.
    pub normalized: Vec<CardId>,
}

/// Ordered list of all cards on the board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardCollection {
    cards: Vec<Card>,
}

impl CardCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection, rejecting empty or duplicate ids.
    pub fn try_from_cards(cards: Vec<Card>) -> Result<Self, CardValidationError> {
        let mut seen = HashSet::with_capacity(cards.len());
        for card in &cards {
            card.validate()?;
            if !seen.insert(card.id.as_str()) {
                return Err(CardValidationError::DuplicateId(card.id.clone()));
            }
        }
        Ok(Self { cards })
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.cards.iter().position(|card| card.id == id)
    }

    /// Members of one column in rank order.
    pub fn column(&self, status: CardStatus) -> Vec<&Card> {
        self.cards
            .iter()
            .filter(|card| card.status == status)
            .collect()
    }

    /// Removes a card, assigns `status`, and re-inserts it at `target_rank`
    /// among the other members of that column.
    ///
    /// A rank at or beyond the column size places the card right after the
    /// last member, or at the end of the list when the column is empty.
    /// Returns `false` (and changes nothing) for unknown ids.
    pub fn move_card(&mut self, id: &str, status: CardStatus, target_rank: usize) -> bool {
        let Some(from) = self.position(id) else {
            return false;
        };

        let card = self.cards.remove(from);
        let moved = if card.status == status {
            card
        } else {
            card.with_status(status)
        };
        let insert_at = self.insertion_index(status, target_rank);
        self.cards.insert(insert_at, moved);
        true
    }

    /// Moves `active_id` to the global index currently held by `over_id`.
    ///
    /// Stable array move: every other card keeps its relative order.
    /// Returns `false` when either id is unknown or both share one index.
    pub fn reorder(&mut self, active_id: &str, over_id: &str) -> bool {
        let (Some(from), Some(to)) = (self.position(active_id), self.position(over_id)) else {
            return false;
        };
        if from == to {
            return false;
        }

        let card = self.cards.remove(from);
        self.cards.insert(to, card);
        true
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            cards: self.cards.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: BoardSnapshot) {
        self.cards = snapshot.cards;
    }

    pub fn replace_all(&mut self, other: CardCollection) {
        self.cards = other.cards;
    }

    /// Appends generated cards at `proposed`, keeping ids unique.
    pub fn append_proposed(&mut self, incoming: Vec<Card>) -> AppendReport {
        let mut report = AppendReport::default();
        for card in incoming {
            if self.position(&card.id).is_some() {
                report.skipped.push(card.id);
                continue;
            }
            let card = if card.status == CardStatus::Proposed {
                card
            } else {
                report.normalized.push(card.id.clone());
                card.with_status(CardStatus::Proposed)
            };
            report.appended.push(card.id.clone());
            self.cards.push(card);
        }
        report
    }

    /// Swaps in a new value for the card with the same id, in place.
    pub fn replace_card(&mut self, card: Card) -> bool {
        match self.position(&card.id) {
            Some(index) => {
                self.cards[index] = card;
                true
            }
            None => false,
        }
    }

    /// Replaces one card with a copy at `status`, keeping its position.
    pub fn set_status(&mut self, id: &str, status: CardStatus) -> bool {
        match self.position(id) {
            Some(index) => {
                self.cards[index] = self.cards[index].with_status(status);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Card> {
        let index = self.position(id)?;
        Some(self.cards.remove(index))
    }

    fn insertion_index(&self, status: CardStatus, target_rank: usize) -> usize {
        let members: Vec<usize> = self
            .cards
            .iter()
            .enumerate()
            .filter(|(_, card)| card.status == status)
            .map(|(index, _)| index)
            .collect();

        match members.get(target_rank) {
            Some(&index) => index,
            None => members
                .last()
                .map(|&index| index + 1)
                .unwrap_or(self.cards.len()),
        }
    }
}

impl BoardSurface for CardCollection {
    fn card(&self, id: &str) -> Option<Card> {
        self.get(id).cloned()
    }

    fn move_card(&mut self, id: &str, status: CardStatus, target_rank: usize) -> bool {
        CardCollection::move_card(self, id, status, target_rank)
    }

    fn reorder(&mut self, active_id: &str, over_id: &str) -> bool {
        CardCollection::reorder(self, active_id, over_id)
    }

    fn snapshot(&self) -> BoardSnapshot {
        CardCollection::snapshot(self)
    }

    fn restore(&mut self, snapshot: BoardSnapshot) {
        CardCollection::restore(self, snapshot)
    }
}
