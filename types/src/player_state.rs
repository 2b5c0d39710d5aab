use std::fmt::{Debug, Display};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{card::CardId, game_state::DrawEntry};

/// One seat in a multiplayer room. Seats are never removed, only deactivated.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: Uuid,
    /// None for guests.
    pub user_id: Option<String>,
    /// Guest id the seat was claimed with, if any.
    #[serde(default)]
    pub guest_id: Option<String>,
    pub username: String,
    pub cards: Vec<DrawEntry>,
    pub is_active: bool,
    pub score: u32,
    pub correct_placements: u32,
    pub incorrect_placements: u32,
}

impl PartialEq for PlayerState {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Display for PlayerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{} score {} ({} right, {} wrong) hand: {}",
            self.username,
            if self.is_active { "" } else { " [left]" },
            self.score,
            self.correct_placements,
            self.incorrect_placements,
            self.cards.iter().map(|entry| entry.card.id()).join(", ")
        )
    }
}

impl PlayerState {
    pub fn new(user_id: Option<String>, guest_id: Option<String>, username: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            guest_id,
            username,
            cards: Vec::new(),
            is_active: true,
            score: 0,
            correct_placements: 0,
            incorrect_placements: 0,
        }
    }

    pub fn holds(&self, card_id: &CardId) -> bool {
        self.cards.iter().any(|entry| entry.card.id() == card_id)
    }

    /// Removes the card from the hand, returning its entry.
    pub fn take_card(&mut self, card_id: &CardId) -> Option<DrawEntry> {
        let idx = self
            .cards
            .iter()
            .position(|entry| entry.card.id() == card_id)?;
        Some(self.cards.remove(idx))
    }
}
