use std::fmt::Display;

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    card::{CardId, CardRef},
    game_state::{GameStatus, Versioned},
    Difficulty,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub card: CardRef,
    /// Index in the deal.
    pub placement_order: usize,
    /// 1-based timeline slot; None while the card is still in hand.
    pub placement_position: Option<usize>,
    pub is_correct: Option<bool>,
    /// Seconds.
    pub time_taken: u32,
    #[serde(default)]
    pub anchor: bool,
}

impl PlacementRecord {
    pub fn is_placed(&self) -> bool {
        self.placement_position.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SoloGame {
    pub id: Uuid,
    pub owner_id: Option<String>,
    pub cards: Vec<PlacementRecord>,
    pub difficulty: Difficulty,
    pub categories: Vec<String>,
    pub status: GameStatus,
    pub time_started: DateTime<Utc>,
    pub time_ended: Option<DateTime<Utc>>,
    pub duration_secs: Option<i64>,
    pub score: u32,
    pub correct_placements: usize,
    pub incorrect_placements: usize,
    pub unplaced_cards: usize,
    pub is_win: bool,
    #[serde(default)]
    pub revision: u64,
}

impl SoloGame {
    pub fn record(&self, card_id: &CardId) -> Option<&PlacementRecord> {
        self.cards.iter().find(|r| r.card.id() == card_id)
    }

    pub fn record_mut(&mut self, card_id: &CardId) -> Option<&mut PlacementRecord> {
        self.cards.iter_mut().find(|r| r.card.id() == card_id)
    }

    pub fn anchor(&self) -> Option<&PlacementRecord> {
        self.cards.iter().find(|r| r.anchor)
    }

    pub fn hand(&self) -> impl Iterator<Item = &PlacementRecord> {
        self.cards.iter().filter(|r| !r.is_placed())
    }

    /// Placed cards ordered by their slot.
    pub fn timeline(&self) -> Vec<&PlacementRecord> {
        self.cards
            .iter()
            .filter(|r| r.is_placed())
            .sorted_by_key(|r| (r.placement_position, r.placement_order))
            .collect()
    }
}

impl Versioned for SoloGame {
    fn id(&self) -> Uuid {
        self.id
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn set_revision(&mut self, revision: u64) {
        self.revision = revision;
    }

    fn status(&self) -> GameStatus {
        self.status
    }
}

impl Display for SoloGame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let timeline_str = self
            .timeline()
            .iter()
            .map(|r| {
                let mark = match r.is_correct {
                    Some(true) => "",
                    Some(false) => "(x)",
                    None => "(?)",
                };
                format!(
                    "{}:{}{mark}",
                    r.placement_position.unwrap_or_default(),
                    r.card.id()
                )
            })
            .join(", ");
        let hand_str = self.hand().map(|r| r.card.id().to_string()).join(", ");
        write!(
            f,
            "\nSolo game {} ({}), score {}\nTimeline: {}\nHand: {}",
            self.id, self.status, self.score, timeline_str, hand_str
        )
    }
}
