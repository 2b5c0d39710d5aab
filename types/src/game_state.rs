use std::fmt::Display;

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{card::CardRef, Difficulty, PlayerState};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Waiting,
    InProgress,
    Completed,
    Abandoned,
}

impl GameStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameStatus::Completed | GameStatus::Abandoned)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Waiting => "waiting",
            GameStatus::InProgress => "in_progress",
            GameStatus::Completed => "completed",
            GameStatus::Abandoned => "abandoned",
        }
    }
}

impl Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A game document that is persisted whole and guarded by a revision counter.
pub trait Versioned {
    fn id(&self) -> Uuid;
    fn revision(&self) -> u64;
    fn set_revision(&mut self, revision: u64);
    fn status(&self) -> GameStatus;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub card: CardRef,
    pub position: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawEntry {
    pub card: CardRef,
    pub draw_order: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MultiplayerGame {
    pub id: Uuid,
    pub room_code: String,
    pub status: GameStatus,
    pub difficulty: Difficulty,
    pub max_players: usize,
    pub categories: Vec<String>,
    pub players: Vec<PlayerState>,
    /// Always the slot id of `players[0]`.
    pub host_player_id: Uuid,
    pub current_player_index: usize,
    pub timeline: Vec<TimelineEntry>,
    pub draw_pile: Vec<DrawEntry>,
    pub time_created: DateTime<Utc>,
    pub time_started: Option<DateTime<Utc>>,
    pub time_completed: Option<DateTime<Utc>>,
    /// Indices into `players`.
    pub winners: Vec<usize>,
    #[serde(default)]
    pub revision: u64,
}

impl MultiplayerGame {
    pub fn host(&self) -> Option<&PlayerState> {
        self.players.first()
    }

    pub fn active_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_active).count()
    }

    pub fn active_indices(&self) -> Vec<usize> {
        self.players
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_active)
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn current_player(&self) -> Option<&PlayerState> {
        self.players.get(self.current_player_index)
    }

    /// Next active slot strictly after `from`, scanning circularly. May come
    /// back around to `from` itself when it is the only active slot.
    pub fn next_active_after(&self, from: usize) -> Option<usize> {
        let len = self.players.len();
        (1..=len)
            .map(|step| (from + step) % len)
            .find(|&idx| self.players[idx].is_active)
    }

    /// Next active slot after `from` that still has cards to play, falling
    /// back to [`Self::next_active_after`] once every active hand is empty.
    pub fn next_to_play_after(&self, from: usize) -> Option<usize> {
        let len = self.players.len();
        (1..=len)
            .map(|step| (from + step) % len)
            .find(|&idx| self.players[idx].is_active && !self.players[idx].cards.is_empty())
            .or_else(|| self.next_active_after(from))
    }

    pub fn player_index(&self, slot_id: Uuid) -> Option<usize> {
        self.players.iter().position(|p| p.id == slot_id)
    }

    /// True once every active player has emptied their hand.
    pub fn hands_exhausted(&self) -> bool {
        self.players
            .iter()
            .filter(|p| p.is_active)
            .all(|p| p.cards.is_empty())
    }

    /// Active players sharing the highest score.
    pub fn top_scorers(&self) -> Vec<usize> {
        let best = self
            .players
            .iter()
            .filter(|p| p.is_active)
            .map(|p| p.score)
            .max();
        match best {
            None => vec![],
            Some(best) => self
                .players
                .iter()
                .enumerate()
                .filter(|(_, p)| p.is_active && p.score == best)
                .map(|(idx, _)| idx)
                .collect(),
        }
    }
}

impl Versioned for MultiplayerGame {
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

impl Display for MultiplayerGame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let timeline_str = self
            .timeline
            .iter()
            .map(|entry| entry.card.id().to_string())
            .join(" < ");
        let players_str = self
            .players
            .iter()
            .enumerate()
            .map(|(idx, player)| {
                let marker = if idx == self.current_player_index {
                    "*"
                } else {
                    " "
                };
                format!("{marker}{player}")
            })
            .join("\n");
        write!(
            f,
            "\nRoom {} ({}), Timeline: {}\nPlayers:\n{}",
            self.room_code, self.status, timeline_str, players_str
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game_with(active: &[bool]) -> MultiplayerGame {
        let players: Vec<PlayerState> = active
            .iter()
            .enumerate()
            .map(|(idx, &is_active)| {
                let mut player = PlayerState::new(None, None, format!("p{idx}"));
                player.is_active = is_active;
                player
            })
            .collect();
        MultiplayerGame {
            id: Uuid::new_v4(),
            room_code: "ABC123".to_string(),
            status: GameStatus::InProgress,
            difficulty: Difficulty::Easy,
            max_players: 4,
            categories: vec![],
            host_player_id: players[0].id,
            players,
            current_player_index: 0,
            timeline: vec![],
            draw_pile: vec![],
            time_created: Utc::now(),
            time_started: None,
            time_completed: None,
            winners: vec![],
            revision: 0,
        }
    }

    #[test]
    fn test_next_active_after_skips_inactive_and_wraps() {
        let game = game_with(&[true, false, true, false]);
        assert_eq!(game.next_active_after(0), Some(2));
        assert_eq!(game.next_active_after(2), Some(0));
        assert_eq!(game.next_active_after(1), Some(2));
    }

    #[test]
    fn test_next_active_after_returns_self_when_alone() {
        let game = game_with(&[false, true, false]);
        assert_eq!(game.next_active_after(1), Some(1));
        let game = game_with(&[false, false]);
        assert_eq!(game.next_active_after(0), None);
    }

    #[test]
    fn test_next_to_play_skips_empty_hands() {
        let mut game = game_with(&[true, true, true]);
        game.players[2].cards.push(DrawEntry {
            card: CardRef::Ref {
                id: "late".into(),
            },
            draw_order: 0,
        });
        assert_eq!(game.next_to_play_after(2), Some(2));
        assert_eq!(game.next_to_play_after(0), Some(2));
        game.players[2].cards.clear();
        assert_eq!(game.next_to_play_after(0), Some(1));
    }

    #[test]
    fn test_top_scorers_share_ties() {
        let mut game = game_with(&[true, true, false]);
        game.players[0].score = 3;
        game.players[1].score = 3;
        game.players[2].score = 9;
        assert_eq!(game.top_scorers(), vec![0, 1]);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(GameStatus::Completed.is_terminal());
        assert!(GameStatus::Abandoned.is_terminal());
        assert!(!GameStatus::Waiting.is_terminal());
        assert_eq!(
            serde_json::to_value(GameStatus::InProgress).unwrap(),
            "in_progress"
        );
    }
}
