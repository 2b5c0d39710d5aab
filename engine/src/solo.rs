use std::sync::Arc;

use chrono::Utc;
use database::{CardCatalog, CardFilter, GameStore};
use types::{CardId, CardRef, Difficulty, GameStatus, PlacementRecord, SoloGame};
use uuid::Uuid;

use crate::{cards, placement, GameError, PlacementOutcome};

#[derive(Clone, Debug)]
pub struct NewSoloGame {
    pub difficulty: Difficulty,
    pub card_count: usize,
    pub categories: Vec<String>,
}

/// Single-player games: deal, place, score.
#[derive(Clone)]
pub struct SoloGameService {
    store: Arc<dyn GameStore>,
    catalog: Arc<dyn CardCatalog>,
}

impl SoloGameService {
    pub fn new(store: Arc<dyn GameStore>, catalog: Arc<dyn CardCatalog>) -> Self {
        Self { store, catalog }
    }

    pub fn catalog(&self) -> &dyn CardCatalog {
        self.catalog.as_ref()
    }

    /// Deals `card_count` cards and pre-places the middle one as the anchor.
    pub async fn create_game(
        &self,
        owner_id: Option<String>,
        settings: NewSoloGame,
    ) -> Result<SoloGame, GameError> {
        let card_count = settings.card_count;
        if card_count < 2 {
            return Err(GameError::InvalidCardCount(card_count));
        }

        let filter = CardFilter::new(Some(settings.difficulty), &settings.categories);
        let available = self.catalog.count(&filter).await?;
        if available < card_count {
            return Err(GameError::InsufficientCards {
                needed: card_count,
                available,
            });
        }
        let dealt = self.catalog.sample(&filter, card_count).await?;
        if dealt.len() < card_count {
            return Err(GameError::InsufficientCards {
                needed: card_count,
                available: dealt.len(),
            });
        }

        let anchor_idx = card_count / 2;
        let cards = dealt
            .iter()
            .enumerate()
            .map(|(order, card)| {
                let anchor = order == anchor_idx;
                PlacementRecord {
                    card: card.into(),
                    placement_order: order,
                    placement_position: anchor.then_some(anchor_idx + 1),
                    is_correct: anchor.then_some(true),
                    time_taken: 0,
                    anchor,
                }
            })
            .collect();

        let game = SoloGame {
            id: Uuid::new_v4(),
            owner_id,
            cards,
            difficulty: settings.difficulty,
            categories: settings.categories,
            status: GameStatus::InProgress,
            time_started: Utc::now(),
            time_ended: None,
            duration_secs: None,
            score: 0,
            correct_placements: 0,
            incorrect_placements: 0,
            unplaced_cards: card_count - 1,
            is_win: false,
            revision: 0,
        };
        self.store.insert_solo(&game).await?;
        log::info!(
            "Created solo game {} with {card_count} {} cards, anchor {}",
            game.id,
            game.difficulty,
            dealt[anchor_idx]
        );
        Ok(game)
    }

    pub async fn get_game(&self, game_id: Uuid) -> Result<SoloGame, GameError> {
        self.store
            .load_solo(game_id)
            .await?
            .ok_or(GameError::GameNotFound(game_id))
    }

    /// Records `card_id` at the 1-based `position`. Correctness is judged by
    /// the card's rank among the whole deal, so a card may be placed (or moved)
    /// before its neighbours are on the timeline.
    pub async fn place_card(
        &self,
        game_id: Uuid,
        card_id: &CardId,
        position: usize,
        time_taken: u32,
    ) -> Result<PlacementOutcome<SoloGame>, GameError> {
        let mut game = self.get_game(game_id).await?;
        if game.status != GameStatus::InProgress {
            return Err(GameError::GameNotInProgress(game.status));
        }
        let record = game
            .record(card_id)
            .ok_or_else(|| GameError::CardNotInGame(card_id.clone()))?;
        if record.anchor {
            return Err(GameError::AnchorLocked);
        }
        let total = game.cards.len();
        if position < 1 || position > total {
            return Err(GameError::InvalidPosition {
                position,
                min: 1,
                max: total,
            });
        }

        let deal_refs: Vec<&CardRef> = game.cards.iter().map(|r| &r.card).collect();
        let deal = cards::resolve_all(self.catalog(), deal_refs).await?;
        let band = placement::placement_band(&deal, card_id)
            .ok_or_else(|| GameError::CardNotInGame(card_id.clone()))?;
        let is_correct = band.contains(&position);

        let record = game
            .record_mut(card_id)
            .ok_or_else(|| GameError::CardNotInGame(card_id.clone()))?;
        record.placement_position = Some(position);
        record.time_taken = time_taken;
        record.is_correct = Some(is_correct);
        game.unplaced_cards = game.hand().count();

        self.store.save_solo(&mut game).await?;
        log::debug!(
            "Solo game {game_id}: placed {card_id} at {position} ({})",
            if is_correct { "correct" } else { "wrong" }
        );
        Ok(PlacementOutcome {
            game,
            is_correct,
            correct_position: *band.start(),
        })
    }

    /// Scores the game and closes it. Ending a completed game returns it as is.
    pub async fn end_game(&self, game_id: Uuid) -> Result<SoloGame, GameError> {
        let mut game = self.get_game(game_id).await?;
        match game.status {
            GameStatus::Completed => {
                log::debug!("Solo game {game_id} already completed");
                return Ok(game);
            }
            GameStatus::InProgress => {}
            status => return Err(GameError::GameNotInProgress(status)),
        }

        let scored = game.cards.iter().filter(|r| !r.anchor);
        let (correct, incorrect, unplaced) =
            scored.fold((0, 0, 0), |(correct, incorrect, unplaced), r| {
                match (r.is_placed(), r.is_correct) {
                    (false, _) => (correct, incorrect, unplaced + 1),
                    (true, Some(true)) => (correct + 1, incorrect, unplaced),
                    (true, _) => (correct, incorrect + 1, unplaced),
                }
            });
        let denominator = game.cards.len().saturating_sub(1).max(1);
        let now = Utc::now();

        game.correct_placements = correct;
        game.incorrect_placements = incorrect;
        game.unplaced_cards = unplaced;
        game.score = ((correct as f64 / denominator as f64) * 100.0).round() as u32;
        game.is_win = unplaced == 0 && incorrect == 0;
        game.status = GameStatus::Completed;
        game.time_ended = Some(now);
        game.duration_secs = Some((now - game.time_started).num_seconds());

        self.store.save_solo(&mut game).await?;
        log::info!(
            "Solo game {game_id} finished: score {}, {} right, {} wrong, {} unplaced, {}",
            game.score,
            correct,
            incorrect,
            unplaced,
            if game.is_win { "won" } else { "lost" }
        );
        Ok(game)
    }

    pub async fn abandon_game(&self, game_id: Uuid) -> Result<SoloGame, GameError> {
        let mut game = self.get_game(game_id).await?;
        if game.status != GameStatus::InProgress {
            return Err(GameError::GameNotInProgress(game.status));
        }
        game.status = GameStatus::Abandoned;
        game.time_ended = Some(Utc::now());
        self.store.save_solo(&mut game).await?;
        log::info!("Solo game {game_id} abandoned");
        Ok(game)
    }
}
