use types::{CallerIdentity, CardId, CardRef, GameStatus, MultiplayerGame, TimelineEntry};
use uuid::Uuid;

use crate::{
    cards,
    identity::resolve_player,
    placement::{self, PlacementOutcome},
    session::complete,
    GameError, MultiplayerService,
};

impl MultiplayerService {
    /// Plays `card_id` from the caller's hand into the shared timeline at the
    /// 0-based insertion index `position`, then passes the turn on.
    ///
    /// The card joins the timeline whether or not the guess was right; only
    /// the score and the placement counters differ.
    pub async fn place_card(
        &self,
        game_id: Uuid,
        identity: &CallerIdentity,
        card_id: &CardId,
        position: usize,
    ) -> Result<PlacementOutcome<MultiplayerGame>, GameError> {
        let mut game = self.get_game(game_id).await?;
        let idx = resolve_player(&game, identity)?;
        if game.status != GameStatus::InProgress {
            return Err(GameError::GameNotInProgress(game.status));
        }
        if game.current_player_index != idx {
            return Err(GameError::NotYourTurn);
        }
        if !game.players[idx].holds(card_id) {
            return Err(GameError::CardNotInGame(card_id.clone()));
        }
        if position > game.timeline.len() {
            return Err(GameError::InvalidPosition {
                position,
                min: 0,
                max: game.timeline.len(),
            });
        }

        game.timeline.sort_by_key(|entry| entry.position);
        let timeline_refs: Vec<&CardRef> = game.timeline.iter().map(|e| &e.card).collect();
        let timeline = cards::resolve_all(self.catalog(), timeline_refs).await?;
        let entry = game.players[idx]
            .take_card(card_id)
            .ok_or_else(|| GameError::CardNotInGame(card_id.clone()))?;
        let candidate = cards::resolve(self.catalog(), &entry.card).await?;
        let band = placement::insertion_band(&timeline, &candidate);
        let is_correct = band.contains(&position);

        game.timeline.insert(
            position,
            TimelineEntry {
                card: entry.card,
                position,
            },
        );
        for (slot, entry) in game.timeline.iter_mut().enumerate() {
            entry.position = slot;
        }

        let player = &mut game.players[idx];
        if is_correct {
            player.score += self.config.points_per_correct;
            player.correct_placements += 1;
        } else {
            player.incorrect_placements += 1;
        }
        log::debug!(
            "Room {}: {} placed {candidate} at {position} ({})",
            game.room_code,
            player.username,
            if is_correct { "correct" } else { "wrong" }
        );

        game.current_player_index = game.next_to_play_after(idx).unwrap_or(idx);
        if game.hands_exhausted() {
            let winners = game.top_scorers();
            complete(&mut game, winners);
            log::info!("Room {} finished: every hand is empty", game.room_code);
        }

        self.store.save_multiplayer(&mut game).await?;
        Ok(PlacementOutcome {
            game,
            is_correct,
            correct_position: *band.start(),
        })
    }

    /// Host-only early finish. Winners are the active players with the top
    /// score.
    pub async fn end_game(
        &self,
        game_id: Uuid,
        identity: &CallerIdentity,
    ) -> Result<MultiplayerGame, GameError> {
        let mut game = self.get_game(game_id).await?;
        let idx = resolve_player(&game, identity)?;
        if game.players[idx].id != game.host_player_id {
            return Err(GameError::NotAuthorized);
        }
        if game.status != GameStatus::InProgress {
            return Err(GameError::GameNotInProgress(game.status));
        }

        let winners = game.top_scorers();
        complete(&mut game, winners);
        self.store.save_multiplayer(&mut game).await?;
        log::info!("Room {} ended by the host", game.room_code);
        Ok(game)
    }
}
