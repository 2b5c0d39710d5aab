//! Drives games to completion with [`PlacementStrategy`] seats, the way a
//! client would: reload, decide, place, repeat.

use std::time::Duration;

use database::retry_with_backoff;
use itertools::Itertools;
use tokio::time::sleep;
use types::{CallerIdentity, CardRef, MultiplayerGame, PlacementStrategy, PlacementView, SoloGame};
use uuid::Uuid;

use crate::{
    cards,
    identity::find_player,
    GameError, MultiplayerService, SoloGameService,
};

/// Pause between attempts after losing a revision race.
const STALE_RETRY_DELAY: Duration = Duration::from_millis(25);

/// A player in a simulated room: who they are and how they choose.
#[derive(Debug)]
pub struct Seat {
    pub identity: CallerIdentity,
    pub strategy: Box<dyn PlacementStrategy>,
}

impl Seat {
    pub fn new(identity: CallerIdentity, strategy: Box<dyn PlacementStrategy>) -> Self {
        Self { identity, strategy }
    }
}

pub async fn solo_view(service: &SoloGameService, game: &SoloGame) -> Result<PlacementView, GameError> {
    let catalog = service.catalog();
    let timeline: Vec<&CardRef> = game.timeline().into_iter().map(|r| &r.card).collect();
    let hand: Vec<&CardRef> = game.hand().map(|r| &r.card).collect();
    let deal: Vec<&CardRef> = game.cards.iter().map(|r| &r.card).collect();
    Ok(PlacementView {
        timeline: cards::resolve_all(catalog, timeline).await?,
        hand: cards::resolve_all(catalog, hand).await?,
        ranked_against: cards::resolve_all(catalog, deal).await?,
        position_base: 1,
    })
}

pub async fn multiplayer_view(
    service: &MultiplayerService,
    game: &MultiplayerGame,
    player_idx: usize,
) -> Result<PlacementView, GameError> {
    let catalog = service.catalog();
    let timeline_refs: Vec<&CardRef> = game
        .timeline
        .iter()
        .sorted_by_key(|entry| entry.position)
        .map(|entry| &entry.card)
        .collect();
    let hand_refs: Vec<&CardRef> = game.players[player_idx].cards.iter().map(|e| &e.card).collect();
    let timeline = cards::resolve_all(catalog, timeline_refs).await?;
    let hand = cards::resolve_all(catalog, hand_refs).await?;
    Ok(PlacementView {
        ranked_against: timeline.clone(),
        timeline,
        hand,
        position_base: 0,
    })
}

/// Places every card in hand, then scores the game.
pub async fn run_solo_game(
    service: &SoloGameService,
    game_id: Uuid,
    strategy: &mut dyn PlacementStrategy,
    delay_ms: Option<u64>,
) -> Result<SoloGame, GameError> {
    loop {
        let game = service.get_game(game_id).await?;
        if game.status.is_terminal() {
            return Ok(game);
        }
        if game.hand().next().is_none() {
            return service.end_game(game_id).await;
        }
        log::debug!("{game}");
        if let Some(ms) = delay_ms {
            sleep(Duration::from_millis(ms)).await;
        }

        let view = solo_view(service, &game).await?;
        let placement = strategy.select_placement(&view);
        service
            .place_card(game_id, &placement.card_id, placement.position, placement.time_taken)
            .await?;
    }
}

/// Plays a started room until it completes. Each turn the seat whose player
/// holds the turn is asked for a placement.
pub async fn run_multiplayer_game(
    service: &MultiplayerService,
    game_id: Uuid,
    seats: &mut [Seat],
    delay_ms: Option<u64>,
) -> Result<MultiplayerGame, GameError> {
    loop {
        let game = service.get_game(game_id).await?;
        if game.status.is_terminal() {
            log::info!(
                "Winners: {}",
                game.winners
                    .iter()
                    .map(|&idx| game.players[idx].username.as_str())
                    .join(", ")
            );
            return Ok(game);
        }
        log::debug!("{game}");
        if let Some(ms) = delay_ms {
            sleep(Duration::from_millis(ms)).await;
        }

        let current = game.current_player_index;
        if game.players[current].cards.is_empty() {
            log::warn!(
                "Room {}: {} holds the turn with an empty hand, ending the game",
                game.room_code,
                game.players[current].username
            );
            let host = seats
                .iter()
                .find(|seat| {
                    let name = seat.identity.resolve_nickname(None);
                    find_player(&game, &seat.identity, name.as_deref()) == Some(0)
                })
                .ok_or(GameError::NotAuthorized)?;
            service.end_game(game_id, &host.identity).await?;
            continue;
        }

        let seat = seats
            .iter_mut()
            .find(|seat| {
                let name = seat.identity.resolve_nickname(None);
                find_player(&game, &seat.identity, name.as_deref()) == Some(current)
            })
            .ok_or(GameError::PlayerNotInGame(game_id))?;

        let view = multiplayer_view(service, &game, current).await?;
        let placement = seat.strategy.select_placement(&view);
        let identity = seat.identity.clone();
        retry_with_backoff(
            || {
                let service = service.clone();
                let identity = identity.clone();
                let card_id = placement.card_id.clone();
                let position = placement.position;
                Box::pin(async move {
                    service
                        .place_card(game_id, &identity, &card_id, position)
                        .await
                })
            },
            service.config().stale_write_retries,
            STALE_RETRY_DELAY,
            GameError::is_conflict,
        )
        .await?;
    }
}
