//! Multiplayer room lifecycle: creating a room, seats coming and going, and
//! dealing when the host starts the game. Turn play lives in `turns`.

use std::sync::Arc;

use chrono::Utc;
use database::{CardCatalog, CardFilter, DatabaseError, GameStore};
use rand::thread_rng;
use types::{
    CallerIdentity, Difficulty, DrawEntry, GameStatus, MultiplayerGame, PlayerState, TimelineEntry,
};
use uuid::Uuid;

use crate::{
    identity::{find_player, resolve_player},
    room_code::{generate_room_code, normalize},
    EngineConfig, GameError,
};

#[derive(Clone, Debug)]
pub struct NewRoom {
    pub host_nickname: Option<String>,
    pub difficulty: Difficulty,
    pub categories: Vec<String>,
    /// Falls back to the configured default.
    pub max_players: Option<usize>,
}

#[derive(Clone)]
pub struct MultiplayerService {
    pub(crate) store: Arc<dyn GameStore>,
    pub(crate) catalog: Arc<dyn CardCatalog>,
    pub(crate) config: EngineConfig,
}

impl MultiplayerService {
    pub fn new(
        store: Arc<dyn GameStore>,
        catalog: Arc<dyn CardCatalog>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            catalog,
            config,
        }
    }

    pub fn catalog(&self) -> &dyn CardCatalog {
        self.catalog.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Opens a waiting room with the caller seated as host.
    pub async fn create_game(
        &self,
        identity: &CallerIdentity,
        settings: NewRoom,
    ) -> Result<MultiplayerGame, GameError> {
        let max_players = settings
            .max_players
            .unwrap_or(self.config.default_max_players);
        if max_players < 2 {
            return Err(GameError::InvalidMaxPlayers(max_players));
        }

        let available = self.catalog.count(&CardFilter::any()).await?;
        if available < self.config.min_catalog_cards {
            return Err(GameError::InsufficientCards {
                needed: self.config.min_catalog_cards,
                available,
            });
        }

        let nickname = identity
            .resolve_nickname(settings.host_nickname.as_deref())
            .ok_or(GameError::MissingNickname)?;
        let host = PlayerState::new(
            identity.authenticated_user_id.clone(),
            identity.guest_id.clone(),
            nickname,
        );

        for attempt in 1..=self.config.room_code_attempts {
            let room_code = generate_room_code(&mut thread_rng());
            if self.store.find_active_room(&room_code).await?.is_some() {
                log::debug!("Room code {room_code} in use (attempt {attempt})");
                continue;
            }

            let game = MultiplayerGame {
                id: Uuid::new_v4(),
                room_code,
                status: GameStatus::Waiting,
                difficulty: settings.difficulty,
                max_players,
                categories: settings.categories.clone(),
                host_player_id: host.id,
                players: vec![host.clone()],
                current_player_index: 0,
                timeline: vec![],
                draw_pile: vec![],
                time_created: Utc::now(),
                time_started: None,
                time_completed: None,
                winners: vec![],
                revision: 0,
            };
            match self.store.insert_multiplayer(&game).await {
                Ok(()) => {
                    log::info!(
                        "{} opened room {} ({} seats, {})",
                        host.username,
                        game.room_code,
                        max_players,
                        game.difficulty
                    );
                    return Ok(game);
                }
                Err(DatabaseError::RoomCodeTaken(code)) => {
                    log::debug!("Lost the race for room code {code} (attempt {attempt})");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(GameError::RoomCodeExhausted(self.config.room_code_attempts))
    }

    /// Seats the caller in the room, or returns them to the seat they left.
    /// Joining a seat that is already active changes nothing.
    pub async fn join_game(
        &self,
        room_code: &str,
        identity: &CallerIdentity,
        username: Option<&str>,
    ) -> Result<MultiplayerGame, GameError> {
        let code = normalize(room_code);
        let found = self.store.find_active_room(&code).await?;
        let mut game = found.ok_or(GameError::RoomNotFound(code))?;

        let hint = identity.resolve_nickname(username);
        if let Some(idx) = find_player(&game, identity, hint.as_deref()) {
            if game.players[idx].is_active {
                return Ok(game);
            }
            let seat = &mut game.players[idx];
            seat.is_active = true;
            if seat.user_id.is_none() && seat.guest_id.is_none() {
                seat.guest_id = identity.guest_id.clone();
            }
            let idx = promote_if_host_absent(&mut game, idx);
            self.store.save_multiplayer(&mut game).await?;
            log::info!("{} rejoined room {}", game.players[idx].username, game.room_code);
            return Ok(game);
        }

        if game.status != GameStatus::Waiting {
            return Err(GameError::RoomNotJoinable(game.status));
        }
        if game.players.len() >= game.max_players {
            return Err(GameError::RoomFull(game.max_players));
        }
        let nickname = hint.ok_or(GameError::MissingNickname)?;

        game.players.push(PlayerState::new(
            identity.authenticated_user_id.clone(),
            identity.guest_id.clone(),
            nickname,
        ));
        let last = game.players.len() - 1;
        let idx = promote_if_host_absent(&mut game, last);
        self.store.save_multiplayer(&mut game).await?;
        log::info!(
            "{} joined room {} ({}/{})",
            game.players[idx].username,
            game.room_code,
            game.players.len(),
            game.max_players
        );
        Ok(game)
    }

    /// Deactivates the caller's seat. A departing host hands the room to the
    /// next active seat, and a game left with one active player ends with
    /// that player as the winner.
    pub async fn leave_game(
        &self,
        game_id: Uuid,
        identity: &CallerIdentity,
    ) -> Result<MultiplayerGame, GameError> {
        let mut game = self.get_game(game_id).await?;
        let idx = resolve_player(&game, identity)?;
        if game.status.is_terminal() {
            return Err(GameError::GameNotInProgress(game.status));
        }
        if !game.players[idx].is_active {
            return Ok(game);
        }

        game.players[idx].is_active = false;
        let username = game.players[idx].username.clone();

        if game.status == GameStatus::InProgress && game.current_player_index == idx {
            if let Some(next) = game.next_to_play_after(idx) {
                game.current_player_index = next;
            }
        }

        if idx == 0 {
            if let Some(heir) = (1..game.players.len()).find(|&i| game.players[i].is_active) {
                swap_into_host(&mut game, heir);
                log::info!("{} is now host of room {}", game.players[0].username, game.room_code);
            }
        }

        if game.status == GameStatus::InProgress && game.active_count() <= 1 {
            let winners = game.active_indices();
            complete(&mut game, winners);
        } else if game.status == GameStatus::InProgress && game.hands_exhausted() {
            let winners = game.top_scorers();
            complete(&mut game, winners);
            log::info!("Room {} finished: no one left holds cards", game.room_code);
        }

        self.store.save_multiplayer(&mut game).await?;
        log::info!("{username} left room {}", game.room_code);
        Ok(game)
    }

    /// Deals the game. Only the host may start, and only with two or more
    /// active players.
    pub async fn start_game(
        &self,
        game_id: Uuid,
        identity: &CallerIdentity,
    ) -> Result<MultiplayerGame, GameError> {
        let mut game = self.get_game(game_id).await?;
        if game.status != GameStatus::Waiting {
            return Err(GameError::RoomNotWaiting(game.status));
        }
        let caller = find_player(&game, identity, identity.resolve_nickname(None).as_deref());
        if caller.map(|idx| game.players[idx].id) != Some(game.host_player_id) {
            return Err(GameError::NotAuthorized);
        }
        let active = game.active_indices();
        if active.len() < 2 {
            return Err(GameError::NotEnoughPlayers(active.len()));
        }

        let per_player = game.difficulty.cards_per_player();
        let needed = per_player * game.players.len() + 1;
        let filter = CardFilter::new(None, &game.categories);
        let deck = self.catalog.sample(&filter, needed).await?;
        if deck.len() < needed {
            return Err(GameError::InsufficientCards {
                needed,
                available: deck.len(),
            });
        }

        let (first, rest) = deck.split_first().ok_or(GameError::InsufficientCards {
            needed,
            available: 0,
        })?;
        game.timeline = vec![TimelineEntry {
            card: first.into(),
            position: 0,
        }];
        game.draw_pile = rest
            .iter()
            .enumerate()
            .map(|(draw_order, card)| DrawEntry {
                card: card.into(),
                draw_order,
            })
            .collect();
        for &idx in &active {
            game.players[idx].cards = game.draw_pile.drain(..per_player).collect();
        }

        game.current_player_index = active[0];
        game.status = GameStatus::InProgress;
        game.time_started = Some(Utc::now());

        self.store.save_multiplayer(&mut game).await?;
        log::info!(
            "Room {} started: {} players, {} cards each, {} left in the pile",
            game.room_code,
            active.len(),
            per_player,
            game.draw_pile.len()
        );
        Ok(game)
    }

    pub async fn get_game(&self, game_id: Uuid) -> Result<MultiplayerGame, GameError> {
        self.store
            .load_multiplayer(game_id)
            .await?
            .ok_or(GameError::GameNotFound(game_id))
    }

    pub async fn find_by_room_code(&self, room_code: &str) -> Result<MultiplayerGame, GameError> {
        let code = normalize(room_code);
        let found = self.store.find_active_room(&code).await?;
        found.ok_or(GameError::RoomNotFound(code))
    }
}

/// Moves the seat at `idx` into the host slot, keeping the turn pointer on
/// the same player.
pub(crate) fn swap_into_host(game: &mut MultiplayerGame, idx: usize) {
    game.players.swap(0, idx);
    if game.current_player_index == 0 {
        game.current_player_index = idx;
    } else if game.current_player_index == idx {
        game.current_player_index = 0;
    }
    game.host_player_id = game.players[0].id;
}

/// Hands the room to the seat at `idx` when the host seat is empty. Returns
/// the seat's index afterwards.
fn promote_if_host_absent(game: &mut MultiplayerGame, idx: usize) -> usize {
    if idx != 0 && !game.players[0].is_active {
        swap_into_host(game, idx);
        0
    } else {
        idx
    }
}

pub(crate) fn complete(game: &mut MultiplayerGame, winners: Vec<usize>) {
    game.status = GameStatus::Completed;
    game.time_completed = Some(Utc::now());
    game.winners = winners;
}
