use std::{sync::Arc, time::Duration};

use database::{GameStore, MemoryCatalog, MemoryGameStore};
use engine::{
    run_multiplayer_game, run_solo_game, spawn_poller, EngineConfig, ErrorKind, GameError,
    MultiplayerService, NewRoom, NewSoloGame, Seat, SoloGameService,
};
use strategies::{DefaultStrategy, RandomStrategy};
use types::{CallerIdentity, Card, CardId, Difficulty, GameStatus, MultiplayerGame};

/// Cards dated 1000, 1010, 1020, ... in catalog order, so deals are
/// predictable.
fn deck(n: usize) -> Vec<Card> {
    (0..n)
        .map(|i| Card {
            id: CardId::new(format!("c{i}")),
            title: format!("Event {i}"),
            year: 1000 + 10 * i as i32,
            month: None,
            day: None,
            category: if i % 2 == 0 { "history" } else { "science" }.to_string(),
            difficulty: Difficulty::Easy,
        })
        .collect()
}

struct Fixture {
    store: Arc<MemoryGameStore>,
    service: MultiplayerService,
}

fn fixture(cards: usize) -> Fixture {
    let store = Arc::new(MemoryGameStore::new());
    let service = MultiplayerService::new(
        store.clone(),
        Arc::new(MemoryCatalog::in_order(deck(cards))),
        EngineConfig::default(),
    );
    Fixture { store, service }
}

fn guest(n: usize) -> CallerIdentity {
    let names = ["Ada", "Grace", "Linus", "Barbara", "Ken"];
    CallerIdentity::guest(format!("guest-{n}"), names[n])
}

fn easy_room() -> NewRoom {
    NewRoom {
        host_nickname: None,
        difficulty: Difficulty::Easy,
        categories: vec![],
        max_players: None,
    }
}

/// Opens a room hosted by guest 0 and seats guests 1..players.
async fn seated_room(service: &MultiplayerService, players: usize) -> MultiplayerGame {
    let room = service.create_game(&guest(0), easy_room()).await.unwrap();
    let mut game = room;
    for n in 1..players {
        game = service
            .join_game(&game.room_code, &guest(n), None)
            .await
            .unwrap();
    }
    game
}

async fn started_room(service: &MultiplayerService, players: usize) -> MultiplayerGame {
    let room = seated_room(service, players).await;
    service.start_game(room.id, &guest(0)).await.unwrap()
}

fn hand_ids(game: &MultiplayerGame, idx: usize) -> Vec<String> {
    game.players[idx]
        .cards
        .iter()
        .map(|entry| entry.card.id().to_string())
        .collect()
}

#[tokio::test]
async fn test_create_room_seats_host() {
    let f = fixture(20);
    let room = f.service.create_game(&guest(0), easy_room()).await.unwrap();

    assert_eq!(room.status, GameStatus::Waiting);
    assert_eq!(room.room_code.len(), 6);
    assert_eq!(room.players.len(), 1);
    assert_eq!(room.players[0].username, "Ada");
    assert_eq!(room.host_player_id, room.players[0].id);
    assert_eq!(room.max_players, 4);

    let found = f.service.find_by_room_code(&room.room_code.to_lowercase()).await.unwrap();
    assert_eq!(found.id, room.id);
}

#[tokio::test]
async fn test_create_room_requires_catalog_and_nickname() {
    let f = fixture(5);
    let err = f.service.create_game(&guest(0), easy_room()).await.unwrap_err();
    assert!(matches!(
        err,
        GameError::InsufficientCards {
            needed: 10,
            available: 5
        }
    ));

    let f = fixture(20);
    let err = f
        .service
        .create_game(&CallerIdentity::default(), easy_room())
        .await
        .unwrap_err();
    assert!(matches!(err, GameError::MissingNickname));

    let err = f
        .service
        .create_game(
            &guest(0),
            NewRoom {
                max_players: Some(1),
                ..easy_room()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, GameError::InvalidMaxPlayers(1)));
}

#[tokio::test]
async fn test_join_errors_and_idempotent_rejoin() {
    let f = fixture(20);
    let err = f
        .service
        .join_game("NOPE00", &guest(1), None)
        .await
        .unwrap_err();
    assert!(matches!(err, GameError::RoomNotFound(code) if code == "NOPE00"));

    let room = seated_room(&f.service, 2).await;
    let again = f
        .service
        .join_game(&room.room_code, &guest(1), None)
        .await
        .unwrap();
    assert_eq!(again.players.len(), 2);
    assert_eq!(again.revision, room.revision);

    let full_room = f
        .service
        .create_game(
            &guest(2),
            NewRoom {
                max_players: Some(2),
                ..easy_room()
            },
        )
        .await
        .unwrap();
    f.service
        .join_game(&full_room.room_code, &guest(3), None)
        .await
        .unwrap();
    let err = f
        .service
        .join_game(&full_room.room_code, &guest(4), None)
        .await
        .unwrap_err();
    assert!(matches!(err, GameError::RoomFull(2)));
    assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
}

#[tokio::test]
async fn test_new_players_cannot_join_started_room() {
    let f = fixture(20);
    let game = started_room(&f.service, 2).await;
    let err = f
        .service
        .join_game(&game.room_code, &guest(2), None)
        .await
        .unwrap_err();
    assert!(matches!(err, GameError::RoomNotJoinable(GameStatus::InProgress)));
}

#[tokio::test]
async fn test_start_game_deals_hands_and_timeline() {
    let f = fixture(20);
    let game = started_room(&f.service, 2).await;

    assert_eq!(game.status, GameStatus::InProgress);
    assert!(game.time_started.is_some());
    assert_eq!(game.current_player_index, 0);
    assert_eq!(game.timeline.len(), 1);
    assert_eq!(game.timeline[0].position, 0);
    assert_eq!(game.timeline[0].card.id().as_str(), "c0");
    assert_eq!(hand_ids(&game, 0), vec!["c1", "c2", "c3"]);
    assert_eq!(hand_ids(&game, 1), vec!["c4", "c5", "c6"]);
    assert!(game.draw_pile.is_empty());
}

#[tokio::test]
async fn test_start_game_preconditions() {
    let f = fixture(20);
    let room = seated_room(&f.service, 2).await;

    let err = f.service.start_game(room.id, &guest(1)).await.unwrap_err();
    assert!(matches!(err, GameError::NotAuthorized));

    let lonely = f.service.create_game(&guest(2), easy_room()).await.unwrap();
    let err = f.service.start_game(lonely.id, &guest(2)).await.unwrap_err();
    assert!(matches!(err, GameError::NotEnoughPlayers(1)));

    f.service.start_game(room.id, &guest(0)).await.unwrap();
    let err = f.service.start_game(room.id, &guest(0)).await.unwrap_err();
    assert!(matches!(err, GameError::RoomNotWaiting(GameStatus::InProgress)));
}

#[tokio::test]
async fn test_start_game_needs_enough_cards() {
    // two easy hands and a timeline card need 7 cards in the room's categories
    let f = fixture(12);
    let room = f
        .service
        .create_game(
            &guest(0),
            NewRoom {
                categories: vec!["science".to_string()],
                ..easy_room()
            },
        )
        .await
        .unwrap();
    f.service
        .join_game(&room.room_code, &guest(1), None)
        .await
        .unwrap();
    let err = f.service.start_game(room.id, &guest(0)).await.unwrap_err();
    assert!(matches!(
        err,
        GameError::InsufficientCards {
            needed: 7,
            available: 6
        }
    ));
}

#[tokio::test]
async fn test_place_card_scores_and_passes_turn() {
    let f = fixture(20);
    let game = started_room(&f.service, 2).await;

    let err = f
        .service
        .place_card(game.id, &guest(1), &CardId::new("c4"), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, GameError::NotYourTurn));

    let err = f
        .service
        .place_card(game.id, &guest(0), &CardId::new("c4"), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, GameError::CardNotInGame(_)));

    let err = f
        .service
        .place_card(game.id, &guest(0), &CardId::new("c1"), 2)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GameError::InvalidPosition {
            position: 2,
            min: 0,
            max: 1
        }
    ));

    let outcome = f
        .service
        .place_card(game.id, &guest(0), &CardId::new("c1"), 1)
        .await
        .unwrap();
    assert!(outcome.is_correct);
    let game = outcome.game;
    assert_eq!(game.players[0].score, 1);
    assert_eq!(game.players[0].correct_placements, 1);
    assert_eq!(hand_ids(&game, 0), vec!["c2", "c3"]);
    assert_eq!(game.current_player_index, 1);

    // wrong guesses still land on the timeline
    let outcome = f
        .service
        .place_card(game.id, &guest(1), &CardId::new("c4"), 0)
        .await
        .unwrap();
    assert!(!outcome.is_correct);
    assert_eq!(outcome.correct_position, 2);
    let game = outcome.game;
    assert_eq!(game.players[1].score, 0);
    assert_eq!(game.players[1].incorrect_placements, 1);
    let timeline: Vec<(&str, usize)> = game
        .timeline
        .iter()
        .map(|entry| (entry.card.id().as_str(), entry.position))
        .collect();
    assert_eq!(timeline, vec![("c4", 0), ("c0", 1), ("c1", 2)]);
    assert_eq!(game.current_player_index, 0);
}

#[tokio::test]
async fn test_outsider_cannot_place() {
    let f = fixture(20);
    let game = started_room(&f.service, 2).await;
    let err = f
        .service
        .place_card(game.id, &guest(3), &CardId::new("c1"), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, GameError::PlayerNotInGame(id) if id == game.id));
}

#[tokio::test]
async fn test_turn_skips_players_who_left() {
    let f = fixture(30);
    let game = started_room(&f.service, 3).await;
    f.service.leave_game(game.id, &guest(1)).await.unwrap();

    let outcome = f
        .service
        .place_card(game.id, &guest(0), &CardId::new("c1"), 1)
        .await
        .unwrap();
    assert_eq!(outcome.game.current_player_index, 2);
    assert_eq!(outcome.game.status, GameStatus::InProgress);
}

#[tokio::test]
async fn test_host_leaving_hands_room_to_next_player() {
    let f = fixture(20);
    let room = seated_room(&f.service, 3).await;
    let grace = room.players[1].id;

    let room = f.service.leave_game(room.id, &guest(0)).await.unwrap();
    assert_eq!(room.players[0].id, grace);
    assert_eq!(room.host_player_id, grace);
    assert!(room.players[0].is_active);
    assert_eq!(room.players[1].username, "Ada");
    assert!(!room.players[1].is_active);
    assert_eq!(room.status, GameStatus::Waiting);

    // the new host can start with the two remaining players
    let game = f.service.start_game(room.id, &guest(1)).await.unwrap();
    assert_eq!(game.status, GameStatus::InProgress);
    assert!(game.players[1].cards.is_empty());
    assert_ne!(game.current_player_index, 1);

    // the deal is sized for every seat; the absent seat's share stays in the pile
    let dealt: usize = game
        .active_indices()
        .iter()
        .map(|&idx| game.players[idx].cards.len())
        .sum();
    assert_eq!(dealt + game.draw_pile.len(), 3 * 3);
    assert_eq!(game.draw_pile.len(), 3);
}

#[tokio::test]
async fn test_host_leaving_on_their_turn_keeps_turn_pointer_consistent() {
    let f = fixture(30);
    let game = started_room(&f.service, 3).await;
    let grace = game.players[1].id;

    let game = f.service.leave_game(game.id, &guest(0)).await.unwrap();
    assert_eq!(game.host_player_id, grace);
    assert_eq!(game.players[game.current_player_index].id, grace);
    assert_eq!(game.current_player_index, 0);

    let outcome = f
        .service
        .place_card(game.id, &guest(1), &CardId::new("c4"), 1)
        .await
        .unwrap();
    assert_eq!(outcome.game.players[outcome.game.current_player_index].username, "Linus");
}

#[tokio::test]
async fn test_last_player_standing_wins() {
    let f = fixture(20);
    let game = started_room(&f.service, 2).await;

    let game = f.service.leave_game(game.id, &guest(1)).await.unwrap();
    assert_eq!(game.status, GameStatus::Completed);
    assert_eq!(game.winners, vec![0]);
    assert!(game.time_completed.is_some());

    // no way back into a finished game, and nothing ever abandons it
    let err = f.service.leave_game(game.id, &guest(0)).await.unwrap_err();
    assert!(matches!(err, GameError::GameNotInProgress(GameStatus::Completed)));
    let err = f
        .service
        .find_by_room_code(&game.room_code)
        .await
        .unwrap_err();
    assert!(matches!(err, GameError::RoomNotFound(_)));
    let stored = f.service.get_game(game.id).await.unwrap();
    assert_ne!(stored.status, GameStatus::Abandoned);
}

/// Plays the first card in the seat's hand at the front of the timeline.
async fn play_first_card(
    service: &MultiplayerService,
    game: &MultiplayerGame,
    seat: usize,
) -> MultiplayerGame {
    let card = CardId::new(hand_ids(game, seat)[0].clone());
    service
        .place_card(game.id, &guest(seat), &card, 0)
        .await
        .unwrap()
        .game
}

#[tokio::test]
async fn test_leaving_with_the_only_cards_left_completes_game() {
    let f = fixture(30);
    let game = started_room(&f.service, 3).await;
    let game = f.service.leave_game(game.id, &guest(2)).await.unwrap();
    assert_eq!(game.current_player_index, 0);

    // Ada and Grace alternate until Grace holds the last card between them
    let mut game = game;
    for seat in [0, 1, 0, 1, 0] {
        assert_eq!(game.current_player_index, seat);
        game = play_first_card(&f.service, &game, seat).await;
    }
    let game = f
        .service
        .join_game(&game.room_code, &guest(2), None)
        .await
        .unwrap();
    let game = play_first_card(&f.service, &game, 1).await;
    assert_eq!(game.status, GameStatus::InProgress);
    assert_eq!(game.current_player_index, 2);
    let hands: Vec<usize> = game.players.iter().map(|p| p.cards.len()).collect();
    assert_eq!(hands, vec![0, 0, 3]);

    let game = f.service.leave_game(game.id, &guest(2)).await.unwrap();
    assert_eq!(game.status, GameStatus::Completed);
    assert!(game.time_completed.is_some());
    assert!(!game.winners.is_empty());
    assert!(game.winners.iter().all(|&idx| idx < 2));
    let stored = f.service.get_game(game.id).await.unwrap();
    assert_eq!(stored.status, GameStatus::Completed);
}

#[tokio::test]
async fn test_rejoining_mid_game_restores_seat() {
    let f = fixture(30);
    let game = started_room(&f.service, 3).await;
    f.service.leave_game(game.id, &guest(2)).await.unwrap();

    let game = f
        .service
        .join_game(&game.room_code, &guest(2), None)
        .await
        .unwrap();
    assert_eq!(game.players.len(), 3);
    assert!(game.players[2].is_active);
    assert_eq!(hand_ids(&game, 2).len(), 3);
}

#[tokio::test]
async fn test_host_can_end_game_early() {
    let f = fixture(20);
    let game = started_room(&f.service, 2).await;
    let game = f
        .service
        .place_card(game.id, &guest(0), &CardId::new("c1"), 1)
        .await
        .unwrap()
        .game;

    let err = f.service.end_game(game.id, &guest(1)).await.unwrap_err();
    assert!(matches!(err, GameError::NotAuthorized));

    let game = f.service.end_game(game.id, &guest(0)).await.unwrap();
    assert_eq!(game.status, GameStatus::Completed);
    assert_eq!(game.winners, vec![0]);
}

#[tokio::test]
async fn test_game_completes_when_hands_run_out() {
    let f = fixture(20);
    let game = started_room(&f.service, 2).await;

    let mut seats = vec![
        Seat::new(guest(0), Box::new(DefaultStrategy::default())),
        Seat::new(guest(1), Box::new(DefaultStrategy::default())),
    ];
    let game = run_multiplayer_game(&f.service, game.id, &mut seats, None)
        .await
        .expect("Game should complete successfully");

    assert_eq!(game.status, GameStatus::Completed);
    assert_eq!(game.timeline.len(), 7);
    assert!(game.players.iter().all(|p| p.cards.is_empty()));
    assert_eq!(game.players[0].score, 3);
    assert_eq!(game.players[1].score, 3);
    assert_eq!(game.winners, vec![0, 1]);
    for (slot, entry) in game.timeline.iter().enumerate() {
        assert_eq!(entry.position, slot);
    }
}

#[tokio::test]
async fn test_random_players_still_finish() {
    let f = fixture(40);
    let game = started_room(&f.service, 3).await;
    let mut seats = vec![
        Seat::new(guest(0), Box::new(RandomStrategy::seeded(1))),
        Seat::new(guest(1), Box::new(RandomStrategy::seeded(2))),
        Seat::new(guest(2), Box::new(DefaultStrategy::default())),
    ];
    let game = run_multiplayer_game(&f.service, game.id, &mut seats, None)
        .await
        .expect("Game should complete successfully");
    assert_eq!(game.status, GameStatus::Completed);
    assert_eq!(game.players[2].score, 3);
    assert!(game.winners.contains(&2));
}

#[tokio::test]
async fn test_runner_ends_game_when_turn_holder_has_no_cards() {
    let f = fixture(20);
    let game = started_room(&f.service, 2).await;

    // leave the turn on Ada with an empty hand while Grace still holds cards
    let mut broken = f.service.get_game(game.id).await.unwrap();
    broken.players[0].cards.clear();
    broken.current_player_index = 0;
    f.store.save_multiplayer(&mut broken).await.unwrap();

    let mut seats = vec![
        Seat::new(guest(0), Box::new(DefaultStrategy::default())),
        Seat::new(guest(1), Box::new(DefaultStrategy::default())),
    ];
    let game = run_multiplayer_game(&f.service, game.id, &mut seats, None)
        .await
        .expect("Runner should end the game instead of asking for a card");
    assert_eq!(game.status, GameStatus::Completed);
    assert_eq!(game.players[1].cards.len(), 3);
    assert_eq!(game.winners, vec![0, 1]);
}

#[tokio::test]
async fn test_stale_copy_is_rejected() {
    let f = fixture(20);
    let game = started_room(&f.service, 3).await;
    let mut stale = f.service.get_game(game.id).await.unwrap();

    f.service.leave_game(game.id, &guest(2)).await.unwrap();

    stale.players[1].score = 99;
    let err: GameError = f.store.save_multiplayer(&mut stale).await.unwrap_err().into();
    assert!(err.is_conflict());
    let stored = f.service.get_game(game.id).await.unwrap();
    assert_eq!(stored.players[1].score, 0);
    assert!(!stored.players[2].is_active);
}

#[tokio::test]
async fn test_poller_publishes_new_revisions() {
    let f = fixture(20);
    let game = started_room(&f.service, 2).await;
    let (mut updates, poller) =
        spawn_poller(f.service.clone(), game.id, Duration::from_millis(10));

    updates.changed().await.unwrap();
    let first = updates.borrow_and_update().clone().unwrap();
    assert_eq!(first.revision, game.revision);

    f.service.leave_game(game.id, &guest(1)).await.unwrap();
    updates.changed().await.unwrap();
    let last = updates.borrow_and_update().clone().unwrap();
    assert_eq!(last.status, GameStatus::Completed);

    // the poller stops by itself once the game is over
    poller.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_solo_game_with_default_strategy_is_perfect() {
    let cards: Vec<Card> = deck(12)
        .into_iter()
        .map(|mut card| {
            card.difficulty = Difficulty::Medium;
            card
        })
        .collect();
    let service = SoloGameService::new(
        Arc::new(MemoryGameStore::new()),
        Arc::new(MemoryCatalog::shuffled(cards, Some(42))),
    );
    let game = service
        .create_game(
            Some("user-1".to_string()),
            NewSoloGame {
                difficulty: Difficulty::Medium,
                card_count: 7,
                categories: vec![],
            },
        )
        .await
        .unwrap();

    let mut strategy = DefaultStrategy::default();
    let game = run_solo_game(&service, game.id, &mut strategy, None)
        .await
        .expect("Game should complete successfully");
    assert_eq!(game.status, GameStatus::Completed);
    assert_eq!(game.score, 100);
    assert!(game.is_win);
    assert_eq!(game.correct_placements, 6);
}
