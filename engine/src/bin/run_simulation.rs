use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use database::{CardCatalog, DatabaseConfig, GameStore, MemoryCatalog, SqliteGameStore};
use engine::{
    run_multiplayer_game, run_solo_game, spawn_poller, EngineConfig, MultiplayerService, NewRoom,
    NewSoloGame, Seat, SoloGameService,
};
use strategies::{DefaultStrategy, InputStrategy, RandomStrategy};
use types::{CallerIdentity, Card, Difficulty, PlacementStrategy};

const SAMPLE_CARDS: &str = include_str!("../../data/sample_cards.json");

#[derive(Parser, Debug)]
struct Params {
    /// One name plays solo; two or more share a room.
    #[arg(short, long)]
    player: Vec<String>,
    #[arg(short, long, default_value = "medium")]
    difficulty: Difficulty,
    /// Cards dealt in a solo game.
    #[arg(long, default_value_t = 7)]
    card_count: usize,
    #[arg(long)]
    category: Vec<String>,
    /// JSON array of cards; the bundled sample deck otherwise.
    #[arg(long)]
    cards: Option<PathBuf>,
    /// YAML engine config.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    database_url: Option<String>,
    /// The first player is asked for placements on stdin.
    #[arg(short, long)]
    interactive: bool,
    /// Seats after the first guess at random instead of playing perfectly.
    #[arg(long)]
    random: bool,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    delay_ms: Option<u64>,
}

fn strategy_for(seat: usize, args: &Params) -> Box<dyn PlacementStrategy> {
    match (seat, args.interactive, args.random) {
        (0, true, _) => Box::new(InputStrategy::default()),
        (_, _, true) => match args.seed {
            Some(seed) => Box::new(RandomStrategy::seeded(seed + seat as u64)),
            None => Box::new(RandomStrategy::default()),
        },
        _ => Box::new(DefaultStrategy::default()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Params::parse();
    log::info!("args: {args:?}");

    let config = match &args.config {
        Some(path) => EngineConfig::from_yaml_file(path)?,
        None => EngineConfig::default(),
    };

    let catalog: Arc<dyn CardCatalog> = match &args.cards {
        Some(path) => Arc::new(MemoryCatalog::from_json_file(path, args.seed)?),
        None => {
            let cards: Vec<Card> = serde_json::from_str(SAMPLE_CARDS)?;
            Arc::new(MemoryCatalog::shuffled(cards, args.seed))
        }
    };

    let db_config =
        DatabaseConfig::from_cli_or_env_or_yaml(args.database_url.clone(), config.database_url.clone());
    let store = SqliteGameStore::new(db_config.create_pool().await?);
    store.run_migrations().await?;
    let store: Arc<dyn GameStore> = Arc::new(store);
    log::info!("Storing games in {}", db_config.url);

    let names = if args.player.is_empty() {
        vec!["Player".to_string()]
    } else {
        args.player.clone()
    };
    let identities: Vec<CallerIdentity> = names
        .iter()
        .enumerate()
        .map(|(idx, name)| CallerIdentity::guest(format!("guest-{idx}"), name.as_str()))
        .collect();

    if identities.len() == 1 {
        let service = SoloGameService::new(store, catalog);
        let game = service
            .create_game(
                None,
                NewSoloGame {
                    difficulty: args.difficulty,
                    card_count: args.card_count,
                    categories: args.category.clone(),
                },
            )
            .await?;
        let mut strategy = strategy_for(0, &args);
        let game = run_solo_game(&service, game.id, strategy.as_mut(), args.delay_ms).await?;
        println!("{game}");
        return Ok(());
    }

    let service = MultiplayerService::new(store, catalog, config.clone());
    let room = service
        .create_game(
            &identities[0],
            NewRoom {
                host_nickname: None,
                difficulty: args.difficulty,
                categories: args.category.clone(),
                max_players: Some(identities.len().max(config.default_max_players)),
            },
        )
        .await?;
    for identity in &identities[1..] {
        service.join_game(&room.room_code, identity, None).await?;
    }
    service.start_game(room.id, &identities[0]).await?;

    let (mut updates, poller) = spawn_poller(service.clone(), room.id, config.poll_interval());
    let watcher = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            if let Some(game) = updates.borrow_and_update().as_ref() {
                log::debug!("Room {} at revision {}", game.room_code, game.revision);
            }
        }
    });

    let mut seats: Vec<Seat> = identities
        .into_iter()
        .enumerate()
        .map(|(idx, identity)| Seat::new(identity, strategy_for(idx, &args)))
        .collect();
    let game = run_multiplayer_game(&service, room.id, &mut seats, args.delay_ms).await?;
    println!("{game}");

    poller.abort();
    watcher.abort();
    Ok(())
}
