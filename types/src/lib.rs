pub mod card;
pub mod game_state;
pub mod identity;
pub mod player;
pub mod player_state;
pub mod solo;

pub use card::{Card, CardId, CardRef, ChronoKey, Difficulty};
pub use game_state::{DrawEntry, GameStatus, MultiplayerGame, TimelineEntry, Versioned};
pub use identity::CallerIdentity;
pub use player::{Placement, PlacementStrategy, PlacementView};
pub use player_state::PlayerState;
pub use solo::{PlacementRecord, SoloGame};
