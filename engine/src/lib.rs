pub mod cards;
pub mod config;
pub mod error;
pub mod gameplay;
pub mod identity;
pub mod placement;
pub mod room_code;
pub mod session;
pub mod solo;
pub mod sync;
mod turns;

pub use config::EngineConfig;
pub use error::{ErrorKind, GameError};
pub use gameplay::{run_multiplayer_game, run_solo_game, Seat};
pub use placement::PlacementOutcome;
pub use session::{MultiplayerService, NewRoom};
pub use solo::{NewSoloGame, SoloGameService};
pub use sync::{spawn_poller, LocalView, Reconciled};
