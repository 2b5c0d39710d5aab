use async_trait::async_trait;
use types::{MultiplayerGame, SoloGame};
use uuid::Uuid;

use crate::DatabaseError;

/// Whole-document persistence for game state.
///
/// `save_*` is a compare-and-swap on the document revision: the write only
/// lands when the stored revision equals `game.revision`, and on success the
/// revision is incremented both in the store and on `game`. A mismatch fails
/// with [`DatabaseError::StaleRevision`] and leaves `game` untouched.
#[async_trait]
pub trait GameStore: Send + Sync {
    async fn insert_solo(&self, game: &SoloGame) -> Result<(), DatabaseError>;
    async fn load_solo(&self, id: Uuid) -> Result<Option<SoloGame>, DatabaseError>;
    async fn save_solo(&self, game: &mut SoloGame) -> Result<(), DatabaseError>;

    /// Fails with [`DatabaseError::RoomCodeTaken`] when another waiting or
    /// in-progress room already uses the code.
    async fn insert_multiplayer(&self, game: &MultiplayerGame) -> Result<(), DatabaseError>;
    async fn load_multiplayer(&self, id: Uuid) -> Result<Option<MultiplayerGame>, DatabaseError>;
    /// The waiting or in-progress room with this exact code, if any.
    async fn find_active_room(
        &self,
        room_code: &str,
    ) -> Result<Option<MultiplayerGame>, DatabaseError>;
    async fn save_multiplayer(&self, game: &mut MultiplayerGame) -> Result<(), DatabaseError>;
}
