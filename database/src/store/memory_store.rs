use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use types::{MultiplayerGame, SoloGame, Versioned};
use uuid::Uuid;

use super::GameStore;
use crate::DatabaseError;

#[derive(Debug, Default)]
pub struct MemoryGameStore {
    solo: RwLock<HashMap<Uuid, SoloGame>>,
    multiplayer: RwLock<HashMap<Uuid, MultiplayerGame>>,
}

impl MemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn insert_new<T: Versioned + Clone>(
    docs: &mut HashMap<Uuid, T>,
    doc: &T,
) -> Result<(), DatabaseError> {
    if docs.contains_key(&doc.id()) {
        return Err(DatabaseError::DuplicateGame(doc.id()));
    }
    docs.insert(doc.id(), doc.clone());
    Ok(())
}

fn compare_and_swap<T: Versioned + Clone>(
    docs: &mut HashMap<Uuid, T>,
    doc: &mut T,
) -> Result<(), DatabaseError> {
    let stored = docs
        .get_mut(&doc.id())
        .ok_or(DatabaseError::GameNotFound(doc.id()))?;
    if stored.revision() != doc.revision() {
        return Err(DatabaseError::StaleRevision {
            id: doc.id(),
            expected: doc.revision(),
            actual: stored.revision(),
        });
    }
    doc.set_revision(doc.revision() + 1);
    *stored = doc.clone();
    Ok(())
}

#[async_trait]
impl GameStore for MemoryGameStore {
    async fn insert_solo(&self, game: &SoloGame) -> Result<(), DatabaseError> {
        insert_new(&mut *self.solo.write().await, game)
    }

    async fn load_solo(&self, id: Uuid) -> Result<Option<SoloGame>, DatabaseError> {
        Ok(self.solo.read().await.get(&id).cloned())
    }

    async fn save_solo(&self, game: &mut SoloGame) -> Result<(), DatabaseError> {
        compare_and_swap(&mut *self.solo.write().await, game)
    }

    async fn insert_multiplayer(&self, game: &MultiplayerGame) -> Result<(), DatabaseError> {
        let mut games = self.multiplayer.write().await;
        let code_in_use = games
            .values()
            .any(|g| g.room_code == game.room_code && !g.status.is_terminal());
        if code_in_use {
            return Err(DatabaseError::RoomCodeTaken(game.room_code.clone()));
        }
        insert_new(&mut games, game)
    }

    async fn load_multiplayer(&self, id: Uuid) -> Result<Option<MultiplayerGame>, DatabaseError> {
        Ok(self.multiplayer.read().await.get(&id).cloned())
    }

    async fn find_active_room(
        &self,
        room_code: &str,
    ) -> Result<Option<MultiplayerGame>, DatabaseError> {
        Ok(self
            .multiplayer
            .read()
            .await
            .values()
            .find(|g| g.room_code == room_code && !g.status.is_terminal())
            .cloned())
    }

    async fn save_multiplayer(&self, game: &mut MultiplayerGame) -> Result<(), DatabaseError> {
        compare_and_swap(&mut *self.multiplayer.write().await, game)
    }
}
