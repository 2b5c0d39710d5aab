use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use types::{MultiplayerGame, SoloGame, Versioned};
use uuid::Uuid;

use super::GameStore;
use crate::DatabaseError;

/// Stores each game as a JSON document next to its revision and status.
pub struct SqliteGameStore {
    pool: SqlitePool,
}

fn query_error(e: sqlx::Error) -> DatabaseError {
    DatabaseError::Query(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map_or(false, |db_err| db_err.is_unique_violation())
}

fn decode<T: serde::de::DeserializeOwned + Versioned>(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<T, DatabaseError> {
    let document: String = row.try_get("document").map_err(query_error)?;
    let revision: i64 = row.try_get("revision").map_err(query_error)?;
    let mut doc: T = serde_json::from_str(&document)?;
    doc.set_revision(revision as u64);
    Ok(doc)
}

impl SqliteGameStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), DatabaseError> {
        crate::schema::migrate(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn load<T: serde::de::DeserializeOwned + Versioned>(
        &self,
        table: &str,
        id: Uuid,
    ) -> Result<Option<T>, DatabaseError> {
        let row = sqlx::query(&format!(
            "SELECT revision, document FROM {table} WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error)?;
        row.as_ref().map(decode::<T>).transpose()
    }

    async fn save<T: serde::Serialize + Versioned + Send + Sync>(
        &self,
        table: &str,
        game: &mut T,
    ) -> Result<(), DatabaseError> {
        let expected = game.revision();
        game.set_revision(expected + 1);
        let document = match serde_json::to_string(&*game) {
            Ok(document) => document,
            Err(e) => {
                game.set_revision(expected);
                return Err(e.into());
            }
        };

        let result = sqlx::query(&format!(
            "UPDATE {table} SET revision = ?, status = ?, document = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ? AND revision = ?"
        ))
        .bind((expected + 1) as i64)
        .bind(game.status().as_str())
        .bind(document)
        .bind(game.id().to_string())
        .bind(expected as i64)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) if done.rows_affected() == 1 => Ok(()),
            Ok(_) => {
                game.set_revision(expected);
                let actual = sqlx::query(&format!("SELECT revision FROM {table} WHERE id = ?"))
                    .bind(game.id().to_string())
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(query_error)?;
                match actual {
                    Some(row) => {
                        let actual: i64 = row.try_get("revision").map_err(query_error)?;
                        tracing::debug!(
                            "Rejected stale write to {} {}: expected {}, found {}",
                            table,
                            game.id(),
                            expected,
                            actual
                        );
                        Err(DatabaseError::StaleRevision {
                            id: game.id(),
                            expected,
                            actual: actual as u64,
                        })
                    }
                    None => Err(DatabaseError::GameNotFound(game.id())),
                }
            }
            Err(e) => {
                game.set_revision(expected);
                Err(query_error(e))
            }
        }
    }
}

#[async_trait]
impl GameStore for SqliteGameStore {
    async fn insert_solo(&self, game: &SoloGame) -> Result<(), DatabaseError> {
        let document = serde_json::to_string(game)?;
        sqlx::query("INSERT INTO solo_games (id, revision, status, document) VALUES (?, ?, ?, ?)")
            .bind(game.id.to_string())
            .bind(game.revision as i64)
            .bind(game.status.as_str())
            .bind(document)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DatabaseError::DuplicateGame(game.id)
                } else {
                    query_error(e)
                }
            })?;
        Ok(())
    }

    async fn load_solo(&self, id: Uuid) -> Result<Option<SoloGame>, DatabaseError> {
        self.load("solo_games", id).await
    }

    async fn save_solo(&self, game: &mut SoloGame) -> Result<(), DatabaseError> {
        self.save("solo_games", game).await
    }

    async fn insert_multiplayer(&self, game: &MultiplayerGame) -> Result<(), DatabaseError> {
        let document = serde_json::to_string(game)?;
        let result = sqlx::query(
            "INSERT INTO multiplayer_games (id, room_code, revision, status, document) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(game.id.to_string())
        .bind(&game.room_code)
        .bind(game.revision as i64)
        .bind(game.status.as_str())
        .bind(document)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => {
                let existing: Option<MultiplayerGame> =
                    self.load("multiplayer_games", game.id).await?;
                if existing.is_some() {
                    Err(DatabaseError::DuplicateGame(game.id))
                } else {
                    Err(DatabaseError::RoomCodeTaken(game.room_code.clone()))
                }
            }
            Err(e) => Err(query_error(e)),
        }
    }

    async fn load_multiplayer(&self, id: Uuid) -> Result<Option<MultiplayerGame>, DatabaseError> {
        self.load("multiplayer_games", id).await
    }

    async fn find_active_room(
        &self,
        room_code: &str,
    ) -> Result<Option<MultiplayerGame>, DatabaseError> {
        let row = sqlx::query(
            "SELECT revision, document FROM multiplayer_games WHERE room_code = ? AND status IN ('waiting', 'in_progress')",
        )
        .bind(room_code)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error)?;
        row.as_ref().map(decode::<MultiplayerGame>).transpose()
    }

    async fn save_multiplayer(&self, game: &mut MultiplayerGame) -> Result<(), DatabaseError> {
        self.save("multiplayer_games", game).await
    }
}
