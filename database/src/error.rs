use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Query execution error: {0}")]
    Query(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Game not found: {0}")]
    GameNotFound(Uuid),

    #[error("Game already exists: {0}")]
    DuplicateGame(Uuid),

    #[error("Room code {0} is already used by an active room")]
    RoomCodeTaken(String),

    #[error("Game {id} was modified concurrently (expected revision {expected}, found {actual})")]
    StaleRevision { id: Uuid, expected: u64, actual: u64 },
}

impl DatabaseError {
    pub fn is_stale(&self) -> bool {
        matches!(self, DatabaseError::StaleRevision { .. })
    }
}
