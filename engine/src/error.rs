use database::DatabaseError;
use thiserror::Error;
use types::{CardId, GameStatus};
use uuid::Uuid;

/// Coarse classification callers use to decide how to surface an error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    PreconditionFailed,
    Forbidden,
    InsufficientResources,
    InvalidInput,
    /// Lost an optimistic-concurrency race; reload and retry.
    Conflict,
    Internal,
}

#[derive(Error, Debug)]
pub enum GameError {
    #[error("game {0} not found")]
    GameNotFound(Uuid),

    #[error("no open room with code {0}")]
    RoomNotFound(String),

    #[error("you are not a player in game {0}")]
    PlayerNotInGame(Uuid),

    #[error("card {0} is not part of this game")]
    CardNotInGame(CardId),

    #[error("card {0} is missing from the catalog")]
    CardNotFound(CardId),

    #[error("game is not in progress (status: {0})")]
    GameNotInProgress(GameStatus),

    #[error("room is not accepting players (status: {0})")]
    RoomNotJoinable(GameStatus),

    #[error("room has already started (status: {0})")]
    RoomNotWaiting(GameStatus),

    #[error("room is full ({0} players)")]
    RoomFull(usize),

    #[error("it is not your turn")]
    NotYourTurn,

    #[error("only the host can do that")]
    NotAuthorized,

    #[error("need at least 2 active players to start, have {0}")]
    NotEnoughPlayers(usize),

    #[error("not enough cards: needed {needed}, available {available}")]
    InsufficientCards { needed: usize, available: usize },

    #[error("a nickname is required")]
    MissingNickname,

    #[error("position {position} is outside {min}..={max}")]
    InvalidPosition {
        position: usize,
        min: usize,
        max: usize,
    },

    #[error("a game needs at least 2 cards, asked for {0}")]
    InvalidCardCount(usize),

    #[error("a room needs at least 2 seats, asked for {0}")]
    InvalidMaxPlayers(usize),

    #[error("the anchor card cannot be moved")]
    AnchorLocked,

    #[error("could not find a free room code after {0} attempts")]
    RoomCodeExhausted(usize),

    #[error("game {id} changed while you were playing (revision {expected} is now {actual}); reload and retry")]
    StaleRevision { id: Uuid, expected: u64, actual: u64 },

    #[error(transparent)]
    Database(DatabaseError),
}

impl From<DatabaseError> for GameError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::StaleRevision {
                id,
                expected,
                actual,
            } => GameError::StaleRevision {
                id,
                expected,
                actual,
            },
            DatabaseError::GameNotFound(id) => GameError::GameNotFound(id),
            other => GameError::Database(other),
        }
    }
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::GameNotFound(_)
            | GameError::RoomNotFound(_)
            | GameError::PlayerNotInGame(_)
            | GameError::CardNotInGame(_)
            | GameError::CardNotFound(_) => ErrorKind::NotFound,
            GameError::GameNotInProgress(_)
            | GameError::RoomNotJoinable(_)
            | GameError::RoomNotWaiting(_)
            | GameError::RoomFull(_)
            | GameError::NotEnoughPlayers(_)
            | GameError::AnchorLocked => ErrorKind::PreconditionFailed,
            GameError::NotYourTurn | GameError::NotAuthorized => ErrorKind::Forbidden,
            GameError::InsufficientCards { .. } | GameError::RoomCodeExhausted(_) => {
                ErrorKind::InsufficientResources
            }
            GameError::MissingNickname
            | GameError::InvalidPosition { .. }
            | GameError::InvalidCardCount(_)
            | GameError::InvalidMaxPlayers(_) => ErrorKind::InvalidInput,
            GameError::StaleRevision { .. } => ErrorKind::Conflict,
            GameError::Database(_) => ErrorKind::Internal,
        }
    }

    /// Expected, recoverable failures whose message can be shown to the player
    /// as is ("it is not your turn", "room is full").
    pub fn is_actionable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Forbidden | ErrorKind::PreconditionFailed | ErrorKind::InvalidInput
        )
    }

    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_revision_maps_to_conflict() {
        let id = Uuid::new_v4();
        let err: GameError = DatabaseError::StaleRevision {
            id,
            expected: 3,
            actual: 4,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(err.is_conflict());
        assert!(!err.is_actionable());
    }

    #[test]
    fn test_turn_and_room_errors_are_actionable() {
        assert!(GameError::NotYourTurn.is_actionable());
        assert!(GameError::RoomFull(4).is_actionable());
        assert_eq!(GameError::RoomFull(4).to_string(), "room is full (4 players)");
        assert!(!GameError::Database(DatabaseError::Query("boom".into())).is_actionable());
    }
}
