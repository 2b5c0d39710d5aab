use sqlx::SqlitePool;

use crate::DatabaseError;

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS cards (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        year INTEGER NOT NULL,
        month INTEGER,
        day INTEGER,
        category TEXT NOT NULL,
        difficulty TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS solo_games (
        id TEXT PRIMARY KEY,
        revision INTEGER NOT NULL,
        status TEXT NOT NULL,
        document TEXT NOT NULL,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS multiplayer_games (
        id TEXT PRIMARY KEY,
        room_code TEXT NOT NULL,
        revision INTEGER NOT NULL,
        status TEXT NOT NULL,
        document TEXT NOT NULL,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    // room codes only need to be unique among rooms that are still open
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_multiplayer_games_active_room_code
        ON multiplayer_games (room_code)
        WHERE status IN ('waiting', 'in_progress')
    "#,
];

pub async fn migrate(pool: &SqlitePool) -> Result<(), DatabaseError> {
    for statement in STATEMENTS {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
    }
    tracing::debug!("Schema is up to date");
    Ok(())
}
